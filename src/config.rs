//! Module: config
//!
//! Purpose: Compile-time configuration for the serial echo console.
//!
//! There is no config file and no persisted state; everything lives in
//! `ConsoleConfig::default()` and the board feature selected at build time.

use crate::console::line_buffer::LINE_CAPACITY;

/// What to do with a line that does not fit in the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Drop the whole line and report it
    Discard,
    /// Keep the first `max_line_len` bytes and dispatch them
    Truncate,
}

/// UART pins for the optional diagnostic log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogUartConfig {
    pub baud_rate: u32,
    pub tx_pin: u8,
}

impl Default for LogUartConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115200,
            tx_pin: board::LOG_TX_PIN,
        }
    }
}

/// Console configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Command UART baud rate (8N1)
    pub baud_rate: u32,
    /// Longest line kept, in bytes
    pub max_line_len: usize,
    pub overflow: OverflowPolicy,
    /// Pause at the end of each loop iteration
    pub poll_delay_ms: u32,
    /// Pause between UART ready and the banner
    pub startup_delay_ms: u32,
    /// Separate TX-only UART for diagnostics; `None` keeps them off the wire
    pub log_uart: Option<LogUartConfig>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115200,
            max_line_len: 128,
            overflow: OverflowPolicy::Discard,
            poll_delay_ms: 10,
            startup_delay_ms: 1000,
            log_uart: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Baud rate of zero
    InvalidBaudRate,
    /// Line length of zero or above `LINE_CAPACITY`
    InvalidLineLength,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidBaudRate => write!(f, "baud rate must be non-zero"),
            Self::InvalidLineLength => {
                write!(f, "max line length must be within 1..={}", LINE_CAPACITY)
            }
        }
    }
}

impl ConsoleConfig {
    /// Check the configuration before bringing up the console.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baud_rate == 0 {
            return Err(ConfigError::InvalidBaudRate);
        }
        if self.max_line_len == 0 || self.max_line_len > LINE_CAPACITY {
            return Err(ConfigError::InvalidLineLength);
        }
        if let Some(log) = self.log_uart {
            if log.baud_rate == 0 {
                return Err(ConfigError::InvalidBaudRate);
            }
        }
        Ok(())
    }
}

/// Board pin defaults
#[cfg(not(feature = "esp32p4"))]
pub mod board {
    /// GPIO6 - free on Quad flash ESP32-S3 boards
    pub const LOG_TX_PIN: u8 = 6;
}

#[cfg(feature = "esp32p4")]
pub mod board {
    pub const LOG_TX_PIN: u8 = 20;
}
