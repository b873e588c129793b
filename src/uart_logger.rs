//! Diagnostic log output.
//!
//! Drains the diagnostic [`LogStream`] into a text sink. On target the sink
//! is a TX-only UART, so diagnostics never share the command port.
//!
//! # Hardware Setup
//!
//! ```text
//! ESP32-S3 GPIO6 (TX) ──────▶ USB-UART RX
//!                              └─▶ PC Serial Monitor
//! ```
//!
//! **WARNING**: GPIO6 conflicts with Octal PSRAM. Only use on Quad flash boards!

use core::fmt::Write;

use crate::logging::LogStream;

#[cfg(target_os = "espidf")]
use crate::config::LogUartConfig;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::gpio;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::peripheral::Peripheral;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::uart::{self, UartTxDriver};

/// Write every pending entry to `out`, one per line.
///
/// Reports and resets the drop counter afterwards. Sink errors are ignored.
/// Returns the number of entries drained.
pub fn drain_to<const N: usize>(stream: &LogStream<N>, out: &mut dyn Write) -> usize {
    let mut count = 0;

    while let Some(entry) = stream.drain() {
        let _ = write!(out, "{}\n", entry);
        count += 1;
    }

    let dropped = stream.dropped();
    if dropped > 0 {
        let _ = write!(out, "[WARN] Dropped: {}\n", dropped);
        stream.reset_dropped();
    }

    count
}

/// Initialize a TX-only UART for logging output.
#[cfg(target_os = "espidf")]
pub fn init_uart_logger<'d>(
    uart: impl Peripheral<P = esp_idf_svc::hal::uart::UART1> + 'd,
    tx_pin: impl Peripheral<P = impl gpio::OutputPin> + 'd,
    config: &LogUartConfig,
) -> Result<UartTxDriver<'d>, esp_idf_svc::sys::EspError> {
    let uart_config = uart::config::Config::default()
        .baudrate(esp_idf_svc::hal::units::Hertz(config.baud_rate));

    UartTxDriver::new(
        uart,
        tx_pin,
        Option::<gpio::AnyIOPin>::None,  // CTS
        Option::<gpio::AnyIOPin>::None,  // RTS
        &uart_config,
    )
}

/// `fmt::Write` over a TX-only UART.
#[cfg(target_os = "espidf")]
pub struct UartLogSink<'d>(pub UartTxDriver<'d>);

#[cfg(target_os = "espidf")]
impl Write for UartLogSink<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let mut bytes = s.as_bytes();
        while !bytes.is_empty() {
            let n = self.0.write(bytes).map_err(|_| core::fmt::Error)?;
            bytes = &bytes[n..];
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;

    #[test]
    fn test_drain_formats_entries() {
        let stream = LogStream::<4>::new();
        stream.push(1234567, LogLevel::Info, b"Hello world");
        stream.push(1234600, LogLevel::Error, b"second");

        let mut out = String::new();
        assert_eq!(drain_to(&stream, &mut out), 2);

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("1234567"));
        assert!(lines[0].contains("INFO: Hello world"));
        assert!(lines[1].contains("ERROR: second"));
    }

    #[test]
    fn test_drain_reports_dropped() {
        let stream = LogStream::<2>::new();
        stream.push(1, LogLevel::Debug, b"a");
        stream.push(2, LogLevel::Debug, b"b");
        stream.push(3, LogLevel::Debug, b"c");

        let mut out = String::new();
        assert_eq!(drain_to(&stream, &mut out), 2);
        assert!(out.ends_with("[WARN] Dropped: 1\n"));
        assert_eq!(stream.dropped(), 0);

        out.clear();
        assert_eq!(drain_to(&stream, &mut out), 0);
        assert!(out.is_empty());
    }
}
