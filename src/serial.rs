//! Serial transport seam.
//!
//! The console only sees [`SerialPort`]: a non-blocking byte source and a
//! byte sink. The ESP-IDF UART implements it on target, tests and the host
//! simulator bring their own.

use core::fmt;

use crate::console::{Console, ConsoleError, Dispatch};

/// Byte-oriented serial connection
pub trait SerialPort {
    type Error: fmt::Debug;

    /// Read one byte if available, never blocks
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Write all bytes
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// Errors from one pump iteration
#[derive(Debug)]
pub enum PumpError<E> {
    /// Port failed while reading
    Read(E),
    /// Port failed while writing a response
    Write(E),
    /// Console failed without a port error behind it
    Console(ConsoleError),
}

impl<E: fmt::Debug> fmt::Display for PumpError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(e) => write!(f, "serial read failed: {:?}", e),
            Self::Write(e) => write!(f, "serial write failed: {:?}", e),
            Self::Console(e) => write!(f, "{}", e),
        }
    }
}

/// `fmt::Write` adapter over a port, keeping the first port error
pub struct PortWriter<'p, P: SerialPort> {
    port: &'p mut P,
    error: Option<P::Error>,
}

impl<'p, P: SerialPort> PortWriter<'p, P> {
    pub fn new(port: &'p mut P) -> Self {
        Self { port, error: None }
    }

    /// Port error that caused the last `fmt::Error`, if any
    pub fn take_error(&mut self) -> Option<P::Error> {
        self.error.take()
    }
}

impl<P: SerialPort> fmt::Write for PortWriter<'_, P> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.port.write_all(s.as_bytes()).map_err(|e| {
            self.error.get_or_insert(e);
            fmt::Error
        })
    }
}

/// One loop iteration: read available bytes, then dispatch a finished line.
///
/// Reading stops at the first terminator so each line is dispatched on its
/// own; later bytes stay in the port until the next call.
pub fn pump<P: SerialPort>(
    console: &mut Console<'_>,
    port: &mut P,
) -> Result<Option<Dispatch>, PumpError<P::Error>> {
    while !console.is_ready() {
        match port.read_byte().map_err(PumpError::Read)? {
            Some(byte) => {
                console.on_byte(byte);
            }
            None => break,
        }
    }

    let mut writer = PortWriter::new(port);
    console
        .poll_and_dispatch(&mut writer)
        .map_err(|e| writer.take_error().map_or(PumpError::Console(e), PumpError::Write))
}

/// Send the startup banner over the port
pub fn announce<P: SerialPort>(console: &Console<'_>, port: &mut P) -> Result<(), PumpError<P::Error>> {
    let mut writer = PortWriter::new(port);
    console
        .print_banner(&mut writer)
        .map_err(|e| writer.take_error().map_or(PumpError::Console(e), PumpError::Write))
}
