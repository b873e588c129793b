//! # ESP32 Serial Echo
//!
//! Serial command echo test: reads bytes until a newline, matches the
//! trimmed line against a fixed command table and prints a canned reply.
//!
//! ## Architecture
//!
//! One cooperative loop drives everything through [`serial::pump`]:
//! - [`console::Console`] owns the line buffer and the ready flag
//! - [`serial::SerialPort`] is the only view of the transport
//! - Diagnostics go to [`logging::DIAG_LOG_STREAM`], never to the command port

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod console;
pub mod logging;
pub mod serial;
pub mod uart_logger;

#[cfg(target_os = "espidf")]
pub mod hal;

pub use config::{ConsoleConfig, OverflowPolicy};
pub use console::{Console, ConsoleError, Dispatch, LineState};
pub use logging::{LogStream, DIAG_LOG_STREAM};
pub use serial::{pump, SerialPort};
