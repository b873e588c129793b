//! Hardware Abstraction Layer for the serial echo console.
//!
//! Thin wrappers around ESP-IDF peripherals.
//! Console logic stays in core modules, HAL is just I/O.

pub mod uart;

pub use uart::UartPort;
