//! Serial command console
//!
//! Lazy polling from the main loop - no dedicated task.
//! Zero heap allocation - all static buffers.

pub mod commands;
#[allow(clippy::module_inception)]
pub mod console;
pub mod error;
pub mod line_buffer;

pub use commands::{command_names, lookup, CommandDescriptor, Response, COMMANDS};
pub use console::{Console, Dispatch, LineState, BANNER, VERSION};
pub use error::ConsoleError;
pub use line_buffer::LineBuffer;
