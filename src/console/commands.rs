//! Command table

use core::fmt::{self, Write};

/// What a command prints when matched
pub enum Response {
    /// Fixed text
    Text(&'static str),
    /// List of every command name in table order
    CommandList,
}

/// Command descriptor
pub struct CommandDescriptor {
    pub name: &'static str,
    pub response: Response,
}

/// All available commands, in match priority order
pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor { name: "HELP", response: Response::CommandList },
    CommandDescriptor { name: "TEST", response: Response::Text("Test response - ESP32 is working!") },
    CommandDescriptor { name: "HELLO", response: Response::Text("Hello from ESP32!") },
];

/// Find the first command whose name equals `line` exactly
///
/// Case-sensitive; the caller trims the line beforehand.
pub fn lookup(line: &[u8]) -> Option<&'static CommandDescriptor> {
    COMMANDS.iter().find(|c| c.name.as_bytes() == line)
}

/// Get all command names
pub fn command_names() -> impl Iterator<Item = &'static str> {
    COMMANDS.iter().map(|c| c.name)
}

impl CommandDescriptor {
    /// Write the response text, without a line terminator
    pub fn write_response(&self, out: &mut dyn Write) -> fmt::Result {
        match self.response {
            Response::Text(text) => out.write_str(text),
            Response::CommandList => {
                out.write_str("Available commands: ")?;
                for (i, name) in command_names().enumerate() {
                    if i > 0 {
                        out.write_str(", ")?;
                    }
                    out.write_str(name)?;
                }
                Ok(())
            }
        }
    }
}
