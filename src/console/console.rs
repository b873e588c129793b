//! Main console struct: line accumulation and dispatch

use core::fmt::{self, Write};

use super::{lookup, ConsoleError, LineBuffer};
use crate::config::{ConsoleConfig, OverflowPolicy};
use crate::logging::{self, LogStream, DIAG_LOG_STREAM};
use crate::{diag_debug, diag_info, diag_warn};

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

/// Startup banner, one entry per line
pub const BANNER: [&str; 3] = [
    "ESP32 Communication Test",
    "Ready for commands!",
    "Type HELP for available commands",
];

/// Line terminator for everything the console prints
const EOL: &str = "\r\n";

/// Whether a complete line is waiting for dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    /// Collecting bytes, no terminator seen yet
    Accumulating,
    /// Terminator seen, line not dispatched yet
    Ready,
}

/// Outcome of one dispatched line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Matched a table entry
    Command(&'static str),
    /// No table entry matched
    Unknown,
    /// Line overflowed under `OverflowPolicy::Discard`
    Discarded { dropped: usize },
}

/// Console state machine
pub struct Console<'a> {
    line: LineBuffer,
    state: LineState,
    overflow: OverflowPolicy,
    log: &'a LogStream,
    clock: fn() -> i64,
}

impl Console<'static> {
    /// Create a console logging to the shared diagnostic stream
    pub fn new(config: &ConsoleConfig) -> Self {
        Self::with_log(config, &DIAG_LOG_STREAM)
    }
}

impl<'a> Console<'a> {
    /// Create a console logging to `log`
    pub fn with_log(config: &ConsoleConfig, log: &'a LogStream) -> Self {
        Self {
            line: LineBuffer::with_limit(config.max_line_len),
            state: LineState::Accumulating,
            overflow: config.overflow,
            log,
            clock: logging::timestamp_us,
        }
    }

    /// Replace the timestamp source used for diagnostics
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> LineState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == LineState::Ready
    }

    /// Bytes collected for the current line
    pub fn pending(&self) -> &[u8] {
        self.line.as_bytes()
    }

    /// Accept one input byte
    ///
    /// Returns `false` without consuming the byte while a line is waiting
    /// for `poll_and_dispatch`.
    pub fn on_byte(&mut self, byte: u8) -> bool {
        if self.state == LineState::Ready {
            return false;
        }

        // Terminator is never stored, so it cannot overflow the line
        if byte == b'\n' {
            self.state = LineState::Ready;
        } else {
            self.line.push(byte);
        }
        true
    }

    /// Dispatch the pending line, if complete
    ///
    /// Returns `Ok(None)` when no line is ready. The console is back in
    /// `Accumulating` afterwards, even if writing to `out` failed.
    pub fn poll_and_dispatch(&mut self, out: &mut dyn Write) -> Result<Option<Dispatch>, ConsoleError> {
        if self.state != LineState::Ready {
            return Ok(None);
        }

        let result = self.dispatch(out);
        self.line.clear();
        self.state = LineState::Accumulating;
        result.map(Some)
    }

    fn dispatch(&self, out: &mut dyn Write) -> Result<Dispatch, ConsoleError> {
        let now = (self.clock)();

        if self.line.must_discard(self.overflow) {
            let dropped = self.line.dropped();
            diag_warn!(self.log, now, "{} ({} bytes dropped)", ConsoleError::LineTooLong, dropped);
            write!(out, "Line too long (max {} bytes), discarded{}", self.line.limit(), EOL)?;
            return Ok(Dispatch::Discarded { dropped });
        }
        if self.line.overflowed() {
            diag_warn!(self.log, now, "line truncated, {} bytes dropped", self.line.dropped());
        }

        let input = self.line.trimmed();
        write!(out, "Received command: '{}'{}", Lossy(input), EOL)?;

        match lookup(input) {
            Some(cmd) => {
                diag_debug!(self.log, now, "dispatch {}", cmd.name);
                cmd.write_response(out)?;
                out.write_str(EOL)?;
                Ok(Dispatch::Command(cmd.name))
            }
            None => {
                diag_info!(self.log, now, "unknown command ({} bytes)", input.len());
                write!(out, "Unknown command: {}{}", Lossy(input), EOL)?;
                Ok(Dispatch::Unknown)
            }
        }
    }

    /// Print welcome banner
    pub fn print_banner(&self, out: &mut dyn Write) -> Result<(), ConsoleError> {
        diag_info!(self.log, (self.clock)(), "{}", VERSION);
        for line in BANNER {
            out.write_str(line)?;
            out.write_str(EOL)?;
        }
        Ok(())
    }
}

/// Displays bytes as UTF-8, replacing invalid sequences with U+FFFD
struct Lossy<'b>(&'b [u8]);

impl fmt::Display for Lossy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.0.utf8_chunks() {
            f.write_str(chunk.valid())?;
            if !chunk.invalid().is_empty() {
                f.write_char(char::REPLACEMENT_CHARACTER)?;
            }
        }
        Ok(())
    }
}
