//! Console error types

/// Console error with code and message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleError {
    /// E01: Output sink rejected a write
    Output,
    /// E02: Line exceeded the buffer limit
    LineTooLong,
}

impl ConsoleError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Output => "E01",
            Self::LineTooLong => "E02",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::Output => "output write failed",
            Self::LineTooLong => "line too long",
        }
    }
}

impl core::fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl From<core::fmt::Error> for ConsoleError {
    fn from(_: core::fmt::Error) -> Self {
        Self::Output
    }
}
