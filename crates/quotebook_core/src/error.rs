//! Closed error classification shared by user-facing errors.

use std::fmt::{Display, Formatter};

/// Coarse error category surfaced to presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Empty required field, or a payload with the wrong shape.
    Validation,
    /// Malformed JSON.
    Parse,
    /// Remote source unavailable.
    Network,
    /// Local key-value storage failure.
    Storage,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Parse => "parse",
            Self::Network => "network",
            Self::Storage => "storage",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
