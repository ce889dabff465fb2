//! JSON export/import payloads.
//!
//! # Responsibility
//! - Render the quote list as a pretty-printed JSON array.
//! - Parse user-supplied files into quotes, rejecting non-array payloads.
//!
//! # Invariants
//! - Parsing is all-or-nothing: one bad entry rejects the whole payload.

use crate::error::ErrorKind;
use crate::model::quote::Quote;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default file name offered for exports.
pub const EXPORT_FILE_NAME: &str = "quotes_export.json";

/// Import payload errors.
#[derive(Debug)]
pub enum ImportError {
    /// Payload is not JSON at all.
    Parse(serde_json::Error),
    /// Payload is JSON but its top level is not an array.
    NotAnArray,
    /// Array entry is missing fields or has blank ones.
    InvalidEntry {
        index: usize,
        source: serde_json::Error,
    },
}

impl ImportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(_) => ErrorKind::Parse,
            Self::NotAnArray | Self::InvalidEntry { .. } => ErrorKind::Validation,
        }
    }
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "error parsing JSON file: {err}"),
            Self::NotAnArray => write!(f, "imported file does not contain a valid JSON array"),
            Self::InvalidEntry { index, source } => {
                write!(f, "invalid quote at index {index}: {source}")
            }
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::NotAnArray => None,
            Self::InvalidEntry { source, .. } => Some(source),
        }
    }
}

/// Serializes quotes as a 2-space indented JSON array.
pub fn export_quotes(quotes: &[Quote]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(quotes)
}

/// Parses an import payload into quotes.
pub fn parse_import(payload: &str) -> Result<Vec<Quote>, ImportError> {
    let value: Value = serde_json::from_str(payload).map_err(ImportError::Parse)?;
    let Value::Array(items) = value else {
        return Err(ImportError::NotAnArray);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<Quote>(item)
                .map_err(|source| ImportError::InvalidEntry { index, source })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{export_quotes, parse_import, ImportError};
    use crate::error::ErrorKind;
    use crate::model::quote::Quote;

    #[test]
    fn export_uses_two_space_indentation() {
        let quotes = vec![Quote::new("A", "x").unwrap()];
        let json = export_quotes(&quotes).unwrap();
        assert_eq!(
            json,
            "[\n  {\n    \"text\": \"A\",\n    \"category\": \"x\"\n  }\n]"
        );
    }

    #[test]
    fn parse_rejects_object_payload() {
        let err = parse_import(r#"{"text":"A","category":"x"}"#).unwrap_err();
        assert!(matches!(err, ImportError::NotAnArray));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn parse_reports_malformed_json_as_parse_error() {
        let err = parse_import("[{").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn parse_rejects_blank_entry_with_index() {
        let err =
            parse_import(r#"[{"text":"A","category":"x"},{"text":"","category":"y"}]"#)
                .unwrap_err();
        match err {
            ImportError::InvalidEntry { index, .. } => assert_eq!(index, 1),
            other => panic!("unexpected error: {other}"),
        }
    }
}
