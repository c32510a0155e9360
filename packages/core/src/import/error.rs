//! Import error types

use crate::models::ValidationError;
use crate::services::MigrationError;
use thiserror::Error;

/// Failures while turning bulk input into a content document
///
/// Nothing is committed when any of these is returned.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Malformed import at line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("Malformed import: {0}")]
    Malformed(String),

    #[error("Unsupported document: {0}")]
    Migration(#[from] MigrationError),

    #[error("Imported document is invalid: {0}")]
    Validation(#[from] ValidationError),
}

impl ImportError {
    pub fn malformed_line(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedLine {
            line,
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }

    /// Line number of the offending input, when known
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::MalformedLine { line, .. } => Some(*line),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedLine { .. } | Self::Malformed(_) => "MALFORMED_IMPORT",
            Self::Migration(_) | Self::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_line_display() {
        let err = ImportError::malformed_line(7, "SECTION before any TAB");
        assert_eq!(
            err.to_string(),
            "Malformed import at line 7: SECTION before any TAB"
        );
        assert_eq!(err.line(), Some(7));
        assert_eq!(err.code(), "MALFORMED_IMPORT");
    }

    #[test]
    fn test_wrapped_errors_are_validation() {
        let err: ImportError = MigrationError::unrecognized_shape("no pages").into();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.line(), None);
    }
}
