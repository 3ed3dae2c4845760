//! Rejections for identifiers that get formatted into SQL text

/// Why an identifier was refused.
///
/// `field` names the setting that carried the value (e.g. `schema`).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be blank")]
    Empty { field: &'static str },

    /// Longer than PostgreSQL keeps an identifier
    #[error("{field} is longer than {max} bytes")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} is not a plain identifier: {reason}")]
    InvalidFormat { field: &'static str, reason: &'static str },
}
