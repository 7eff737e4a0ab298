use thiserror::Error;

/// Raised when schema introspection output does not have the expected shape.
///
/// Any occurrence aborts the whole formatting call; there is no partial output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Malformed schema ({section}): expected a sequence with at least one record")]
    MissingRecord { section: &'static str },

    #[error("Malformed schema ({section}): missing field `{field}`")]
    MissingField {
        section: &'static str,
        field: &'static str,
    },

    #[error("Malformed schema ({section}): {reason}")]
    Invalid {
        section: &'static str,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, SchemaError>;
