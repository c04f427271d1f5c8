//! Runtime error types.

use thiserror::Error;

/// Errors returned by sessions, base repositories and generated methods.
///
/// Generated methods convert into the trait's declared error type with
/// `From`, so user error types only need `From<RepositoryError>`.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("no result for {0}")]
    NotFound(String),

    #[error("expected at most one row for {context}, got at least {count}")]
    TooManyRows { context: String, count: usize },

    #[error("entity `{label}` has no `{property}` property to identify it by")]
    MissingIdentifier { label: String, property: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Neo4j errors
    #[error("Neo4j connection error: {0}")]
    Connection(#[from] neo4rs::Error),

    #[error("Neo4j query error: {message}")]
    Query { message: String, query: String },

    #[error("unsupported parameter value: {0}")]
    Parameter(String),

    #[error("failed to decode row: {0}")]
    Decode(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl RepositoryError {
    /// A non-nullable query matched nothing.
    pub fn not_found(context: impl Into<String>) -> Self {
        RepositoryError::NotFound(context.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound(_))
    }
}

pub type Result<T, E = RepositoryError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = RepositoryError::not_found("UserRepository::find_by_name");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "no result for UserRepository::find_by_name");
    }

    #[test]
    fn test_serialization_converts() {
        let err: RepositoryError = serde_json::from_str::<u32>("\"x\"").unwrap_err().into();
        assert!(matches!(err, RepositoryError::Serialization(_)));
    }
}
