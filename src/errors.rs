use crate::sql::error::Error as SqlError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Sql Error: {0}")]
    Syntax(#[from] SqlError),
    #[error("Wrong number of parameters: expected {expected}, got {got}")]
    Arity { expected: usize, got: usize },
    #[error("Schema conflict: {0}")]
    SchemaConflict(String),
    #[error("Schema error: {0}")]
    Schema(String),
    #[error("Type error: {0}")]
    Type(String),
    #[error("Expectation failed: {0}")]
    Mismatch(String),
    #[error("Failed to snapshot catalog: {0}")]
    SnapshotEncode(#[from] bincode::error::EncodeError),
    #[error("Failed to restore catalog: {0}")]
    SnapshotDecode(#[from] bincode::error::DecodeError),
    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Utf8 convertion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("Invaild Argument: {0}")]
    Argument(String),
    #[error("Logger Error: {0}")]
    Logger(&'static str),
    #[error("Unexpexted Error: {0}")]
    Unexpexted(&'static str),
    #[error("Serde Error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl Error {
    /// Name of the error class, used by callers that report by name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Syntax(_) => "SyntaxError",
            Self::Arity { .. } => "ArityError",
            Self::SchemaConflict(_) => "SchemaConflictError",
            Self::Schema(_) => "SchemaError",
            Self::Type(_) => "TypeError",
            _ => "InternalError",
        }
    }
}

pub type DBResult<T> = Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(
            Error::from(SqlError::Systax("bad")).kind(),
            "SyntaxError"
        );
        assert_eq!(Error::Arity { expected: 1, got: 0 }.kind(), "ArityError");
        assert_eq!(Error::Schema("t".into()).kind(), "SchemaError");
        assert_eq!(Error::Unexpexted("x").kind(), "InternalError");
    }

    #[test]
    fn test_arity_message() {
        let err = Error::Arity { expected: 2, got: 1 };
        assert_eq!(
            err.to_string(),
            "Wrong number of parameters: expected 2, got 1"
        );
    }
}
