pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("type mismatch: expected {expected}, but found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("invalid data for type {ty}: expected {expected} bytes, but found {found}")]
    InvalidData {
        ty: String,
        expected: usize,
        found: usize,
    },

    #[error("invalid type: {ty} has no binary format")]
    InvalidType { ty: String },

    #[error("invalid module: {problem}")]
    InvalidModule { problem: String },
}
