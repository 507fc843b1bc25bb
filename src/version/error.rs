use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("invalid go version: {0:?}")]
    InvalidGoVersion(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("invalid go constraint: {0:?}")]
    InvalidConstraint(String),
}
