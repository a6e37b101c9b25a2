//! Errors raised by the library domain.

/// Failure inside the library demo.
///
/// Constructor closures box it, and the container reports it as
/// `TarkibError::ConstructionFailed`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LibraryError {
    #[error("Connection string is blank")]
    BlankConnection,

    #[error("Entity kind is blank")]
    BlankKind,

    #[error("Connection string `{0}` is malformed")]
    MalformedConnection(String),
}
