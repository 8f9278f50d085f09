use thiserror::Error;

/// Reason a whole source was left out of the catalog
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Source bytes are not valid UTF-8 text
    #[error("source is not valid UTF-8 (invalid byte at offset {offset})")]
    InvalidEncoding { offset: usize },
    /// Nothing usable was found in the source
    #[error("source contains no playlist entries")]
    NoEntries,
    /// Source bytes could not be obtained
    #[error("source could not be read: {0}")]
    Unreadable(String),
    /// Worker parsing the source did not finish
    #[error("parse worker failed: {0}")]
    Worker(String),
}
