//! Error taxonomy shared by the loaders, the search index and the linter.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum NotesError {
    /// The notes directory does not exist.
    #[error("Notes directory not found: {0}")]
    NotFound(String),

    /// Malformed frontmatter block or unparsable timestamp in one note.
    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// A file or directory could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid search request (bad date, zero limit, ...).
    #[error("Invalid query: {0}")]
    Query(String),

    /// Engine settings could not be decoded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The search backend failed.
    #[error("Index error: {0}")]
    Index(String),
}

impl NotesError {
    pub(crate) fn parse(path: &Path, message: impl Into<String>) -> Self {
        NotesError::Parse {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        NotesError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<tantivy::TantivyError> for NotesError {
    fn from(e: tantivy::TantivyError) -> Self {
        NotesError::Index(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NotesError>;
