//! Engine settings. Callers build one of these (or load it from JSON) and pass it
//! explicitly into each call; nothing here is global.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NotesError, Result};

/// Name of the attachments directory that sits next to the notes directory
pub const ATTACHMENTS_DIR_NAME: &str = "files";
/// Notes are the `.md` files directly inside the notes directory
pub const NOTE_EXTENSION: &str = "md";

pub const DEFAULT_SEARCH_LIMIT: usize = 100;
pub const DEFAULT_QUEUE_DEPTH: usize = 256;
pub const DEFAULT_WRITER_HEAP_BYTES: usize = 50_000_000;

fn default_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

fn default_queue_depth() -> usize {
    DEFAULT_QUEUE_DEPTH
}

fn default_writer_heap() -> usize {
    DEFAULT_WRITER_HEAP_BYTES
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub notes_dir: PathBuf,
    /// Overrides the sibling `files` directory
    #[serde(default)]
    pub attachments_dir: Option<PathBuf>,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Capacity of the parse → index channel
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
    #[serde(default = "default_writer_heap")]
    pub writer_heap_bytes: usize,
}

impl EngineConfig {
    pub fn new(notes_dir: impl Into<PathBuf>) -> Self {
        Self {
            notes_dir: notes_dir.into(),
            attachments_dir: None,
            default_limit: DEFAULT_SEARCH_LIMIT,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            writer_heap_bytes: DEFAULT_WRITER_HEAP_BYTES,
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| NotesError::Config(format!("Failed to parse engine config: {}", e)))
    }

    pub fn resolved_notes_dir(&self) -> PathBuf {
        expand_home(&self.notes_dir)
    }

    pub fn lint_paths(&self) -> LintPaths {
        let notes_dir = self.resolved_notes_dir();
        let attachments_dir = match &self.attachments_dir {
            Some(dir) => expand_home(dir),
            None => sibling_attachments_dir(&notes_dir),
        };
        LintPaths {
            notes_dir,
            attachments_dir,
        }
    }
}

/// Directories read by the link analyzer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintPaths {
    pub notes_dir: PathBuf,
    pub attachments_dir: PathBuf,
}

impl LintPaths {
    /// Notes directory plus its sibling `files` directory
    pub fn for_notes_dir(notes_dir: impl AsRef<Path>) -> Self {
        let notes_dir = expand_home(notes_dir.as_ref());
        let attachments_dir = sibling_attachments_dir(&notes_dir);
        Self {
            notes_dir,
            attachments_dir,
        }
    }
}

pub fn sibling_attachments_dir(notes_dir: &Path) -> PathBuf {
    match notes_dir.parent() {
        Some(parent) => parent.join(ATTACHMENTS_DIR_NAME),
        None => notes_dir.join(ATTACHMENTS_DIR_NAME),
    }
}

/// Expand a leading `~` or `$HOME` using the `HOME` environment variable.
/// The path is returned unchanged when `HOME` is unset.
pub fn expand_home(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let rest = if let Some(rest) = raw.strip_prefix("$HOME") {
        rest
    } else if let Some(rest) = raw.strip_prefix('~') {
        rest
    } else {
        return path.to_path_buf();
    };

    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(rest.trim_start_matches('/')),
        Err(_) => path.to_path_buf(),
    }
}
