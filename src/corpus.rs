//! Listing and parsing the notes of one notes directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::{expand_home, NOTE_EXTENSION};
use crate::error::{NotesError, Result};
use crate::frontmatter::{parse_note, Document};

pub fn is_note_file(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == NOTE_EXTENSION)
}

/// Log and drop a per-document failure
pub(crate) fn skip_invalid(result: Result<Document>) -> Option<Document> {
    match result {
        Ok(doc) => Some(doc),
        Err(e) => {
            log::warn!("Skipping invalid note: {}", e);
            None
        }
    }
}

/// The note files of a notes directory, listed once and parsed on demand.
#[derive(Debug, Clone)]
pub struct Corpus {
    notes_dir: PathBuf,
    paths: Vec<PathBuf>,
}

impl Corpus {
    /// List the notes directly inside `notes_dir`, sorted by path.
    /// A missing or unreadable directory fails the whole operation.
    pub fn open(notes_dir: impl AsRef<Path>) -> Result<Self> {
        let notes_dir = expand_home(notes_dir.as_ref());

        match fs::read_dir(&notes_dir) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(NotesError::NotFound(notes_dir.display().to_string()));
            }
            Err(e) => return Err(NotesError::io(&notes_dir, e)),
        }

        let mut paths: Vec<PathBuf> = WalkDir::new(&notes_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("Skipping unreadable entry in {:?}: {}", notes_dir, e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && is_note_file(entry.path()))
            .map(|entry| entry.into_path())
            .collect();
        paths.sort();

        log::debug!("[Corpus] {} notes in {:?}", paths.len(), notes_dir);
        Ok(Self { notes_dir, paths })
    }

    pub fn notes_dir(&self) -> &Path {
        &self.notes_dir
    }

    pub fn note_paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Parse every note lazily, surfacing per-note failures to the caller.
    pub fn try_documents(&self) -> impl Iterator<Item = Result<Document>> + '_ {
        self.paths.iter().map(|path| parse_note(path))
    }

    /// Parse every note lazily; invalid notes are logged and skipped.
    pub fn documents(&self) -> impl Iterator<Item = Document> + '_ {
        self.try_documents().filter_map(skip_invalid)
    }

    /// Parse all notes in parallel, keeping listing order.
    pub fn parse_all(&self) -> Vec<Document> {
        self.paths
            .par_iter()
            .map(|path| parse_note(path))
            .collect::<Vec<_>>()
            .into_iter()
            .filter_map(skip_invalid)
            .collect()
    }
}
