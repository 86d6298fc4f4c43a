//! Corpus health checks: broken wikilinks, empty notes and duplicate titles.

pub mod report;
pub mod wikilink;

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::config::{LintPaths, NOTE_EXTENSION};
use crate::corpus::Corpus;
use crate::error::Result;
use crate::frontmatter::Document;

pub use report::{aggregate, AggregatedReport, BrokenLinkGroup};
pub use wikilink::{extract_link_refs, normalize_target, LinkRef};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    pub source_file: String,
    /// Target as written in the link, trimmed
    pub target_note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateTitle {
    pub title: String,
    /// Sorted; always two or more
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub broken_links: Vec<BrokenLink>,
    pub empty_notes: Vec<String>,
    pub duplicates: Vec<DuplicateTitle>,
}

impl Report {
    pub fn has_issues(&self) -> bool {
        !self.broken_links.is_empty() || !self.empty_notes.is_empty() || !self.duplicates.is_empty()
    }
}

/// Names a wikilink may resolve to, lowercased
#[derive(Debug, Clone, Default)]
pub struct TargetSet {
    names: HashSet<String>,
}

impl TargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_attachment(&mut self, file_name: &str) {
        let name = file_name.trim().to_lowercase();
        if !name.is_empty() {
            self.names.insert(name);
        }
    }

    /// A note resolves both with and without its `.md` extension
    pub fn add_note_file(&mut self, file_name: &str) {
        let name = file_name.trim().to_lowercase();
        if name.is_empty() {
            return;
        }
        let suffix = format!(".{}", NOTE_EXTENSION);
        if let Some(stem) = name.strip_suffix(suffix.as_str()) {
            self.names.insert(stem.to_string());
        }
        self.names.insert(name);
    }

    /// Add every regular file directly inside `dir`. A missing or unreadable
    /// directory contributes nothing.
    pub fn add_attachments_dir(&mut self, dir: &Path) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("No attachments read from {:?}: {}", dir, e);
                return;
            }
        };

        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_file() {
                self.add_attachment(&entry.file_name().to_string_lossy());
            }
        }
    }

    /// Every successfully parsed note, by file name
    pub fn add_documents(&mut self, documents: &[Document]) {
        for doc in documents {
            if let Some(name) = Path::new(&doc.path).file_name() {
                self.add_note_file(&name.to_string_lossy());
            }
        }
    }

    pub fn contains(&self, normalized_target: &str) -> bool {
        self.names.contains(normalized_target)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Analyze `notes_dir`, resolving attachments in its sibling `files` directory.
pub fn analyze_corpus(notes_dir: impl AsRef<Path>) -> Result<Report> {
    analyze_with(&LintPaths::for_notes_dir(notes_dir))
}

pub fn analyze_with(paths: &LintPaths) -> Result<Report> {
    let corpus = Corpus::open(&paths.notes_dir)?;
    let documents = corpus.parse_all();

    let mut targets = TargetSet::new();
    targets.add_attachments_dir(&paths.attachments_dir);
    targets.add_documents(&documents);

    let report = analyze_documents(&targets, &documents);

    log::info!(
        "[analyze] {} notes: {} broken links, {} empty, {} duplicate titles",
        corpus.len(),
        report.broken_links.len(),
        report.empty_notes.len(),
        report.duplicates.len()
    );
    Ok(report)
}

/// Run every check over already parsed documents.
///
/// Output order follows `documents` for broken links and empty notes;
/// duplicates are ordered by title.
pub fn analyze_documents(targets: &TargetSet, documents: &[Document]) -> Report {
    let mut report = Report::default();
    let mut titles: BTreeMap<&str, Vec<String>> = BTreeMap::new();

    for doc in documents {
        if doc.has_empty_body() {
            report.empty_notes.push(doc.path.clone());
        }

        let title = doc.title.trim();
        if !title.is_empty() {
            titles.entry(title).or_default().push(doc.path.clone());
        }

        for link in extract_link_refs(&doc.path, &doc.body) {
            if !targets.contains(&link.normalized_target) {
                report.broken_links.push(BrokenLink {
                    source_file: link.source_file,
                    target_note: link.raw_target,
                });
            }
        }
    }

    report.duplicates = titles
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .map(|(title, mut paths)| {
            paths.sort();
            DuplicateTitle {
                title: title.to_string(),
                paths,
            }
        })
        .collect();

    report
}
