use std::collections::BTreeMap;

use serde::Serialize;

use super::{DuplicateTitle, Report};

/// Broken link targets of one note
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLinkGroup {
    pub source_file: String,
    /// Sorted; a target linked twice appears twice
    pub targets: Vec<String>,
}

/// [`Report`] grouped for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregatedReport {
    /// Sorted by source file
    pub broken_links: Vec<BrokenLinkGroup>,
    /// Sorted by title
    pub duplicates: Vec<DuplicateTitle>,
    pub empty_notes: Vec<String>,
}

impl AggregatedReport {
    pub fn has_issues(&self) -> bool {
        !self.broken_links.is_empty() || !self.empty_notes.is_empty() || !self.duplicates.is_empty()
    }
}

pub fn aggregate(report: &Report) -> AggregatedReport {
    let mut by_source: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for link in &report.broken_links {
        by_source
            .entry(link.source_file.as_str())
            .or_default()
            .push(link.target_note.as_str());
    }

    let broken_links = by_source
        .into_iter()
        .map(|(source_file, mut targets)| {
            targets.sort_unstable();
            BrokenLinkGroup {
                source_file: source_file.to_string(),
                targets: targets.into_iter().map(str::to_string).collect(),
            }
        })
        .collect();

    let mut duplicates = report.duplicates.clone();
    for dup in &mut duplicates {
        dup.paths.sort();
    }
    duplicates.sort_by(|a, b| a.title.cmp(&b.title));

    let mut empty_notes = report.empty_notes.clone();
    empty_notes.sort();
    empty_notes.dedup();

    AggregatedReport {
        broken_links,
        duplicates,
        empty_notes,
    }
}
