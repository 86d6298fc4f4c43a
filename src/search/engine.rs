use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::planner::QueryPlan;
use crate::error::Result;
use crate::frontmatter::Document;

/// Searchable projection of a [`Document`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexedRecord {
    /// Result identifier; never matched against free text
    pub path: String,
    pub title: String,
    pub body: String,
    /// Lowercased, exact-match keywords
    pub tags: Vec<String>,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

impl IndexedRecord {
    pub fn from_document(doc: &Document) -> Self {
        let tags: BTreeSet<String> = doc
            .tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        Self {
            path: doc.path.clone(),
            title: doc.display_title(),
            body: doc.body.clone(),
            tags: tags.into_iter().collect(),
            created: doc.created,
            updated: doc.updated,
        }
    }
}

/// One record matched by a query, with its relevance score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub path: String,
    pub title: String,
    pub body: String,
    pub score: f32,
}

/// Storage and matching for indexed records, keyed by path.
///
/// The query planner only talks to this trait, so the in-memory tantivy index can
/// be swapped for any inverted index that honours the field semantics: title and
/// body match by token prefix or one edit, tags match exactly, dates by range.
pub trait IndexEngine: Send + Sync {
    /// Insert the record, replacing any record with the same path.
    fn upsert(&self, record: IndexedRecord) -> Result<()>;

    /// Remove the record for `path`; no-op when absent.
    fn delete(&self, path: &str) -> Result<()>;

    /// Drop every record.
    fn clear(&self) -> Result<()>;

    /// Every record matching the plan, in no particular order.
    fn query(&self, plan: &QueryPlan) -> Result<Vec<ScoredRecord>>;

    /// Number of records currently held.
    fn len(&self) -> Result<usize>;

    /// Distinct tags across all records, sorted.
    fn all_tags(&self) -> Result<Vec<String>>;

    /// A new, empty engine with the same settings. Rebuilds fill it and swap it in.
    fn empty_like(&self) -> Result<Box<dyn IndexEngine>>;
}
