//! Search and link checking over a directory of Markdown notes.
//!
//! Notes carry optional YAML frontmatter (`title`, `created`, `updated`,
//! `tags`). [`build_index`] loads them into an in-memory full-text index that
//! [`search`] queries with text, tag and date filters; [`analyze_corpus`]
//! reports broken wikilinks, empty notes and duplicate titles.

pub mod config;
pub mod corpus;
pub mod error;
pub mod frontmatter;
pub mod lint;
pub mod search;

pub use config::{EngineConfig, LintPaths};
pub use corpus::Corpus;
pub use error::{NotesError, Result};
pub use frontmatter::{parse_note, Document};
pub use lint::{aggregate, analyze_corpus, analyze_with, AggregatedReport, Report};
pub use search::{
    build_index, build_index_with_config, search, DateField, DateRangeInput, Hit, IndexHandle,
    SearchRequest,
};

/// Build the index and analyze the corpus concurrently.
pub fn build_and_analyze(config: &EngineConfig) -> Result<(IndexHandle, Report)> {
    let lint_paths = config.lint_paths();
    let (index, report) = rayon::join(
        || build_index_with_config(config),
        || analyze_with(&lint_paths),
    );
    Ok((index?, report?))
}
