pub mod engine;
pub mod planner;
pub mod snippet;
pub mod tantivy_index;
pub mod tokenizer;

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::corpus::{skip_invalid, Corpus};
use crate::error::{NotesError, Result};
use crate::frontmatter::{parse_note, Document};

pub use engine::{IndexEngine, IndexedRecord, ScoredRecord};
pub use planner::{plan, DateField, DateRangeInput, QueryClause, QueryPlan, SearchRequest};
pub use tantivy_index::TantivyIndex;

/// One ranked search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub title: String,
    pub path: String,
    pub score: f32,
    pub matched_snippet: String,
}

/// A fully built index over one notes directory.
///
/// Only handed out once the initial build has finished, so searches never see a
/// half-built index.
pub struct IndexHandle {
    engine: Box<dyn IndexEngine>,
    notes_dir: PathBuf,
    queue_depth: usize,
}

/// Build an in-memory index of every note in `notes_dir`.
pub fn build_index(notes_dir: impl AsRef<Path>) -> Result<IndexHandle> {
    build_index_with_config(&EngineConfig::new(notes_dir.as_ref()))
}

pub fn build_index_with_config(config: &EngineConfig) -> Result<IndexHandle> {
    let engine = TantivyIndex::with_writer_heap(config.writer_heap_bytes)?;
    build_index_with(
        Box::new(engine),
        &config.resolved_notes_dir(),
        config.queue_depth,
    )
}

/// Build an index on a caller-supplied engine.
pub fn build_index_with(
    engine: Box<dyn IndexEngine>,
    notes_dir: &Path,
    queue_depth: usize,
) -> Result<IndexHandle> {
    let corpus = Corpus::open(notes_dir)?;
    let handle = IndexHandle {
        engine,
        notes_dir: corpus.notes_dir().to_path_buf(),
        queue_depth: queue_depth.max(1),
    };
    index_corpus(handle.engine.as_ref(), &corpus, handle.queue_depth)?;
    Ok(handle)
}

/// Parse notes on the rayon pool and feed them through a bounded channel to
/// one consumer thread, the only writer to `engine`.
fn index_corpus(engine: &dyn IndexEngine, corpus: &Corpus, queue_depth: usize) -> Result<usize> {
    let paths: &[PathBuf] = corpus.note_paths();
    let (tx, rx) = mpsc::sync_channel::<Document>(queue_depth);

    let indexed = thread::scope(|scope| {
        let consumer = scope.spawn(move || {
            let mut indexed = 0;
            for doc in rx {
                engine.upsert(IndexedRecord::from_document(&doc))?;
                indexed += 1;
            }
            Ok::<usize, NotesError>(indexed)
        });

        paths.par_iter().for_each_with(tx, |tx, path| {
            if let Some(doc) = skip_invalid(parse_note(path)) {
                // The receiver only goes away after an indexing error
                let _ = tx.send(doc);
            }
        });

        consumer
            .join()
            .map_err(|_| NotesError::Index("indexing thread panicked".to_string()))?
    })?;

    log::info!(
        "[build_index] Indexed {} of {} notes from {:?}",
        indexed,
        corpus.len(),
        corpus.notes_dir()
    );
    Ok(indexed)
}

/// Run a search against a built index.
pub fn search(handle: &IndexHandle, request: &SearchRequest) -> Result<Vec<Hit>> {
    handle.search(request)
}

/// Plan the request, run it on `engine` and rank the hits: score descending,
/// then path ascending, truncated to the request limit.
pub fn execute<E: IndexEngine + ?Sized>(engine: &E, request: &SearchRequest) -> Result<Vec<Hit>> {
    let plan = planner::plan(request)?;
    let mut records = engine.query(&plan)?;

    records.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.path.cmp(&b.path))
    });
    records.truncate(request.limit);

    let text = request.text.as_deref();
    Ok(records
        .into_iter()
        .map(|r| Hit {
            matched_snippet: snippet::matched_snippet(&r.body, text),
            title: r.title,
            path: r.path,
            score: r.score,
        })
        .collect())
}

impl IndexHandle {
    pub fn notes_dir(&self) -> &Path {
        &self.notes_dir
    }

    pub fn engine(&self) -> &dyn IndexEngine {
        self.engine.as_ref()
    }

    pub fn search(&self, request: &SearchRequest) -> Result<Vec<Hit>> {
        execute(self.engine.as_ref(), request)
    }

    /// Index the notes directory again into a fresh engine and swap it in.
    /// On failure the current index is left untouched.
    pub fn rebuild(&mut self) -> Result<usize> {
        let corpus = Corpus::open(&self.notes_dir)?;
        let engine = self.engine.empty_like()?;
        let indexed = index_corpus(engine.as_ref(), &corpus, self.queue_depth)?;
        self.engine = engine;
        Ok(indexed)
    }

    pub fn upsert_document(&self, doc: &Document) -> Result<()> {
        self.engine.upsert(IndexedRecord::from_document(doc))
    }

    /// Re-read one note from disk and replace its record
    pub fn reindex_file(&self, path: &Path) -> Result<()> {
        let doc = parse_note(path)?;
        self.upsert_document(&doc)
    }

    pub fn remove(&self, path: &str) -> Result<()> {
        self.engine.delete(path)
    }

    pub fn tags(&self) -> Result<Vec<String>> {
        self.engine.all_tags()
    }

    pub fn len(&self) -> Result<usize> {
        self.engine.len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
