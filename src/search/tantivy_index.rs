use std::collections::BTreeSet;
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime as ChronoDateTime, Utc};
use tantivy::collector::TopDocs;
use tantivy::query::{
    AllQuery, BooleanQuery, FuzzyTermQuery, Occur, Query, RangeQuery, RegexQuery, TermQuery,
};
use tantivy::schema::{
    DateOptions, Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, Value, STORED,
    STRING,
};
use tantivy::{DateTime, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};

use super::engine::{IndexEngine, IndexedRecord, ScoredRecord};
use super::planner::{DateField, QueryClause, QueryPlan, FUZZY_DISTANCE};
use super::tokenizer::{NoteTokenizer, NOTE_TOKENIZER};
use crate::config::DEFAULT_WRITER_HEAP_BYTES;
use crate::error::{NotesError, Result};

/// tantivy refuses writer budgets below 15MB per thread
const MIN_WRITER_HEAP_BYTES: usize = 15_000_000;

fn to_index_date(dt: ChronoDateTime<Utc>) -> DateTime {
    DateTime::from_timestamp_micros(dt.timestamp_micros())
}

/// In-memory tantivy index. Writes go through a single writer thread and become
/// visible to queries on the next query, which commits and reloads the reader.
pub struct TantivyIndex {
    index: Index,
    reader: IndexReader,
    writer: Mutex<IndexWriter>,
    // Field handles
    f_path: Field,
    f_title: Field,
    f_body: Field,
    f_tags: Field,
    f_created: Field,
    f_updated: Field,
    heap_bytes: usize,
    // Set by writes, cleared by the commit that precedes the next read
    needs_commit: AtomicBool,
}

impl TantivyIndex {
    pub fn in_memory() -> Result<Self> {
        Self::with_writer_heap(DEFAULT_WRITER_HEAP_BYTES)
    }

    pub fn with_writer_heap(heap_bytes: usize) -> Result<Self> {
        let mut schema_builder = Schema::builder();

        // Text options with positions, stored for hits and snippets
        let text_options = TextOptions::default()
            .set_indexing_options(
                TextFieldIndexing::default()
                    .set_tokenizer(NOTE_TOKENIZER)
                    .set_index_option(IndexRecordOption::WithFreqsAndPositions),
            )
            .set_stored();

        let keyword_options = TextOptions::default()
            .set_indexing_options(TextFieldIndexing::default().set_tokenizer("raw"))
            .set_stored();

        let date_options = DateOptions::default().set_indexed().set_fast();

        let f_path = schema_builder.add_text_field("path", STRING | STORED);
        let f_title = schema_builder.add_text_field("title", text_options.clone());
        let f_body = schema_builder.add_text_field("body", text_options);
        let f_tags = schema_builder.add_text_field("tags", keyword_options);
        let f_created =
            schema_builder.add_date_field(DateField::Created.as_str(), date_options.clone());
        let f_updated = schema_builder.add_date_field(DateField::Updated.as_str(), date_options);

        let schema = schema_builder.build();
        let index = Index::create_in_ram(schema);
        index.tokenizers().register(NOTE_TOKENIZER, NoteTokenizer);

        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        // One indexing thread: every write funnels through this writer
        let writer = index.writer_with_num_threads(1, heap_bytes.max(MIN_WRITER_HEAP_BYTES))?;

        log::debug!("[TantivyIndex] In-memory index created");

        Ok(Self {
            index,
            reader,
            writer: Mutex::new(writer),
            f_path,
            f_title,
            f_body,
            f_tags,
            f_created,
            f_updated,
            heap_bytes,
            needs_commit: AtomicBool::new(false),
        })
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    fn lock_writer(&self) -> Result<MutexGuard<'_, IndexWriter>> {
        self.writer
            .lock()
            .map_err(|e| NotesError::Index(e.to_string()))
    }

    /// Commit pending writes and reload the reader, only if something changed
    fn commit_if_needed(&self) -> Result<()> {
        if self.needs_commit.swap(false, Ordering::AcqRel) {
            let mut writer = self.lock_writer()?;
            writer.commit()?;
            drop(writer);
            self.reader.reload()?;
        }
        Ok(())
    }

    fn date_field(&self, field: DateField) -> Field {
        match field {
            DateField::Created => self.f_created,
            DateField::Updated => self.f_updated,
        }
    }

    /// Prefix or single-edit match of `text` against title or body tokens
    fn text_query(&self, text: &str) -> Result<Box<dyn Query>> {
        // Query text is matched literally, only the trailing `.*` is a pattern
        let prefix_pattern = format!("{}.*", regex::escape(text));
        let mut subqueries: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        for field in [self.f_title, self.f_body] {
            let prefix = RegexQuery::from_pattern(&prefix_pattern, field)?;
            let fuzzy =
                FuzzyTermQuery::new(Term::from_field_text(field, text), FUZZY_DISTANCE, false);
            subqueries.push((Occur::Should, Box::new(prefix)));
            subqueries.push((Occur::Should, Box::new(fuzzy)));
        }

        Ok(Box::new(BooleanQuery::new(subqueries)))
    }

    fn build_query(&self, plan: &QueryPlan) -> Result<Box<dyn Query>> {
        if plan.is_match_all() {
            return Ok(Box::new(AllQuery));
        }

        let mut subqueries: Vec<(Occur, Box<dyn Query>)> = Vec::with_capacity(plan.clauses.len());
        for clause in &plan.clauses {
            let query: Box<dyn Query> = match clause {
                QueryClause::Text(text) => self.text_query(text)?,
                QueryClause::Tag(tag) => {
                    let term = Term::from_field_text(self.f_tags, tag);
                    Box::new(TermQuery::new(term, IndexRecordOption::Basic))
                }
                QueryClause::DateRange { field, start, end } => {
                    Box::new(RangeQuery::new_date_bounds(
                        field.as_str().to_string(),
                        Bound::Included(to_index_date(*start)),
                        Bound::Included(to_index_date(*end)),
                    ))
                }
            };
            subqueries.push((Occur::Must, query));
        }

        Ok(Box::new(BooleanQuery::new(subqueries)))
    }

    fn stored_text(&self, doc: &TantivyDocument, field: Field) -> String {
        doc.get_first(field)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    }
}

impl IndexEngine for TantivyIndex {
    fn upsert(&self, record: IndexedRecord) -> Result<()> {
        let mut doc = TantivyDocument::new();
        doc.add_text(self.f_path, &record.path);
        doc.add_text(self.f_title, &record.title);
        doc.add_text(self.f_body, &record.body);
        for tag in &record.tags {
            doc.add_text(self.f_tags, tag);
        }
        if let Some(created) = record.created {
            doc.add_date(self.date_field(DateField::Created), to_index_date(created));
        }
        if let Some(updated) = record.updated {
            doc.add_date(self.date_field(DateField::Updated), to_index_date(updated));
        }

        // Delete first: the delete only affects documents added before it
        let writer = self.lock_writer()?;
        writer.delete_term(Term::from_field_text(self.f_path, &record.path));
        writer.add_document(doc)?;
        self.needs_commit.store(true, Ordering::Release);

        log::debug!("[TantivyIndex] Upserted {}", record.path);
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<()> {
        let writer = self.lock_writer()?;
        writer.delete_term(Term::from_field_text(self.f_path, path));
        self.needs_commit.store(true, Ordering::Release);

        log::debug!("[TantivyIndex] Deleted {}", path);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let writer = self.lock_writer()?;
        writer.delete_query(Box::new(AllQuery))?;
        self.needs_commit.store(true, Ordering::Release);
        Ok(())
    }

    fn query(&self, plan: &QueryPlan) -> Result<Vec<ScoredRecord>> {
        self.commit_if_needed()?;
        let searcher = self.reader.searcher();

        let total = searcher.num_docs() as usize;
        if total == 0 {
            return Ok(Vec::new());
        }

        let query = self.build_query(plan)?;
        let top_docs = searcher.search(query.as_ref(), &TopDocs::with_limit(total))?;

        let mut results = Vec::with_capacity(top_docs.len());
        for (score, doc_address) in top_docs {
            let doc: TantivyDocument = searcher.doc(doc_address)?;
            results.push(ScoredRecord {
                path: self.stored_text(&doc, self.f_path),
                title: self.stored_text(&doc, self.f_title),
                body: self.stored_text(&doc, self.f_body),
                score,
            });
        }

        Ok(results)
    }

    fn len(&self) -> Result<usize> {
        self.commit_if_needed()?;
        Ok(self.reader.searcher().num_docs() as usize)
    }

    fn all_tags(&self) -> Result<Vec<String>> {
        self.commit_if_needed()?;
        let searcher = self.reader.searcher();

        let total = searcher.num_docs() as usize;
        if total == 0 {
            return Ok(Vec::new());
        }

        let top_docs = searcher.search(&AllQuery, &TopDocs::with_limit(total))?;
        let mut unique_tags: BTreeSet<String> = BTreeSet::new();
        for (_score, doc_address) in top_docs {
            let doc: TantivyDocument = searcher.doc(doc_address)?;
            for tag_value in doc.get_all(self.f_tags) {
                if let Some(tag) = tag_value.as_str() {
                    unique_tags.insert(tag.to_string());
                }
            }
        }

        Ok(unique_tags.into_iter().collect())
    }

    fn empty_like(&self) -> Result<Box<dyn IndexEngine>> {
        Ok(Box::new(TantivyIndex::with_writer_heap(self.heap_bytes)?))
    }
}
