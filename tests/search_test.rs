//! End-to-end search over a notes directory on disk

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use notecorpus::search::{build_index, search, DateField, DateRangeInput, SearchRequest};
use notecorpus::{build_and_analyze, EngineConfig, NotesError};

fn write_note(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn note(title: &str, tags: &str, created: &str, body: &str) -> String {
    format!(
        "---\ntitle: {}\ntags: [{}]\ncreated: {}\n---\n{}\n",
        title, tags, created, body
    )
}

/// notes/ inside a temp dir, so the sibling `files` directory stays private
fn notes_dir(temp_dir: &TempDir) -> PathBuf {
    let dir = temp_dir.path().join("notes");
    fs::create_dir(&dir).unwrap();
    dir
}

fn titles(hits: &[notecorpus::Hit]) -> Vec<String> {
    let mut titles: Vec<String> = hits.iter().map(|h| h.title.clone()).collect();
    titles.sort();
    titles
}

#[test]
fn test_prefix_and_fuzzy_text_matches() {
    let temp_dir = TempDir::new().unwrap();
    let dir = notes_dir(&temp_dir);
    write_note(&dir, "plan.md", &note("Project Plan", "", "2024-01-01", "milestones"));
    write_note(&dir, "typo.md", &note("Projct Notes", "", "2024-01-02", "scribbles"));
    write_note(&dir, "other.md", &note("Unrelated", "", "2024-01-03", "groceries"));

    let handle = build_index(&dir).unwrap();
    let hits = search(&handle, &SearchRequest::new(10).text("proj")).unwrap();

    assert_eq!(titles(&hits), vec!["Projct Notes", "Project Plan"]);
    assert!(hits.iter().all(|h| h.score > 0.0));
}

#[test]
fn test_tag_filter_requires_every_tag() {
    let temp_dir = TempDir::new().unwrap();
    let dir = notes_dir(&temp_dir);
    write_note(&dir, "both.md", &note("Both", "Work, URGENT", "2024-01-01", "a"));
    write_note(&dir, "more.md", &note("More", "work, urgent, home", "2024-01-01", "b"));
    write_note(&dir, "work.md", &note("Work only", "work", "2024-01-01", "c"));
    write_note(&dir, "none.md", "no frontmatter here");

    let handle = build_index(&dir).unwrap();
    let hits = search(&handle, &SearchRequest::new(10).tags("work,urgent")).unwrap();

    assert_eq!(titles(&hits), vec!["Both", "More"]);
}

#[test]
fn test_date_without_end_covers_the_whole_day() {
    let temp_dir = TempDir::new().unwrap();
    let dir = notes_dir(&temp_dir);
    write_note(&dir, "early.md", &note("Early", "", "2024-01-01 00:00", "x"));
    write_note(&dir, "late.md", &note("Late", "", "2024-01-01 23:59", "x"));
    write_note(&dir, "before.md", &note("Before", "", "2023-12-31 23:59", "x"));
    write_note(&dir, "after.md", &note("After", "", "2024-01-02 00:00", "x"));
    write_note(&dir, "undated.md", "---\ntitle: Undated\n---\nx");

    let handle = build_index(&dir).unwrap();
    let request = SearchRequest::new(10).date_range(DateRangeInput::new(
        "2024-01-01",
        None,
        DateField::Created,
    ));
    let hits = search(&handle, &request).unwrap();

    assert_eq!(titles(&hits), vec!["Early", "Late"]);
}

#[test]
fn test_date_only_end_includes_the_whole_end_day() {
    let temp_dir = TempDir::new().unwrap();
    let dir = notes_dir(&temp_dir);
    write_note(&dir, "mid.md", &note("Mid", "", "2024-01-31 10:00", "x"));
    write_note(&dir, "next.md", &note("Next", "", "2024-02-01 00:00", "x"));

    let handle = build_index(&dir).unwrap();
    let whole_day = SearchRequest::new(10).date_range(DateRangeInput::new(
        "2024-01-01",
        Some("2024-01-31"),
        DateField::Created,
    ));
    assert_eq!(titles(&search(&handle, &whole_day).unwrap()), vec!["Mid"]);

    let until_nine = SearchRequest::new(10).date_range(DateRangeInput::new(
        "2024-01-01",
        Some("2024-01-31 09:00"),
        DateField::Created,
    ));
    assert!(search(&handle, &until_nine).unwrap().is_empty());
}

#[test]
fn test_updated_field_and_explicit_end() {
    let temp_dir = TempDir::new().unwrap();
    let dir = notes_dir(&temp_dir);
    write_note(
        &dir,
        "a.md",
        "---\ntitle: Touched\ncreated: 2023-01-01\nupdated: 2024-03-10 12:00\n---\nx",
    );
    write_note(
        &dir,
        "b.md",
        "---\ntitle: Stale\ncreated: 2024-03-10\nupdated: 2023-05-05\n---\nx",
    );

    let handle = build_index(&dir).unwrap();
    let request = SearchRequest::new(10).date_range(DateRangeInput::new(
        "2024-03-01",
        Some("2024-03-31"),
        DateField::Updated,
    ));
    assert_eq!(titles(&search(&handle, &request).unwrap()), vec!["Touched"]);
}

#[test]
fn test_empty_request_returns_everything_up_to_limit() {
    let temp_dir = TempDir::new().unwrap();
    let dir = notes_dir(&temp_dir);
    for name in ["c.md", "a.md", "d.md", "b.md"] {
        write_note(&dir, name, "same body");
    }

    let handle = build_index(&dir).unwrap();
    let hits = search(&handle, &SearchRequest::new(3)).unwrap();

    // Equal scores fall back to path order
    let names: Vec<String> = hits
        .iter()
        .map(|h| Path::new(&h.path).file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["a.md", "b.md", "c.md"]);
}

#[test]
fn test_hits_are_ranked_by_score() {
    let temp_dir = TempDir::new().unwrap();
    let dir = notes_dir(&temp_dir);
    write_note(&dir, "a.md", &note("Garden", "", "2024-01-01", "garden garden garden"));
    write_note(&dir, "b.md", &note("Misc", "", "2024-01-01", "a long note that mentions the garden once among many other words"));

    let handle = build_index(&dir).unwrap();
    let hits = search(&handle, &SearchRequest::new(10).text("garden")).unwrap();

    assert_eq!(hits.len(), 2);
    assert!(hits[0].score >= hits[1].score);
    assert_eq!(hits[0].title, "Garden");
}

#[test]
fn test_snippet_shows_matching_line() {
    let temp_dir = TempDir::new().unwrap();
    let dir = notes_dir(&temp_dir);
    write_note(
        &dir,
        "a.md",
        &note("Notes", "", "2024-01-01", "first line\n\nThe Kickoff is on Monday\nlast"),
    );

    let handle = build_index(&dir).unwrap();
    let hits = search(&handle, &SearchRequest::new(10).text("kickoff")).unwrap();

    assert_eq!(hits[0].matched_snippet, "The Kickoff is on Monday");
}

#[test]
fn test_missing_title_falls_back_to_file_name() {
    let temp_dir = TempDir::new().unwrap();
    let dir = notes_dir(&temp_dir);
    write_note(&dir, "Meeting Notes.md", "nothing special");

    let handle = build_index(&dir).unwrap();
    let hits = search(&handle, &SearchRequest::new(10)).unwrap();

    assert_eq!(hits[0].title, "Meeting Notes");
}

#[test]
fn test_invalid_notes_are_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let dir = notes_dir(&temp_dir);
    write_note(&dir, "good.md", &note("Good", "", "2024-01-01", "fine"));
    write_note(&dir, "bad_yaml.md", "---\ntitle: [unclosed\n---\nbody");
    write_note(&dir, "bad_date.md", "---\ncreated: someday\n---\nbody");
    write_note(&dir, "unclosed.md", "---\ntitle: Never closed\nbody");

    let handle = build_index(&dir).unwrap();

    assert_eq!(handle.len().unwrap(), 1);
    let hits = search(&handle, &SearchRequest::new(10)).unwrap();
    assert_eq!(titles(&hits), vec!["Good"]);
}

#[test]
fn test_missing_notes_dir_fails_the_build() {
    let temp_dir = TempDir::new().unwrap();
    let result = build_index(temp_dir.path().join("absent"));
    assert!(matches!(result, Err(NotesError::NotFound(_))));
}

#[test]
fn test_bad_query_fails_without_results() {
    let temp_dir = TempDir::new().unwrap();
    let dir = notes_dir(&temp_dir);
    write_note(&dir, "a.md", "body");

    let handle = build_index(&dir).unwrap();
    let request = SearchRequest::new(10)
        .text("body")
        .date_range(DateRangeInput::new("not a date", None, DateField::Created));

    assert!(matches!(search(&handle, &request), Err(NotesError::Query(_))));
}

#[test]
fn test_building_twice_gives_identical_results() {
    let temp_dir = TempDir::new().unwrap();
    let dir = notes_dir(&temp_dir);
    for i in 0..40 {
        write_note(
            &dir,
            &format!("note_{:02}.md", i),
            &note(
                &format!("Project {}", i),
                if i % 2 == 0 { "work" } else { "home" },
                "2024-01-01",
                &"project update ".repeat(i % 5 + 1),
            ),
        );
    }

    let request = SearchRequest::new(25).text("project").tags("work");
    let first = search(&build_index(&dir).unwrap(), &request).unwrap();
    let second = search(&build_index(&dir).unwrap(), &request).unwrap();

    assert_eq!(first.len(), 20);
    assert_eq!(first, second);
}

#[test]
fn test_reindexing_an_edited_note_replaces_it() {
    let temp_dir = TempDir::new().unwrap();
    let dir = notes_dir(&temp_dir);
    let path = write_note(&dir, "a.md", &note("Draft", "", "2024-01-01", "draft text"));
    write_note(&dir, "b.md", &note("Other", "", "2024-01-01", "other text"));

    let mut handle = build_index(&dir).unwrap();
    fs::write(&path, note("Final", "", "2024-01-01", "final text")).unwrap();

    handle.reindex_file(&path).unwrap();
    assert_eq!(handle.len().unwrap(), 2);
    assert!(search(&handle, &SearchRequest::new(10).text("draft"))
        .unwrap()
        .is_empty());
    assert_eq!(
        titles(&search(&handle, &SearchRequest::new(10).text("final")).unwrap()),
        vec!["Final"]
    );

    assert_eq!(handle.rebuild().unwrap(), 2);
    assert_eq!(handle.len().unwrap(), 2);
}

#[test]
fn test_rebuild_picks_up_new_and_removed_notes() {
    let temp_dir = TempDir::new().unwrap();
    let dir = notes_dir(&temp_dir);
    let old = write_note(&dir, "old.md", &note("Old", "", "2024-01-01", "x"));

    let mut handle = build_index(&dir).unwrap();
    fs::remove_file(&old).unwrap();
    write_note(&dir, "new.md", &note("New", "", "2024-01-01", "y"));

    assert_eq!(handle.rebuild().unwrap(), 1);
    assert_eq!(titles(&search(&handle, &SearchRequest::new(10)).unwrap()), vec!["New"]);
}

#[test]
fn test_failed_rebuild_keeps_the_current_index() {
    let temp_dir = TempDir::new().unwrap();
    let dir = notes_dir(&temp_dir);
    write_note(&dir, "a.md", &note("Kept", "", "2024-01-01", "x"));

    let mut handle = build_index(&dir).unwrap();
    fs::remove_dir_all(&dir).unwrap();

    assert!(matches!(handle.rebuild(), Err(NotesError::NotFound(_))));
    assert_eq!(titles(&search(&handle, &SearchRequest::new(10)).unwrap()), vec!["Kept"]);
}

#[test]
fn test_remove_and_tags() {
    let temp_dir = TempDir::new().unwrap();
    let dir = notes_dir(&temp_dir);
    let a = write_note(&dir, "a.md", &note("A", "Work, ideas", "2024-01-01", "x"));
    write_note(&dir, "b.md", &note("B", "work", "2024-01-01", "y"));

    let handle = build_index(&dir).unwrap();
    assert_eq!(handle.tags().unwrap(), vec!["ideas", "work"]);

    handle.remove(&a.to_string_lossy()).unwrap();
    assert_eq!(handle.len().unwrap(), 1);
    assert_eq!(handle.tags().unwrap(), vec!["work"]);
}

#[test]
fn test_build_and_analyze_together() {
    let temp_dir = TempDir::new().unwrap();
    let dir = notes_dir(&temp_dir);
    write_note(&dir, "a.md", "links to [[b]] and [[nowhere]]");
    write_note(&dir, "b.md", "back to [[a]]");

    let mut config = EngineConfig::new(&dir);
    config.queue_depth = 1;
    let (handle, report) = build_and_analyze(&config).unwrap();

    assert_eq!(handle.len().unwrap(), 2);
    assert_eq!(report.broken_links.len(), 1);
    assert_eq!(report.broken_links[0].target_note, "nowhere");
}
