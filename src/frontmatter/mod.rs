pub mod types;

use std::fs;
use std::path::Path;

use crate::error::{NotesError, Result};

pub use types::{parse_timestamp, Document, Frontmatter, NoteTimestamp};

/// Line that opens and closes the metadata block
pub const DELIMITER: &str = "---";

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

pub struct FrontmatterParser;

impl FrontmatterParser {
    /// Split note content into the raw frontmatter block and the body.
    ///
    /// Only a first line equal to `---` opens a block; the next `---` line closes it.
    /// Every body line keeps a trailing `\n`.
    pub fn split(content: &str) -> std::result::Result<(Option<String>, String), String> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut lines = content.lines();
        let mut body = String::with_capacity(content.len());
        let mut frontmatter = None;

        match lines.next() {
            None => return Ok((None, body)),
            Some(first) if is_delimiter(first) => {
                let mut block = String::new();
                let mut closed = false;
                for line in lines.by_ref() {
                    if is_delimiter(line) {
                        closed = true;
                        break;
                    }
                    block.push_str(line);
                    block.push('\n');
                }
                if !closed {
                    return Err("frontmatter block is never closed with '---'".to_string());
                }
                frontmatter = Some(block);
            }
            Some(first) => {
                body.push_str(first);
                body.push('\n');
            }
        }

        for line in lines {
            body.push_str(line);
            body.push('\n');
        }

        Ok((frontmatter, body))
    }

    /// Decode the raw block. An empty block yields the default frontmatter.
    pub fn parse_yaml(yaml_str: &str) -> std::result::Result<Frontmatter, String> {
        if yaml_str.trim().is_empty() {
            return Ok(Frontmatter::default());
        }
        serde_yaml::from_str::<Frontmatter>(yaml_str)
            .map_err(|e| format!("Failed to parse YAML: {}", e))
    }
}

/// Parse already-read note content. `path` only identifies the document.
pub fn parse_note_str(path: &Path, content: &str) -> Result<Document> {
    let (raw, body) = FrontmatterParser::split(content).map_err(|e| NotesError::parse(path, e))?;
    let frontmatter = match raw {
        Some(raw) => FrontmatterParser::parse_yaml(&raw).map_err(|e| NotesError::parse(path, e))?,
        None => Frontmatter::default(),
    };
    Ok(Document::from_parts(path, frontmatter, body))
}

/// Read and parse one note file
pub fn parse_note(path: &Path) -> Result<Document> {
    let content = fs::read_to_string(path).map_err(|e| NotesError::io(path, e))?;
    parse_note_str(path, &content)
}
