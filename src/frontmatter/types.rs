use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Layout written by the note templates (`2024-01-31 09:30`)
pub const HUMAN_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a timestamp in one of the accepted layouts. First match wins:
/// `YYYY-MM-DD HH:MM`, RFC3339, `YYYY-MM-DD`. Values without a zone are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, HUMAN_TIME_FORMAT) {
        return Some(naive.and_utc());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NoteTimestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_timestamp(&s).map(NoteTimestamp).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "unrecognized timestamp '{}' (expected YYYY-MM-DD HH:MM, RFC3339 or YYYY-MM-DD)",
            s
        ))
    })
}

/// `created` / `updated` value from the frontmatter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct NoteTimestamp(pub DateTime<Utc>);

impl<'de> Deserialize<'de> for NoteTimestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_timestamp(deserializer)
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value;

    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// Scalars are accepted as strings so `title: 2024` still reads as a title
fn deserialize_title<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(None),
        other => scalar_to_string(&other)
            .map(Some)
            .ok_or_else(|| Error::custom("title must be a string")),
    }
}

// Tags are a list of scalars; a lone string counts as a one-element list
fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::Sequence(seq) => seq
            .iter()
            .map(|item| {
                scalar_to_string(item).ok_or_else(|| Error::custom("tags must be a list of strings"))
            })
            .collect(),
        Value::String(s) => Ok(vec![s]),
        Value::Null => Ok(Vec::new()),
        _ => Err(Error::custom("Invalid tags format")),
    }
}

/// Recognized frontmatter keys. Anything else in the block is ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Frontmatter {
    #[serde(default, deserialize_with = "deserialize_title")]
    pub title: Option<String>,

    #[serde(default)]
    pub created: Option<NoteTimestamp>,

    #[serde(default)]
    pub updated: Option<NoteTimestamp>,

    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
}

/// One parsed note
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Title from the frontmatter, empty when absent
    pub title: String,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub tags: BTreeSet<String>,
    pub body: String,
    /// Full path of the note file; identity for upsert/delete
    pub path: String,
}

impl Document {
    pub fn from_parts(path: &Path, frontmatter: Frontmatter, body: String) -> Self {
        Self {
            title: frontmatter.title.unwrap_or_default(),
            created: frontmatter.created.map(|t| t.0),
            updated: frontmatter.updated.map(|t| t.0),
            tags: frontmatter.tags.into_iter().collect(),
            body,
            path: path.to_string_lossy().to_string(),
        }
    }

    /// Title for display: the frontmatter title, or the file name without extension
    pub fn display_title(&self) -> String {
        if !self.title.is_empty() {
            return self.title.clone();
        }
        Path::new(&self.path)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn has_empty_body(&self) -> bool {
        self.body.trim().is_empty()
    }
}
