//! Normalized representation of a single changelog contribution

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Timestamp used when a commit has no known date.
///
/// This is the zero instant, not the Unix epoch. Renderers should treat it as
/// "unknown".
pub const UNKNOWN_TIMESTAMP: DateTime<Utc> = DateTime::<Utc>::MIN_UTC;

const SHORT_HASH_LEN: usize = 10;

/// One commit that survived classification.
///
/// Every field is optional because backends cannot always resolve them (e.g. a
/// commit email with no associated account has no author login). Accessors
/// define the "absent" value of each field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeRecord {
    pub author: Option<String>,
    pub author_url: Option<String>,
    /// Full commit message; see [`ChangeRecord::title`]
    pub message: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub is_pull: Option<bool>,
    /// Only set when `is_pull` is true
    pub pull_url: Option<String>,
    pub commit_hash: Option<String>,
    pub commit_url: Option<String>,
    pub group: Option<String>,
}

impl ChangeRecord {
    pub fn author(&self) -> &str {
        self.author.as_deref().unwrap_or_default()
    }

    pub fn author_url(&self) -> &str {
        self.author_url.as_deref().unwrap_or_default()
    }

    /// First line of the commit message, or empty
    pub fn title(&self) -> &str {
        title_of(self.message.as_deref().unwrap_or_default())
    }

    /// Commit date, or [`UNKNOWN_TIMESTAMP`]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp.unwrap_or(UNKNOWN_TIMESTAMP)
    }

    pub fn has_known_timestamp(&self) -> bool {
        self.timestamp.is_some_and(|t| t != UNKNOWN_TIMESTAMP)
    }

    pub fn is_pull(&self) -> bool {
        self.is_pull.unwrap_or(false)
    }

    pub fn pull_url(&self) -> &str {
        self.pull_url.as_deref().unwrap_or_default()
    }

    pub fn commit_hash(&self) -> &str {
        self.commit_hash.as_deref().unwrap_or_default()
    }

    /// First ten characters of the commit hash, or the whole hash when shorter
    pub fn commit_hash_short(&self) -> &str {
        let hash = self.commit_hash();
        match hash.char_indices().nth(SHORT_HASH_LEN) {
            Some((idx, _)) => &hash[..idx],
            None => hash,
        }
    }

    pub fn commit_url(&self) -> &str {
        self.commit_url.as_deref().unwrap_or_default()
    }

    pub fn group(&self) -> &str {
        self.group.as_deref().unwrap_or_default()
    }

    /// Numeric pull request ID taken from the last path segment of the pull URL
    pub fn pull_id(&self) -> Option<u64> {
        let url = self.pull_url();
        if url.is_empty() {
            return None;
        }
        url.trim_end_matches('/').rsplit('/').next()?.parse().ok()
    }
}

/// First line of a commit message
pub fn title_of(message: &str) -> &str {
    let line = message.split('\n').next().unwrap_or_default();
    line.strip_suffix('\r').unwrap_or(line)
}

/// Flattened view of a [`ChangeRecord`] exposed to templates
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TemplateItem {
    pub author: String,
    pub author_url: String,
    pub title: String,
    /// RFC 3339 date, empty when unknown
    pub date: String,
    pub is_pull: bool,
    pub pull_url: String,
    pub commit: String,
    pub commit_short: String,
    pub commit_url: String,
    pub group: String,
}

impl From<&ChangeRecord> for TemplateItem {
    fn from(record: &ChangeRecord) -> Self {
        let date = if record.has_known_timestamp() {
            record.timestamp().to_rfc3339()
        } else {
            String::new()
        };

        Self {
            author: record.author().to_string(),
            author_url: record.author_url().to_string(),
            title: record.title().to_string(),
            date,
            is_pull: record.is_pull(),
            pull_url: record.pull_url().to_string(),
            commit: record.commit_hash().to_string(),
            commit_short: record.commit_hash_short().to_string(),
            commit_url: record.commit_url().to_string(),
            group: record.group().to_string(),
        }
    }
}
