//! Exclusion, grouping and pull-request detection rules
//!
//! Patterns come from user configuration and are compiled once per run. Each
//! pattern is tried as a regular expression first; text that does not compile
//! as a regex is matched as a plain substring instead.

use regex::Regex;
use std::sync::LazyLock;

use crate::change_record::ChangeRecord;
use crate::config::{Config, Grouping};
use crate::github::GitHubPullRequest;

/// Matches "Some title (#1234)" and "Merge pull request #523 from ..."
static PULL_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".+?#(\d+).+?").expect("pull reference regex is valid"));

/// A single user-supplied pattern
#[derive(Debug, Clone)]
pub enum Pattern {
    Regex(Regex),
    Literal(String),
}

impl Pattern {
    pub fn new(source: &str) -> Self {
        match Regex::new(source) {
            Ok(re) => Pattern::Regex(re),
            Err(_) => {
                log::debug!("Pattern {source:?} is not a valid regex, matching as text");
                Pattern::Literal(source.to_string())
            }
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Pattern::Regex(re) => re.is_match(text),
            Pattern::Literal(literal) => text.contains(literal.as_str()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Pattern::Regex(re) => re.as_str(),
            Pattern::Literal(literal) => literal,
        }
    }
}

#[derive(Debug, Clone)]
struct GroupRule {
    name: String,
    patterns: Vec<Pattern>,
}

/// Compiled exclusion and grouping rules for one run
#[derive(Debug, Clone, Default)]
pub struct ClassificationRules {
    exclude: Vec<Pattern>,
    groups: Vec<GroupRule>,
}

impl ClassificationRules {
    pub fn new(exclude: &[String], groupings: &[Grouping]) -> Self {
        Self {
            exclude: exclude.iter().map(|p| Pattern::new(p)).collect(),
            groups: groupings
                .iter()
                .map(|g| GroupRule {
                    name: g.name.clone(),
                    patterns: g.patterns.iter().map(|p| Pattern::new(p)).collect(),
                })
                .collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.exclude, &config.groupings)
    }

    /// True when `text` matches any exclusion pattern
    pub fn should_exclude(&self, text: &str) -> bool {
        match self.exclude.iter().find(|p| p.is_match(text)) {
            Some(pattern) => {
                log::debug!("Excluding {text:?} via pattern {:?}", pattern.as_str());
                true
            }
            None => false,
        }
    }

    /// Name of the first group, in declaration order, with a pattern matching the
    /// title of `message`
    pub fn find_group(&self, message: &str) -> Option<&str> {
        let title = crate::change_record::title_of(message);
        let group = self
            .groups
            .iter()
            .find(|g| g.patterns.iter().any(|p| p.is_match(title)))?;

        log::debug!("Found group {:?} for commit {title:?}", group.name);
        Some(group.name.as_str())
    }

    /// Whether a pull request's title or any of its labels is excluded.
    ///
    /// The title is checked before labels; evaluation stops at the first match.
    pub fn excludes_pull(&self, pull: &GitHubPullRequest) -> bool {
        if pull.title.as_deref().is_some_and(|t| self.should_exclude(t)) {
            return true;
        }
        pull.labels
            .iter()
            .filter_map(|l| l.name.as_deref())
            .any(|name| self.should_exclude(name))
    }
}

/// Pull request number referenced by a commit title, if any
pub fn pull_reference(title: &str) -> Option<&str> {
    PULL_REFERENCE
        .captures(title)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Derive a pull request URL from a commit URL.
///
/// `https://github.com/o/r/commit/abc` with number `12` becomes
/// `https://github.com/o/r/pull/12`. Returns `None` when the commit URL has no
/// `/commit` path segment.
pub fn pull_url_from_commit_url(commit_url: &str, number: &str) -> Option<String> {
    let idx = commit_url.rfind("/commit")?;
    if idx == 0 {
        return None;
    }
    Some(format!("{}/pull/{}", &commit_url[..idx], number))
}

/// Mark a record as a pull request contribution when its title references one.
///
/// When the commit URL cannot be rewritten the record is still flagged as a
/// pull, with no pull URL.
pub fn apply_pull_properties(record: &mut ChangeRecord) {
    let Some(number) = pull_reference(record.title()) else {
        return;
    };
    let number = number.to_string();

    record.is_pull = Some(true);
    record.pull_url = pull_url_from_commit_url(record.commit_url(), &number);

    log::debug!(
        "Applied pull properties: commit_url={:?} pull_url={:?}",
        record.commit_url(),
        record.pull_url()
    );
}
