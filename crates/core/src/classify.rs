//! Per-commit classification shared by every history source
//!
//! Backends turn whatever they read into a [`RawCommit`]; [`classify_commit`]
//! decides whether that commit is dropped, emitted as-is, or needs a pull
//! request lookup before a decision can be made. The lookup itself is I/O and
//! lives in the shell; [`enrich_from_pull`] applies its result.

use chrono::{DateTime, Utc};

use crate::change_record::{title_of, ChangeRecord};
use crate::github::GitHubPullRequest;
use crate::rules::{apply_pull_properties, ClassificationRules};

/// Backend-neutral snapshot of one commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCommit {
    pub sha: Option<String>,
    pub message: Option<String>,
    pub parent_count: usize,
    pub author: Option<String>,
    pub author_url: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub commit_url: Option<String>,
}

/// Why a commit was left out of the changelog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    MergeCommit,
    ExcludedTitle,
    ExcludedGroup,
    ExcludedPull,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::MergeCommit => write!(f, "merge commit"),
            DropReason::ExcludedTitle => write!(f, "excluded title"),
            DropReason::ExcludedGroup => write!(f, "excluded group"),
            DropReason::ExcludedPull => write!(f, "excluded pull request"),
        }
    }
}

/// Outcome of classifying a single commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Dropped(DropReason),
    /// The record can be emitted without further lookups
    Ready(ChangeRecord),
    /// The title references a pull request that should be checked for exclusion
    PullCandidate { record: ChangeRecord, pull_id: u64 },
}

/// Apply merge suppression, exclusion, grouping and pull detection to a commit.
///
/// A commit that looks like a pull request but whose pull ID cannot be parsed
/// is returned as [`Classification::Ready`] with its pull flag kept.
pub fn classify_commit(commit: RawCommit, rules: &ClassificationRules) -> Classification {
    if commit.parent_count > 1 {
        return Classification::Dropped(DropReason::MergeCommit);
    }

    let message = commit.message.unwrap_or_default();
    if rules.should_exclude(title_of(&message)) {
        return Classification::Dropped(DropReason::ExcludedTitle);
    }

    let group = rules.find_group(&message).map(str::to_string);
    if group.as_deref().is_some_and(|g| rules.should_exclude(g)) {
        return Classification::Dropped(DropReason::ExcludedGroup);
    }

    let mut record = ChangeRecord {
        author: commit.author,
        author_url: commit.author_url,
        message: Some(message),
        timestamp: commit.timestamp,
        is_pull: None,
        pull_url: None,
        commit_hash: commit.sha,
        commit_url: commit.commit_url,
        group,
    };

    apply_pull_properties(&mut record);
    if !record.is_pull() {
        return Classification::Ready(record);
    }

    match record.pull_id() {
        Some(pull_id) => Classification::PullCandidate { record, pull_id },
        None => Classification::Ready(record),
    }
}

/// Take author and pull URL from a pull request that was found and not excluded.
///
/// Fields the pull request does not provide keep their commit-sourced values.
pub fn enrich_from_pull(mut record: ChangeRecord, pull: &GitHubPullRequest) -> ChangeRecord {
    if let Some(url) = &pull.html_url {
        record.pull_url = Some(url.clone());
    }
    if let Some(user) = &pull.user {
        if user.login.is_some() {
            record.author = user.login.clone();
            record.author_url = user.html_url.clone();
        }
    }
    record
}
