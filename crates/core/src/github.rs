//! GitHub REST API response types and their transformations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::RawCommit;

// =============================================================================
// API Response Types (Deserialization)
// =============================================================================

/// Response of `GET /repos/{owner}/{repo}/compare/{base}...{head}`
#[derive(Debug, Deserialize, Clone, Default)]
pub struct GitHubComparison {
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub diff_url: Option<String>,
    #[serde(default)]
    pub patch_url: Option<String>,
    #[serde(default)]
    pub total_commits: Option<u64>,
    #[serde(default)]
    pub commits: Vec<GitHubRepositoryCommit>,
}

/// A commit as listed by the compare endpoint
#[derive(Debug, Deserialize, Clone, Default)]
pub struct GitHubRepositoryCommit {
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub commit: Option<GitHubGitCommit>,
    /// GitHub account associated with the commit author email, if any
    #[serde(default)]
    pub author: Option<GitHubUser>,
    #[serde(default)]
    pub parents: Vec<GitHubCommitRef>,
}

/// Git-level commit data
#[derive(Debug, Deserialize, Clone, Default)]
pub struct GitHubGitCommit {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub author: Option<GitHubSignature>,
    #[serde(default)]
    pub committer: Option<GitHubSignature>,
}

/// Name, email and date of a git author or committer
#[derive(Debug, Deserialize, Clone, Default)]
pub struct GitHubSignature {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// Parent reference
#[derive(Debug, Deserialize, Clone, Default)]
pub struct GitHubCommitRef {
    #[serde(default)]
    pub sha: Option<String>,
}

/// GitHub account
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct GitHubUser {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Response of `GET /repos/{owner}/{repo}/pulls/{number}`
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct GitHubPullRequest {
    pub number: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub user: Option<GitHubUser>,
    #[serde(default)]
    pub labels: Vec<GitHubLabel>,
}

/// Pull request label
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct GitHubLabel {
    #[serde(default)]
    pub name: Option<String>,
}

// =============================================================================
// Pure Transformation Functions
// =============================================================================

/// Convert a compare API commit into a [`RawCommit`].
///
/// The timestamp is the git author date. Author identity is the associated
/// GitHub account, absent when the commit email is not linked to one.
pub fn raw_commit_from_github(commit: GitHubRepositoryCommit) -> RawCommit {
    let (message, timestamp) = match commit.commit {
        Some(git) => (git.message, git.author.and_then(|a| a.date)),
        None => (None, None),
    };
    let (author, author_url) = match commit.author {
        Some(user) => (user.login, user.html_url),
        None => (None, None),
    };

    RawCommit {
        sha: commit.sha,
        message,
        parent_count: commit.parents.len(),
        author,
        author_url,
        timestamp,
        commit_url: commit.html_url,
    }
}

/// Keep at most `max` commits of a comparison, in API order
pub fn truncate_commits(
    commits: Vec<GitHubRepositoryCommit>,
    max: usize,
) -> Vec<GitHubRepositoryCommit> {
    let limit = commits.len().min(max).min(crate::config::COMPARE_API_LIMIT);
    commits.into_iter().take(limit).collect()
}

// =============================================================================
// Tests
// =============================================================================
