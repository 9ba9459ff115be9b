use crate::coordinator::RetrievalCoordinator;
use crate::github::GitHubClient;
use crate::prelude::*;
use changelog_core::classify::RawCommit;
use changelog_core::config::{Config, ResolveType};
use changelog_core::rules::ClassificationRules;
use changelog_core::urls::commit_url;
use chrono::DateTime;
use git2::{Commit, Oid, Repository};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::spawn_blocking;

use super::{resolve_commit, SourceBackend};

/// Reads history from a clone on disk.
///
/// Pull request lookups only happen when the config resolves pull requests.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    repo_path: PathBuf,
    config: Arc<Config>,
    rules: Arc<ClassificationRules>,
    pulls: Option<Arc<GitHubClient>>,
}

impl LocalBackend {
    pub fn new(config: &Config, repo_path: PathBuf, client: Option<Arc<GitHubClient>>) -> Self {
        let pulls = match config.resolve {
            ResolveType::PullRequests => client,
            ResolveType::Commits => None,
        };

        Self {
            repo_path,
            config: Arc::new(config.clone()),
            rules: Arc::new(ClassificationRules::from_config(config)),
            pulls,
        }
    }
}

impl SourceBackend for LocalBackend {
    async fn process(
        &self,
        coordinator: &RetrievalCoordinator,
        from: &str,
        to: &str,
    ) -> Result<()> {
        let repo_path = self.repo_path.clone();
        let config = Arc::clone(&self.config);
        let (from, to) = (from.to_string(), to.to_string());

        // git2 is blocking
        let commits = spawn_blocking(move || walk_range(&repo_path, &config, &from, &to))
            .await
            .map_err(|e| eyre!("Repository walk panicked: {}", e))??;

        log::debug!("Spawning {} commit tasks", commits.len());
        for raw in commits {
            let rules = Arc::clone(&self.rules);
            let pulls = self.pulls.clone();
            coordinator.spawn(resolve_commit(raw, rules, pulls));
        }

        Ok(())
    }
}

/// Breadth-first walk over parents from `to`, stopping at `from`.
///
/// `from` itself is never included. When a maximum commit count is configured
/// the walk stops once that many commits were collected.
fn walk_range(repo_path: &Path, config: &Config, from: &str, to: &str) -> Result<Vec<RawCommit>> {
    let repo = Repository::open(repo_path).map_err(|e| Error::Repository {
        path: repo_path.display().to_string(),
        message: e.message().to_string(),
    })?;

    let from_id = resolve_revision(&repo, from)?;
    let to_id = resolve_revision(&repo, to)?;

    let mut commits = Vec::new();
    let mut visited = HashSet::from([to_id]);
    let mut queue = VecDeque::from([to_id]);

    while let Some(id) = queue.pop_front() {
        if id == from_id {
            log::debug!("Reached {from} ({id})");
            break;
        }
        if config.max_commits.is_some_and(|max| commits.len() >= max) {
            log::warn!("Stopping after {} commits", commits.len());
            break;
        }

        let commit = repo.find_commit(id)?;
        for parent in commit.parent_ids() {
            if visited.insert(parent) {
                queue.push_back(parent);
            }
        }
        commits.push(raw_commit_from_git(&commit, config));
    }

    Ok(commits)
}

fn resolve_revision(repo: &Repository, revision: &str) -> Result<Oid> {
    let commit = repo
        .revparse_single(revision)
        .and_then(|object| object.peel_to_commit())
        .map_err(|e| Error::Revision {
            revision: revision.to_string(),
            message: e.message().to_string(),
        })?;
    Ok(commit.id())
}

fn raw_commit_from_git(commit: &Commit<'_>, config: &Config) -> RawCommit {
    let sha = commit.id().to_string();
    let author = commit.author();

    RawCommit {
        message: commit.message().map(str::to_string),
        parent_count: commit.parent_count(),
        author: author.name().map(str::to_string),
        author_url: None,
        timestamp: DateTime::from_timestamp(commit.committer().when().seconds(), 0),
        commit_url: Some(commit_url(config, &sha)),
        sha: Some(sha),
    }
}
