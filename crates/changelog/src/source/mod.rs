//! Commit history sources
//!
//! - [`remote`]: the GitHub compare API
//! - [`local`]: a clone on disk, read through libgit2

use crate::coordinator::RetrievalCoordinator;
use crate::github::{pull_exclusion, GitHubClient};
use crate::prelude::*;
use changelog_core::change_record::ChangeRecord;
use changelog_core::classify::{classify_commit, enrich_from_pull, Classification, DropReason, RawCommit};
use changelog_core::rules::ClassificationRules;
use std::sync::Arc;

pub mod local;
pub mod remote;

pub use local::LocalBackend;
pub use remote::RemoteBackend;

/// Produces change records for the commits between two refs
pub trait SourceBackend {
    /// Read the history between `from` and `to` and spawn one task per commit on
    /// `coordinator`. Returns once every task has been spawned.
    async fn process(&self, coordinator: &RetrievalCoordinator, from: &str, to: &str)
        -> Result<()>;
}

/// Classify one commit, consulting GitHub when the commit references a pull
/// request and `pulls` is available.
pub async fn resolve_commit(
    raw: RawCommit,
    rules: Arc<ClassificationRules>,
    pulls: Option<Arc<GitHubClient>>,
) -> Option<ChangeRecord> {
    let sha = raw.sha.clone().unwrap_or_default();

    let (record, pull_id) = match classify_commit(raw, &rules) {
        Classification::Dropped(reason) => {
            log::debug!("Skipping {sha}: {reason}");
            return None;
        }
        Classification::Ready(record) => return Some(record),
        Classification::PullCandidate { record, pull_id } => (record, pull_id),
    };

    let Some(client) = pulls else {
        return Some(record);
    };

    match pull_exclusion(&client, pull_id, &rules).await {
        (_, true) => {
            log::debug!("Skipping {sha}: {}", DropReason::ExcludedPull);
            None
        }
        (Some(pull), false) => Some(enrich_from_pull(record, &pull)),
        (None, false) => Some(record),
    }
}
