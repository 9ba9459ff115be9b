use crate::coordinator::collect_records;
use crate::github::{GitHubClient, GitHubConfig};
use crate::prelude::*;
use crate::source::{LocalBackend, RemoteBackend};
use changelog_core::aggregate::{build_template_data, TemplateData};
use changelog_core::config::{Config, ResolveType};
use changelog_core::render::{render, DEFAULT_TEMPLATE};
use changelog_core::urls::git_urls;
use std::path::PathBuf;
use std::sync::Arc;

/// Collect, sort and group the changes between `from` and `to`.
///
/// `repo_path` is only read when the config prefers local history.
pub async fn collect_changes(
    config: &Config,
    from: &str,
    to: &str,
    repo_path: PathBuf,
) -> Result<TemplateData> {
    let records = if config.prefer_local {
        let client = match config.resolve {
            ResolveType::PullRequests => Some(Arc::new(GitHubClient::new(
                GitHubConfig::from_config(config),
            )?)),
            ResolveType::Commits => None,
        };
        let backend = LocalBackend::new(config, repo_path, client);
        collect_records(&backend, from, to).await?
    } else {
        let client = Arc::new(GitHubClient::new(GitHubConfig::from_config(config))?);
        let backend = RemoteBackend::new(config, client);
        collect_records(&backend, from, to).await?
    };

    Ok(build_template_data(
        records,
        &config.groupings,
        config.sort_direction,
        from,
        to,
        git_urls(config, from, to),
    ))
}

/// Template source for a run: the configured file, or `fallback` when none is
/// configured or it cannot be read.
pub fn template_source(config: &Config, fallback: &str) -> String {
    let Some(path) = &config.template else {
        return fallback.to_string();
    };

    match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            log::warn!(
                "Unable to read template {}, using the default: {}",
                path.display(),
                e
            );
            fallback.to_string()
        }
    }
}

/// Render `data` with the run's template
pub fn render_changelog(config: &Config, data: &TemplateData) -> Result<String> {
    let template = template_source(config, DEFAULT_TEMPLATE);
    Ok(render(&template, data)?)
}
