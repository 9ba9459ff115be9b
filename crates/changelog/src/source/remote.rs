use crate::coordinator::RetrievalCoordinator;
use crate::github::GitHubClient;
use crate::prelude::*;
use changelog_core::config::Config;
use changelog_core::github::{raw_commit_from_github, truncate_commits};
use changelog_core::rules::ClassificationRules;
use std::sync::Arc;

use super::{resolve_commit, SourceBackend};

/// Reads history through the GitHub compare API.
///
/// Every commit that references a pull request is checked against that pull
/// request's title and labels.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: Arc<GitHubClient>,
    rules: Arc<ClassificationRules>,
    max_commits: usize,
}

impl RemoteBackend {
    pub fn new(config: &Config, client: Arc<GitHubClient>) -> Self {
        Self {
            client,
            rules: Arc::new(ClassificationRules::from_config(config)),
            max_commits: config.max_commits(),
        }
    }
}

impl SourceBackend for RemoteBackend {
    async fn process(
        &self,
        coordinator: &RetrievalCoordinator,
        from: &str,
        to: &str,
    ) -> Result<()> {
        let comparison = self.client.compare_commits(from, to).await?;

        let total = comparison.commits.len();
        let commits = truncate_commits(comparison.commits, self.max_commits);
        if commits.len() < total {
            log::warn!(
                "Processing {} of {} commits between {from} and {to}",
                commits.len(),
                total
            );
        }
        log::debug!("Spawning {} commit tasks", commits.len());

        for commit in commits {
            let raw = raw_commit_from_github(commit);
            let rules = Arc::clone(&self.rules);
            let client = Arc::clone(&self.client);
            coordinator.spawn(resolve_commit(raw, rules, Some(client)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::collect_records;
    use crate::github::GitHubConfig;
    use changelog_core::config::Grouping;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(exclude: &[&str], groupings: Vec<Grouping>) -> Config {
        Config {
            owner: "o".to_string(),
            repo: "r".to_string(),
            exclude: exclude.iter().map(|s| s.to_string()).collect(),
            groupings,
            ..Default::default()
        }
    }

    fn backend(server: &MockServer, config: &Config) -> RemoteBackend {
        let client = GitHubClient::new(GitHubConfig {
            api_base_url: server.uri(),
            owner: "o".to_string(),
            repo: "r".to_string(),
            token: None,
            timeout: Duration::from_secs(5),
        })
        .unwrap();
        RemoteBackend::new(config, Arc::new(client))
    }

    fn commit(sha: &str, message: &str, date: &str, parents: usize) -> serde_json::Value {
        json!({
            "sha": sha,
            "html_url": format!("https://github.com/o/r/commit/{sha}"),
            "commit": {
                "message": message,
                "author": { "name": "Octo Cat", "email": "octo@example.com", "date": date },
                "committer": { "name": "Octo Cat", "email": "octo@example.com", "date": date },
            },
            "author": { "login": "octocat", "html_url": "https://github.com/octocat" },
            "parents": (0..parents).map(|i| json!({ "sha": format!("p{i}") })).collect::<Vec<_>>(),
        })
    }

    async fn mount_compare(server: &MockServer, commits: Vec<serde_json::Value>) {
        Mock::given(method("GET"))
            .and(path("/repos/o/r/compare/v0.1.0...v0.2.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "html_url": "https://github.com/o/r/compare/v0.1.0...v0.2.0",
                "total_commits": commits.len(),
                "commits": commits,
            })))
            .mount(server)
            .await;
    }

    async fn titles(backend: &RemoteBackend) -> Vec<String> {
        let mut titles: Vec<String> = collect_records(backend, "v0.1.0", "v0.2.0")
            .await
            .unwrap()
            .iter()
            .map(|r| r.title().to_string())
            .collect();
        titles.sort();
        titles
    }

    #[tokio::test]
    async fn test_missing_pull_fails_open() {
        let server = MockServer::start().await;
        mount_compare(
            &server,
            vec![
                commit("aaaaaaaaaaaa", "Initial commit", "2020-02-29T20:33:40Z", 1),
                commit("bbbbbbbbbbbb", "Add placeholder args (#12)", "2020-02-29T20:43:07Z", 1),
            ],
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/pulls/12"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend(&server, &config(&[], vec![]));
        let records = collect_records(&backend, "v0.1.0", "v0.2.0").await.unwrap();
        assert_eq!(records.len(), 2);

        let pull = records.iter().find(|r| r.is_pull()).unwrap();
        assert_eq!(pull.pull_url(), "https://github.com/o/r/pull/12");
        assert_eq!(pull.author(), "octocat");
        assert_eq!(pull.timestamp().timestamp(), 1583008987);
    }

    #[tokio::test]
    async fn test_drops_merges_and_exclusions() {
        let server = MockServer::start().await;
        mount_compare(
            &server,
            vec![
                commit("aaaaaaaaaaaa", "Initial commit", "2020-02-29T20:33:40Z", 1),
                commit("cccccccccccc", "wip: scratch changes", "2020-02-29T20:35:00Z", 1),
                commit("dddddddddddd", "Merge branch 'main'", "2020-02-29T20:36:00Z", 2),
                commit("eeeeeeeeeeee", "Bump deps (#13)", "2020-02-29T20:37:00Z", 1),
            ],
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/pulls/13"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "number": 13,
                "title": "Bump deps",
                "html_url": "https://github.com/o/r/pull/13",
                "labels": [{ "name": "dependencies" }],
            })))
            .mount(&server)
            .await;

        let backend = backend(&server, &config(&["wip", "^dependencies$"], vec![]));
        assert_eq!(titles(&backend).await, vec!["Initial commit"]);
    }

    #[tokio::test]
    async fn test_found_pull_enriches_author() {
        let server = MockServer::start().await;
        mount_compare(
            &server,
            vec![commit("bbbbbbbbbbbb", "Add placeholder args (#12)", "2020-02-29T20:43:07Z", 1)],
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/pulls/12"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "number": 12,
                "title": "Add placeholder args",
                "html_url": "https://github.com/o/r/pull/12",
                "user": { "login": "contributor", "html_url": "https://github.com/contributor" },
                "labels": [],
            })))
            .mount(&server)
            .await;

        let groupings = vec![Grouping {
            name: "Features".to_string(),
            patterns: vec!["^Add".to_string()],
        }];
        let backend = backend(&server, &config(&[], groupings));
        let records = collect_records(&backend, "v0.1.0", "v0.2.0").await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].author(), "contributor");
        assert_eq!(records[0].group(), "Features");
    }

    #[tokio::test]
    async fn test_respects_max_commits() {
        let server = MockServer::start().await;
        let commits = (0..5)
            .map(|i| commit(&format!("{i:012}"), &format!("Change {i}"), "2020-02-29T20:33:40Z", 1))
            .collect();
        mount_compare(&server, commits).await;

        let mut config = config(&[], vec![]);
        config.max_commits = Some(3);
        let backend = backend(&server, &config);
        assert_eq!(titles(&backend).await, vec!["Change 0", "Change 1", "Change 2"]);
    }

    #[tokio::test]
    async fn test_compare_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(422).set_body_string("No common ancestor"))
            .mount(&server)
            .await;

        let backend = backend(&server, &config(&[], vec![]));
        let err = collect_records(&backend, "v0.1.0", "v0.2.0")
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("No common ancestor"));
    }
}
