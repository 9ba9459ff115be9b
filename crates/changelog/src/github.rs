use crate::prelude::*;
use changelog_core::config::Config;
use changelog_core::github::{GitHubComparison, GitHubPullRequest};
use changelog_core::rules::ClassificationRules;
use changelog_core::urls::api_base_url;
use std::future::Future;
use std::time::Duration;

/// GitHub API configuration, built from the run config and environment variables
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub api_base_url: String,
    pub owner: String,
    pub repo: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl GitHubConfig {
    /// Build from a run config. The token is read from `GITHUB_TOKEN` when set.
    pub fn from_config(config: &Config) -> Self {
        let token = std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        if token.is_none() {
            log::warn!("GITHUB_TOKEN is not set, requests are subject to anonymous rate limits");
        }

        Self {
            api_base_url: api_base_url(config.enterprise.as_deref()),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            token,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Create an HTTP client carrying the GitHub headers
pub fn create_github_client(config: &GitHubConfig) -> Result<reqwest::Client> {
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};

    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert(
        "X-GitHub-Api-Version",
        HeaderValue::from_static("2022-11-28"),
    );
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("changelog/", env!("CARGO_PKG_VERSION"))),
    );
    if let Some(token) = &config.token {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&f!("Bearer {token}"))
                .map_err(|e| eyre!("Invalid header value: {}", e))?,
        );
    }

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
}

/// Client for the handful of GitHub endpoints a changelog needs
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    config: GitHubConfig,
}

impl GitHubClient {
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let http = create_github_client(&config)?;
        Ok(Self { http, config })
    }

    fn repo_url(&self) -> String {
        f!(
            "{}/repos/{}/{}",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.owner,
            self.config.repo
        )
    }

    /// Run a request future under the configured timeout
    async fn bounded<T>(&self, request: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.config.timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(self.config.timeout.as_secs()).into()),
        }
    }

    /// Compare two refs.
    ///
    /// The API returns at most 250 commits regardless of how far apart the refs are.
    pub async fn compare_commits(&self, from: &str, to: &str) -> Result<GitHubComparison> {
        let url = f!("{}/compare/{}...{}", self.repo_url(), from, to);
        log::debug!("Comparing {from}...{to}: {url}");

        self.bounded(async {
            let response = self
                .http
                .get(&url)
                .send()
                .await
                .map_err(|e| Error::Network(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::Api { status, body }.into());
            }

            response
                .json::<GitHubComparison>()
                .await
                .map_err(|e| eyre!("Failed to parse GitHub compare response: {}", e))
        })
        .await
        .map_err(|e| e.wrap_err(f!("Unable to compare {from}...{to}")))
    }

    /// Fetch one pull request. A 404 yields `Ok(None)`.
    pub async fn get_pull_request(&self, number: u64) -> Result<Option<GitHubPullRequest>> {
        let url = f!("{}/pulls/{}", self.repo_url(), number);

        self.bounded(async {
            let response = self
                .http
                .get(&url)
                .send()
                .await
                .map_err(|e| Error::Network(e.to_string()))?;

            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::Api { status, body }.into());
            }

            let pull = response
                .json::<GitHubPullRequest>()
                .await
                .map_err(|e| eyre!("Failed to parse GitHub pull request response: {}", e))?;
            Ok(Some(pull))
        })
        .await
    }
}

/// Look up pull request `number` and decide whether it is excluded.
///
/// Any failure, including a missing pull request, is logged and treated as
/// "not excluded" so the commit is kept.
pub async fn pull_exclusion(
    client: &GitHubClient,
    number: u64,
    rules: &ClassificationRules,
) -> (Option<GitHubPullRequest>, bool) {
    match client.get_pull_request(number).await {
        Ok(Some(pull)) => {
            let excluded = rules.excludes_pull(&pull);
            if excluded {
                log::debug!("Excluding pull request #{number}");
            }
            (Some(pull), excluded)
        }
        Ok(None) => {
            log::debug!("Pull request #{number} not found, keeping commit");
            (None, false)
        }
        Err(err) => {
            log::warn!("Pull request #{number} lookup failed, keeping commit: {err:#}");
            (None, false)
        }
    }
}
