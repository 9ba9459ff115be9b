//! GitHub web and API URL construction

use serde::Serialize;

use crate::config::Config;

pub const GITHUB_WEB_URL: &str = "https://github.com";
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Links to the full comparison between two refs
#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct GitUrls {
    pub compare_url: String,
    pub diff_url: String,
    pub patch_url: String,
}

/// Web base URL, e.g. `https://github.com` or the enterprise host.
///
/// A trailing `/api` or `/api/v3` on the enterprise URL is removed.
pub fn web_base_url(enterprise: Option<&str>) -> String {
    match enterprise.map(str::trim).filter(|e| !e.is_empty()) {
        Some(url) => {
            let url = url.trim_end_matches('/');
            let url = url.strip_suffix("/api/v3").unwrap_or(url);
            let url = url.strip_suffix("/api").unwrap_or(url);
            url.to_string()
        }
        None => GITHUB_WEB_URL.to_string(),
    }
}

/// REST API base URL.
///
/// Enterprise hosts serve the API under `/api/v3`; the suffix is appended when
/// the configured URL does not already carry it.
pub fn api_base_url(enterprise: Option<&str>) -> String {
    match enterprise.map(str::trim).filter(|e| !e.is_empty()) {
        Some(url) => {
            let url = url.trim_end_matches('/');
            if url.ends_with("/api/v3") {
                url.to_string()
            } else if let Some(host) = url.strip_suffix("/api") {
                format!("{host}/api/v3")
            } else {
                format!("{url}/api/v3")
            }
        }
        None => GITHUB_API_URL.to_string(),
    }
}

/// Web URL of a single commit
pub fn commit_url(config: &Config, hash: &str) -> String {
    format!(
        "{}/{}/{}/commit/{}",
        web_base_url(config.enterprise.as_deref()),
        config.owner,
        config.repo,
        hash
    )
}

/// Compare, diff and patch URLs for `from...to`
pub fn git_urls(config: &Config, from: &str, to: &str) -> GitUrls {
    let compare = format!(
        "{}/{}/{}/compare/{}...{}",
        web_base_url(config.enterprise.as_deref()),
        config.owner,
        config.repo,
        from,
        to
    );

    GitUrls {
        diff_url: format!("{compare}.diff"),
        patch_url: format!("{compare}.patch"),
        compare_url: compare,
    }
}
