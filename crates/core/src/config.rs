//! Changelog configuration and its file formats
//!
//! A config file is optional. JSON, TOML and YAML are accepted, selected by file
//! extension, and any field left out falls back to its default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Maximum number of commits returned by GitHub's compare API
pub const COMPARE_API_LIMIT: usize = 250;

/// Default wall-clock budget for a single remote call
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Whether to resolve commits only or also query pull request information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ResolveType {
    #[default]
    Commits,
    PullRequests,
}

impl TryFrom<String> for ResolveType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim() {
            "commits" => Ok(ResolveType::Commits),
            "pulls" | "pullrequest" | "prs" => Ok(ResolveType::PullRequests),
            _ => Err(Error::UnknownResolveType(value)),
        }
    }
}

impl From<ResolveType> for String {
    fn from(value: ResolveType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ResolveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveType::Commits => write!(f, "commits"),
            ResolveType::PullRequests => write!(f, "pulls"),
        }
    }
}

/// Order of commits within the changelog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortDirection {
    /// Most recent commits first
    #[default]
    Descending,
    /// Earliest commits first
    Ascending,
}

impl From<String> for SortDirection {
    // Anything unrecognized is treated as descending
    fn from(value: String) -> Self {
        match value.trim() {
            "asc" | "ascending" | "ASC" => SortDirection::Ascending,
            _ => SortDirection::Descending,
        }
    }
}

impl From<SortDirection> for String {
    fn from(value: SortDirection) -> Self {
        value.to_string()
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "asc"),
            SortDirection::Descending => write!(f, "desc"),
        }
    }
}

/// A named set of patterns used to bucket commits under a heading.
///
/// Patterns are evaluated against the commit title only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grouping {
    pub name: String,
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// User configuration for a changelog run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub resolve: ResolveType,

    /// User or organization owning the repository
    #[serde(default)]
    pub owner: String,

    #[serde(default)]
    pub repo: String,

    /// Commits are associated with the first matching group
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groupings: Vec<Grouping>,

    /// Regex patterns or plain texts. A commit title, group name, pull title or
    /// pull label matching any of them is left out of the changelog.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    /// Base URL when targeting GitHub Enterprise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enterprise: Option<String>,

    /// Path to a custom template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,

    #[serde(default, rename = "sort")]
    pub sort_direction: SortDirection,

    /// Read commits from the local clone instead of the API
    #[serde(default, rename = "local")]
    pub prefer_local: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_commits: Option<usize>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolve: ResolveType::default(),
            owner: String::new(),
            repo: String::new(),
            groupings: Vec::new(),
            exclude: Vec::new(),
            enterprise: None,
            template: None,
            sort_direction: SortDirection::default(),
            prefer_local: false,
            max_commits: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Maximum number of commits to process, defaulting to the compare API limit
    pub fn max_commits(&self) -> usize {
        self.max_commits.unwrap_or(COMPARE_API_LIMIT)
    }

    /// Ensure owner and repo are known
    pub fn validate(&self) -> Result<(), Error> {
        let mut required = Vec::new();
        if self.owner.is_empty() {
            required.push("'-o, --owner'");
        }
        if self.repo.is_empty() {
            required.push("'-r, --repo'");
        }

        match required.as_slice() {
            [] => Ok(()),
            [only] => Err(Error::MissingRequired(only.to_string())),
            [rest @ .., last] => Err(Error::MissingRequired(format!(
                "{} and {}",
                rest.join(", "),
                last
            ))),
        }
    }

    /// Apply command-line values on top of a loaded config.
    ///
    /// Non-empty owner/repo always win over the file.
    pub fn with_overrides(
        mut self,
        owner: &str,
        repo: &str,
        max_commits: Option<usize>,
        prefer_local: Option<bool>,
    ) -> Self {
        if !owner.is_empty() {
            self.owner = owner.to_string();
        }
        if !repo.is_empty() {
            self.repo = repo.to_string();
        }
        if max_commits.is_some() {
            self.max_commits = max_commits;
        }
        if let Some(local) = prefer_local {
            self.prefer_local = local;
        }
        self
    }
}

/// Parse config text, choosing the format from the path's extension
pub fn parse_config(path: &Path, contents: &str) -> Result<Config, Error> {
    let parse_err = |message: String| Error::ConfigParse {
        path: path.display().to_string(),
        message,
    };

    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(contents).map_err(|e| parse_err(e.to_string())),
        Some("toml") => toml::from_str(contents).map_err(|e| parse_err(e.to_string())),
        _ => serde_yaml::from_str(contents).map_err(|e| parse_err(e.to_string())),
    }
}

/// Load a config from `path`, or defaults when no path is given or the file does
/// not exist
pub fn load_config(path: Option<&Path>) -> Result<Config, Error> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(path, &contents),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("Config {} not found, using defaults", path.display());
            Ok(Config::default())
        }
        Err(e) => Err(Error::ConfigRead {
            path: path.display().to_string(),
            message: e.to_string(),
        }),
    }
}
