//! Core library for changelog
//!
//! This crate implements the **Functional Core** of the changelog application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`changelog_core`** (this crate): Pure data types and transformations with zero network
//!   or git I/O
//! - **`changelog`**: GitHub and local repository access, concurrency and orchestration (the
//!   Imperative Shell)
//!
//! Everything that decides *what* ends up in a changelog lives here: how a commit is
//! classified, which records are excluded or grouped, how pull requests are detected, how
//! records are ordered and how the final document is rendered. The shell only fetches raw
//! commits, performs the pull request lookups the core asks for, and moves results between
//! tasks.
//!
//! # Module Organization
//!
//! - [`change_record`]: The normalized record of one changelog entry
//! - [`classify`]: Per-commit classification shared by every history source
//! - [`rules`]: Exclusion, grouping and pull request detection rules
//! - [`github`]: GitHub API response types and their transformations
//! - [`aggregate`]: Sorting and grouping of classified records
//! - [`render`]: Template rendering
//! - [`config`]: User configuration and config file loading
//! - [`urls`]: Web and API URL construction
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use changelog_core::classify::{classify_commit, Classification, RawCommit};
//! use changelog_core::rules::ClassificationRules;
//!
//! let rules = ClassificationRules::new(&["wip".to_string()], &[]);
//! let raw = RawCommit {
//!     message: Some("wip: scratch changes".to_string()),
//!     parent_count: 1,
//!     ..Default::default()
//! };
//!
//! assert!(matches!(classify_commit(raw, &rules), Classification::Dropped(_)));
//! ```

pub mod aggregate;
pub mod change_record;
pub mod classify;
pub mod config;
pub mod error;
pub mod github;
pub mod render;
pub mod rules;
pub mod urls;

pub use error::Error;
