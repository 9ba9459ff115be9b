#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("Generic {0}")]
    Generic(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("GitHub API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Unable to open repository {path}: {message}")]
    Repository { path: String, message: String },

    #[error("Unable to resolve revision {revision}: {message}")]
    Revision { revision: String, message: String },
}
