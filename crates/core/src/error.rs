/// Errors produced by the functional core
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Unable to read config {path}: {message}")]
    ConfigRead { path: String, message: String },

    #[error("Unable to parse config {path}: {message}")]
    ConfigParse { path: String, message: String },

    #[error("Unknown resolve type {0:?}")]
    UnknownResolveType(String),

    #[error("The required arguments {0} were not provided")]
    MissingRequired(String),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}
