use crate::rules::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolderTagError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to update tags on {path}: {message}")]
    Mutation { path: String, message: String },

    #[error("Cannot undo: {0}")]
    UndoConflict(String),

    #[error("No pending move batch with id {0}")]
    BatchNotFound(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Frontmatter error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Failed to load settings file: {0}")]
    ConfigLoad(#[from] confique::Error),

    #[error("API error: {0}")]
    Api(String),
}

impl FolderTagError {
    pub fn mutation(path: impl Into<String>, message: impl ToString) -> Self {
        FolderTagError::Mutation {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FolderTagError>;
