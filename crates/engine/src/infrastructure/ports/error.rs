//! Error types shared by the infrastructure ports.

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("Not found")]
    NotFound,
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Content source unreachable: {0}")]
    Unavailable(String),
    #[error("Malformed content at {path}: {detail}")]
    Malformed { path: String, detail: String },
}
