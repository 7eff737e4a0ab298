//! Error types for the graphscribe-ingest crate.

use graphscribe_graph::GraphError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Statement generation failed: {0}")]
    Generation(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// Whether the interactive loop must stop rather than report and continue.
    ///
    /// An unreachable store, bad configuration, or a broken terminal cannot be
    /// fixed by re-entering text. Everything else, including an invalid
    /// generated statement, is reported and the loop moves on.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Graph(GraphError::Connection(_)) | Self::Config(_) | Self::Io(_)
        )
    }
}

impl From<config::ConfigError> for IngestError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
