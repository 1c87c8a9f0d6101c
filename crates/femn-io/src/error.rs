//! Fatal pipeline errors (§7). Recoverable format issues never appear here —
//! they go into a [`femn_model::Diagnostics`] log instead.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cannot read mesh file {path}: {source}")]
    UnreadableMesh { path: PathBuf, #[source] source: std::io::Error },

    #[error("cannot create output directory {path}: {source}")]
    OutputDir { path: PathBuf, #[source] source: std::io::Error },

    #[error("cannot write collection file {path}: {source}")]
    WriteCollection { path: PathBuf, #[source] source: std::io::Error },

    #[error("JSON config error: {0}")]
    Config(#[from] serde_json::Error),
}
