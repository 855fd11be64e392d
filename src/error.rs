//! Error types for the parameter store and the diagram renderer

use std::path::PathBuf;
use thiserror::Error;

/// Failures reading or checking lattice parameters and settings
#[derive(Debug, Error)]
pub enum LatticeError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Key '{key}' missing from {path:?}")]
    MissingKey { key: &'static str, path: PathBuf },

    #[error("Cell angles sum to {sum} deg but theta_c is {theta_c} deg")]
    AngleSum { sum: f64, theta_c: f64 },
}

/// Failures producing or writing the cell diagram
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Output directory {0:?} does not exist")]
    MissingOutputDir(PathBuf),

    #[error("{0} output is not available in this build")]
    FormatUnavailable(&'static str),

    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Drawing failed: {0}")]
    Backend(String),

    #[error("Report template error: {0}")]
    Template(#[from] minijinja::Error),
}

pub type Result<T, E = LatticeError> = std::result::Result<T, E>;
