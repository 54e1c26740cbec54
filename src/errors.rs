use std::path::PathBuf;
use thiserror::Error;

/// Error taxonomy for a render pass.
///
/// Only `RenderBackend` is ever recovered (once, via the fallback subtitle
/// filter); everything else propagates to the top level and terminates the run.
#[derive(Error, Debug)]
pub enum SubburnError {
    /// Missing or unreadable source file, surfaced before any work starts
    #[error("input file missing or unreadable: {path}")]
    Input {
        /// Path that failed the existence or integrity check
        path: PathBuf,
    },

    /// Primary text-layout backend failed; caller falls back once
    #[error("{backend} render backend failed: {message}")]
    RenderBackend {
        /// Backend identifier ("ass" or "subtitles")
        backend: String,
        /// Encoder stderr tail
        message: String,
    },

    /// External encoder failure, fatal and not retried
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// Subtitle file write failure, fatal
    #[error("subtitle I/O error: {0}")]
    Io(#[from] std::io::Error),
}
