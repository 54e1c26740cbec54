//! subburn - automatic video subtitling
//!
//! Transcribes video audio with an external Whisper backend, writes SubRip
//! subtitle files, and burns styled text overlays into the video via ffmpeg.

pub mod compositor;
pub mod config;
pub mod errors;
pub mod overlay;
pub mod pipeline;
pub mod transcription;
pub mod video;

// Re-export main types for easy access
pub use crate::compositor::Compositor;
pub use crate::config::{Config, StyleConfig};
pub use crate::errors::SubburnError;
pub use crate::overlay::{AnchorPosition, Overlay, OverlayBuilder};
pub use crate::pipeline::{Pipeline, PipelineOutcome};
pub use crate::transcription::{Segment, SrtGenerator, TranscriptionResult, WhisperTranscriber};
pub use crate::video::{VideoInfo, VideoProcessor};
