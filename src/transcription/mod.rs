pub mod srt;
pub mod whisper;

pub use srt::{Segment, SrtEntry, SrtGenerator};
pub use whisper::{TranscriptionResult, WhisperTranscriber};
