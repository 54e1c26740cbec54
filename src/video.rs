use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Video information extracted from file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    pub path: PathBuf,
    pub filename: String,
    pub duration: Duration,
    pub width: u32,
    pub height: u32,
    pub file_size: u64,
}

/// Video probing and audio extraction via FFmpeg
#[derive(Clone)]
pub struct VideoProcessor {
    /// Supported video extensions
    supported_extensions: Vec<String>,
}

impl VideoProcessor {
    pub fn new() -> Self {
        Self {
            supported_extensions: vec![
                "mp4".to_string(),
                "mkv".to_string(),
                "avi".to_string(),
                "mov".to_string(),
                "webm".to_string(),
                "m4v".to_string(),
            ],
        }
    }

    /// Check whether a path carries a video extension we handle
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.supported_extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }

    /// Extract video information using ffprobe
    pub async fn get_video_info(&self, video_path: &Path) -> Result<VideoInfo> {
        let output = tokio::process::Command::new("ffprobe")
            .args([
                "-v", "quiet",
                "-print_format", "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(video_path)
            .output()
            .await?;

        if !output.status.success() {
            return Err(anyhow!("ffprobe failed for {}", video_path.display()));
        }

        let json_str = String::from_utf8(output.stdout)?;
        let ffprobe_data: serde_json::Value = serde_json::from_str(&json_str)?;

        let format = &ffprobe_data["format"];
        let streams = ffprobe_data["streams"]
            .as_array()
            .ok_or_else(|| anyhow!("ffprobe returned no streams"))?;

        let video_stream = streams
            .iter()
            .find(|s| s["codec_type"] == "video")
            .ok_or_else(|| anyhow!("No video stream found"))?;

        let duration_seconds: f64 = format["duration"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0);

        let file_size = tokio::fs::metadata(video_path).await?.len();

        let video_info = VideoInfo {
            path: video_path.to_path_buf(),
            filename: video_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            duration: Duration::from_secs_f64(duration_seconds),
            width: video_stream["width"].as_u64().unwrap_or(0) as u32,
            height: video_stream["height"].as_u64().unwrap_or(0) as u32,
            file_size,
        };

        info!(
            "📹 Analyzed video: {} ({}x{}, {:.1}s)",
            video_info.filename,
            video_info.width,
            video_info.height,
            video_info.duration.as_secs_f64()
        );

        Ok(video_info)
    }

    /// Extract mono 16kHz WAV audio for transcription
    pub async fn extract_audio(&self, video_info: &VideoInfo, output_path: &Path) -> Result<PathBuf> {
        let audio_path = output_path.with_extension("wav");

        info!("🎵 Extracting audio from {}", video_info.filename);

        let status = tokio::process::Command::new("ffmpeg")
            .arg("-i")
            .arg(&video_info.path)
            .args([
                "-vn", // No video
                "-acodec", "pcm_s16le", // 16-bit PCM
                "-ar", "16000", // 16kHz sample rate (optimal for Whisper)
                "-ac", "1", // Mono
                "-y", // Overwrite output file
            ])
            .arg(&audio_path)
            .status()
            .await?;

        if !status.success() {
            return Err(anyhow!("Audio extraction failed for {}", video_info.filename));
        }

        info!("✅ Audio extracted: {}", audio_path.display());
        Ok(audio_path)
    }

    /// Validate video file integrity
    pub async fn validate_video(&self, video_path: &Path) -> Result<bool> {
        let output = tokio::process::Command::new("ffprobe")
            .args([
                "-v", "error",
                "-select_streams", "v:0",
                "-show_entries", "stream=codec_name",
                "-of", "csv=p=0",
            ])
            .arg(video_path)
            .output()
            .await?;

        Ok(output.status.success())
    }
}

impl Default for VideoProcessor {
    fn default() -> Self {
        Self::new()
    }
}
