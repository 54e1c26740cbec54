use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use super::srt::{parse_timestamp, Segment};
use crate::config::TranscriptionConfig;

/// Complete transcription result
#[derive(Debug, Clone)]
pub struct TranscriptionResult {
    /// Individual segments with timestamps
    pub segments: Vec<Segment>,
    /// Detected language
    pub language: Option<String>,
    /// Model used for transcription
    pub model_used: String,
    /// Processing duration
    pub processing_time: Duration,
}

/// Whisper transcriber driving an external whisper binary
#[derive(Debug, Clone)]
pub struct WhisperTranscriber {
    /// Whisper model name
    model: String,
    /// Language hint; None lets whisper auto-detect
    language: Option<String>,
    /// Child process timeout
    timeout: Duration,
}

impl WhisperTranscriber {
    pub fn new(config: &TranscriptionConfig) -> Self {
        Self {
            model: config.model.clone(),
            language: config.language.clone(),
            timeout: Duration::from_secs(config.timeout),
        }
    }

    /// Override the configured model
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Transcribe an audio file, writing intermediate output into `work_dir`
    pub async fn transcribe_audio(
        &self,
        audio_path: &Path,
        work_dir: &Path,
    ) -> Result<TranscriptionResult> {
        let start_time = std::time::Instant::now();

        info!("🎤 Starting Whisper transcription for: {}", audio_path.display());
        info!("⚙️  Model: {}", self.model);

        let whisper_output = self.run_whisper_command(audio_path, work_dir).await?;

        let (segments, language) = self.collect_segments(whisper_output)?;

        info!(
            "🎉 Transcription completed in {:.1}s: {} segments",
            start_time.elapsed().as_secs_f64(),
            segments.len()
        );

        Ok(TranscriptionResult {
            segments,
            language,
            model_used: self.model.clone(),
            processing_time: start_time.elapsed(),
        })
    }

    /// Run the whisper command-line tool with automatic backend detection
    async fn run_whisper_command(
        &self,
        audio_path: &Path,
        work_dir: &Path,
    ) -> Result<WhisperOutput> {
        // Implementations in order of preference
        let backends = [
            ("whisper-cli", true), // whisper.cpp via Homebrew
            ("whisper-cpp", true), // whisper.cpp
            ("whisper", false),    // Python OpenAI Whisper
        ];

        for (cmd_name, is_cpp) in &backends {
            if Self::check_command_available(cmd_name).await {
                debug!("Using {} backend", cmd_name);
                return if *is_cpp {
                    self.run_whisper_cpp_command(cmd_name, audio_path, work_dir).await
                } else {
                    self.run_python_whisper_command(audio_path, work_dir).await
                };
            }
        }

        error!("❌ No Whisper backend found");
        Err(anyhow!(
            "No Whisper backend found. Please install whisper.cpp or openai-whisper"
        ))
    }

    /// Run whisper.cpp
    async fn run_whisper_cpp_command(
        &self,
        cmd_name: &str,
        audio_path: &Path,
        work_dir: &Path,
    ) -> Result<WhisperOutput> {
        let base_name = audio_path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let output_file = work_dir.join(&base_name);

        let mut cmd = Command::new(cmd_name);
        cmd.arg("-f").arg(audio_path)
            .arg("-oj") // JSON output
            .arg("-of").arg(&output_file)
            .arg("-m").arg(format!("models/ggml-{}.bin", self.model));

        if let Some(language) = &self.language {
            cmd.arg("-l").arg(language);
        }

        info!("🚀 Running {}: {} model on {}", cmd_name, self.model, audio_path.display());

        self.execute_command(cmd, cmd_name).await?;
        self.read_json_output(work_dir, cmd_name).await
    }

    /// Run Python OpenAI Whisper
    async fn run_python_whisper_command(
        &self,
        audio_path: &Path,
        work_dir: &Path,
    ) -> Result<WhisperOutput> {
        let mut cmd = Command::new("whisper");
        cmd.arg(audio_path)
            .arg("--model").arg(&self.model)
            .arg("--output_dir").arg(work_dir)
            .arg("--output_format").arg("json")
            .arg("--verbose").arg("False")
            .arg("--fp16").arg("False")
            .arg("--temperature").arg("0.0");

        if let Some(language) = &self.language {
            cmd.arg("--language").arg(language);
        }

        info!("🚀 Running Python Whisper: {} model on {}", self.model, audio_path.display());

        self.execute_command(cmd, "whisper").await?;
        self.read_json_output(work_dir, "whisper").await
    }

    /// Execute the child process, enforcing the configured timeout
    async fn execute_command(&self, mut cmd: Command, backend_name: &str) -> Result<()> {
        debug!("Executing command: {:?}", cmd);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(result) => result
                .map_err(|e| anyhow!("Failed to run {} command: {}", backend_name, e))?,
            Err(_) => {
                error!(
                    "⏰ {} command timed out after {}s",
                    backend_name,
                    self.timeout.as_secs()
                );
                return Err(anyhow!(
                    "{} command timed out after {} seconds",
                    backend_name,
                    self.timeout.as_secs()
                ));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("❌ {} command failed: {}", backend_name, output.status);
            debug!("{} stderr: {}", backend_name, stderr);
            return Err(anyhow!(
                "{} transcription failed with exit code: {}",
                backend_name,
                output.status
            ));
        }

        Ok(())
    }

    /// Locate and parse the JSON file the backend wrote into `work_dir`
    async fn read_json_output(&self, work_dir: &Path, backend_name: &str) -> Result<WhisperOutput> {
        let json_files = self.find_output_files(work_dir, "json").await?;

        let json_path = json_files
            .first()
            .ok_or_else(|| anyhow!("No {} JSON output found in {}", backend_name, work_dir.display()))?;

        let json_content = tokio::fs::read_to_string(json_path).await?;

        serde_json::from_str::<WhisperOutput>(&json_content)
            .map_err(|e| anyhow!("Failed to parse {} JSON output: {}", backend_name, e))
    }

    /// Normalize either JSON shape into ordered segments
    fn collect_segments(&self, output: WhisperOutput) -> Result<(Vec<Segment>, Option<String>)> {
        let segments: Vec<Segment> = if !output.transcription.is_empty() {
            // whisper.cpp format: timestamps as "HH:MM:SS,mmm" strings
            output
                .transcription
                .into_iter()
                .filter(|seg| !seg.text.trim().is_empty())
                .map(|seg| {
                    let start = parse_timestamp(&seg.timestamps.from).unwrap_or(0.0);
                    let end = parse_timestamp(&seg.timestamps.to).unwrap_or(0.0);
                    Segment::new(start, end, seg.text.trim())
                })
                .collect()
        } else {
            // OpenAI format: segments with float offsets
            output
                .segments
                .into_iter()
                .filter(|seg| !seg.text.trim().is_empty())
                .map(|seg| Segment::new(seg.start, seg.end, seg.text.trim()))
                .collect()
        };

        if segments.is_empty() {
            warn!("⚠️  Transcription produced no speech segments");
        }

        Ok((segments, output.language))
    }

    /// Check if a command is available
    async fn check_command_available(cmd_name: &str) -> bool {
        Command::new(cmd_name)
            .arg("--help")
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    async fn find_output_files(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == extension) {
                files.push(path);
            }
        }

        Ok(files)
    }
}

/// Whisper JSON output, covering both whisper.cpp and OpenAI shapes
#[derive(Debug, Clone, Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    segments: Vec<WhisperSegment>,
    #[serde(default)]
    transcription: Vec<WhisperTranscriptionSegment>,
}

#[derive(Debug, Clone, Deserialize)]
struct WhisperTranscriptionSegment {
    timestamps: WhisperTimestamps,
    text: String,
}

#[derive(Debug, Clone, Deserialize)]
struct WhisperTimestamps {
    from: String,
    to: String,
}

#[derive(Debug, Clone, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
}
