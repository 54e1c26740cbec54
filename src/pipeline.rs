use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::compositor::Compositor;
use crate::config::Config;
use crate::errors::SubburnError;
use crate::overlay::OverlayBuilder;
use crate::transcription::{SrtGenerator, WhisperTranscriber};
use crate::video::VideoProcessor;

/// Outcome of a single pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Path of the written .srt file
    pub srt_path: PathBuf,
    /// Path of the burned video, when burning was requested
    pub video_path: Option<PathBuf>,
    /// Number of speech segments transcribed
    pub segment_count: usize,
}

/// End-to-end subtitling pipeline: probe, transcribe, write SRT, burn
pub struct Pipeline {
    config: Config,
    video_processor: VideoProcessor,
    transcriber: WhisperTranscriber,
    overlay_builder: OverlayBuilder,
    compositor: Compositor,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        // Style is resolved once up front so bad colors fail before any work
        let style = config.style.resolve()?;
        let transcriber = WhisperTranscriber::new(&config.transcription);

        Ok(Self {
            config,
            video_processor: VideoProcessor::new(),
            transcriber,
            overlay_builder: OverlayBuilder::new(style.clone()),
            compositor: Compositor::new(style),
        })
    }

    /// Process one video file. Always writes the .srt; burns unless `no_burn`.
    pub async fn run(&self, input: &Path, no_burn: bool) -> Result<PipelineOutcome> {
        if !input.exists() {
            return Err(SubburnError::Input {
                path: input.to_path_buf(),
            }
            .into());
        }
        if !self.video_processor.is_supported(input) {
            warn!("⚠️  {} does not carry a known video extension", input.display());
        }
        if !self.video_processor.validate_video(input).await? {
            return Err(SubburnError::Input {
                path: input.to_path_buf(),
            }
            .into());
        }

        let video_info = self.video_processor.get_video_info(input).await?;

        // Scratch space for the extracted WAV and whisper JSON, removed on drop
        let work_dir = tempfile::tempdir()?;
        let audio_path = self
            .video_processor
            .extract_audio(&video_info, &work_dir.path().join("audio"))
            .await?;

        let mut result = self
            .transcriber
            .transcribe_audio(&audio_path, work_dir.path())
            .await?;

        // Whisper emits segments in order, but downstream assumes it
        result
            .segments
            .sort_by(|a, b| a.start.total_cmp(&b.start));

        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());

        tokio::fs::create_dir_all(&self.config.output.subtitle_dir).await?;
        let srt_path = self
            .config
            .output
            .subtitle_dir
            .join(format!("{}.srt", stem));

        let generator = SrtGenerator::from_segments(&result.segments);
        generator.save_to_file(&srt_path).await?;
        info!("💾 SRT file saved: {} ({} entries)", srt_path.display(), generator.len());

        let video_path = if no_burn {
            info!("⏭️  Skipping burn step");
            None
        } else {
            tokio::fs::create_dir_all(&self.config.output.video_dir).await?;
            let output_path = self
                .config
                .output
                .video_dir
                .join(format!("{}_subtitled.mp4", stem));

            let overlays = self.overlay_builder.build_all(&result.segments);
            self.compositor
                .burn(&video_info, &overlays, &srt_path, &output_path)
                .await?;

            Some(output_path)
        };

        info!(
            "🎉 Finished {}: {} segments ({} model)",
            video_info.filename,
            result.segments.len(),
            result.model_used
        );

        Ok(PipelineOutcome {
            srt_path,
            video_path,
            segment_count: result.segments.len(),
        })
    }
}
