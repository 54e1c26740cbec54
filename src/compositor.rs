use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::ResolvedStyle;
use crate::errors::SubburnError;
use crate::overlay::Overlay;
use crate::video::VideoInfo;

/// Default canvas when ffprobe could not report the frame size
const FALLBACK_PLAY_RES: (u32, u32) = (1920, 1080);

/// Burns styled overlays into a video via ffmpeg
pub struct Compositor {
    style: ResolvedStyle,
}

impl Compositor {
    pub fn new(style: ResolvedStyle) -> Self {
        Self { style }
    }

    /// Render overlays into a new video file.
    ///
    /// An empty overlay list still produces the output file, as a stream
    /// copy of the input. Otherwise the ASS filter is tried first; if
    /// ffmpeg rejects it, one fallback pass renders the plain .srt with
    /// `force_style` before the whole operation is reported as failed.
    pub async fn burn(
        &self,
        video_info: &VideoInfo,
        overlays: &[Overlay],
        srt_path: &Path,
        output_path: &Path,
    ) -> Result<(), SubburnError> {
        if overlays.is_empty() {
            info!("📋 No overlays to render, copying streams");
            return self.copy_streams(video_info, output_path).await;
        }

        // ASS content lives in a temp file only for the duration of the burn
        let ass_content = self.generate_ass(overlays, video_info);
        let ass_file = tempfile::Builder::new()
            .prefix("subburn_")
            .suffix(".ass")
            .tempfile()
            .map_err(SubburnError::Io)?;
        tokio::fs::write(ass_file.path(), &ass_content)
            .await
            .map_err(SubburnError::Io)?;

        match self.run_ass_pass(video_info, ass_file.path(), output_path).await {
            Ok(()) => {
                info!("🎬 Burned {} overlays into {}", overlays.len(), output_path.display());
                Ok(())
            }
            Err(e) => {
                warn!("{}", e);
                warn!("🔁 Falling back to plain subtitles filter");
                self.run_subtitles_pass(video_info, srt_path, output_path)
                    .await
                    .map_err(|fallback| {
                        SubburnError::Encoding(format!(
                            "both render backends failed for {}: {}",
                            video_info.filename, fallback
                        ))
                    })
            }
        }
    }

    /// Generate the complete ASS document for one render pass
    pub fn generate_ass(&self, overlays: &[Overlay], video_info: &VideoInfo) -> String {
        let (play_res_x, play_res_y) = if video_info.width > 0 && video_info.height > 0 {
            (video_info.width, video_info.height)
        } else {
            FALLBACK_PLAY_RES
        };

        let mut doc = String::new();

        let _ = writeln!(doc, "[Script Info]");
        let _ = writeln!(doc, "Title: {}", video_info.filename);
        let _ = writeln!(doc, "ScriptType: v4.00+");
        let _ = writeln!(doc, "PlayResX: {}", play_res_x);
        let _ = writeln!(doc, "PlayResY: {}", play_res_y);
        let _ = writeln!(doc, "ScaledBorderAndShadow: yes");
        let _ = writeln!(doc);

        let _ = writeln!(doc, "[V4+ Styles]");
        let _ = writeln!(
            doc,
            "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
             OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, \
             ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, \
             MarginL, MarginR, MarginV, Encoding"
        );
        let _ = writeln!(
            doc,
            "Style: Default,{},{},&H00{},&H000000FF,&H00{},&H80000000,0,0,0,0,100,100,0,0,1,{},0,{},20,20,40,1",
            self.style.font,
            self.style.font_size,
            self.style.text_bgr,
            self.style.stroke_bgr,
            self.style.stroke_width,
            self.style.alignment,
        );
        let _ = writeln!(doc);

        let _ = writeln!(doc, "[Events]");
        let _ = writeln!(
            doc,
            "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text"
        );

        for overlay in overlays {
            let fade = format!(
                "{{\\fad({},{})}}",
                (overlay.fade_in * 1000.0) as u64,
                (overlay.fade_out * 1000.0) as u64,
            );
            let _ = writeln!(
                doc,
                "Dialogue: 0,{},{},Default,,0,0,0,,{}{}",
                format_ass_time(overlay.visible_from),
                format_ass_time(overlay.visible_until),
                fade,
                overlay.styled_text,
            );
        }

        doc
    }

    /// Primary pass: ASS filter with full styling
    async fn run_ass_pass(
        &self,
        video_info: &VideoInfo,
        ass_path: &Path,
        output_path: &Path,
    ) -> Result<(), SubburnError> {
        let filter = format!("ass={}", escape_filter_path(ass_path));
        self.run_ffmpeg(video_info, &filter, output_path)
            .await
            .map_err(|message| SubburnError::RenderBackend {
                backend: "ass".to_string(),
                message,
            })
    }

    /// Fallback pass: plain subtitles filter with force_style approximation
    async fn run_subtitles_pass(
        &self,
        video_info: &VideoInfo,
        srt_path: &Path,
        output_path: &Path,
    ) -> Result<(), SubburnError> {
        let force_style = format!(
            "FontName={},FontSize={},PrimaryColour=&H00{},OutlineColour=&H00{},Outline={},Alignment={}",
            self.style.font,
            self.style.font_size,
            self.style.text_bgr,
            self.style.stroke_bgr,
            self.style.stroke_width,
            self.style.alignment,
        );
        let filter = format!(
            "subtitles={}:force_style='{}'",
            escape_filter_path(srt_path),
            force_style,
        );
        self.run_ffmpeg(video_info, &filter, output_path)
            .await
            .map_err(|message| SubburnError::RenderBackend {
                backend: "subtitles".to_string(),
                message,
            })
    }

    async fn run_ffmpeg(
        &self,
        video_info: &VideoInfo,
        filter: &str,
        output_path: &Path,
    ) -> Result<(), String> {
        debug!("ffmpeg filter: {}", filter);

        let output = Command::new("ffmpeg")
            .args(["-hide_banner", "-loglevel", "error"])
            .arg("-i")
            .arg(&video_info.path)
            .args(["-vf", filter])
            .args(["-c:v", "libx264", "-c:a", "copy", "-y"])
            .arg(output_path)
            .output()
            .await
            .map_err(|e| format!("failed to run ffmpeg: {}", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            ));
        }

        Ok(())
    }

    /// No overlays: remux input to output untouched
    async fn copy_streams(
        &self,
        video_info: &VideoInfo,
        output_path: &Path,
    ) -> Result<(), SubburnError> {
        let output = Command::new("ffmpeg")
            .args(["-hide_banner", "-loglevel", "error"])
            .arg("-i")
            .arg(&video_info.path)
            .args(["-c", "copy", "-y"])
            .arg(output_path)
            .output()
            .await
            .map_err(SubburnError::Io)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubburnError::Encoding(format!(
                "stream copy failed: {}",
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// Format seconds as an ASS timestamp (H:MM:SS.cc), truncating to centiseconds
fn format_ass_time(seconds: f64) -> String {
    let total_cs = (seconds.max(0.0) * 100.0) as u64;
    let hours = total_cs / 360_000;
    let minutes = (total_cs % 360_000) / 6_000;
    let secs = (total_cs % 6_000) / 100;
    let centis = total_cs % 100;
    format!("{}:{:02}:{:02}.{:02}", hours, minutes, secs, centis)
}

/// Escape a path for use inside an ffmpeg filter argument
fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "\\\\")
        .replace(':', "\\:")
}
