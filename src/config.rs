use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::overlay::AnchorPosition;

/// Configuration for subburn
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Transcription service settings
    pub transcription: TranscriptionConfig,

    /// Subtitle rendering style
    pub style: StyleConfig,

    /// Output directories
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Whisper model size (tiny, base, small, medium, large)
    pub model: String,

    /// Language hint; None lets the backend auto-detect
    pub language: Option<String>,

    /// Timeout for the transcription child process (seconds)
    pub timeout: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: "base".to_string(),
            language: None,
            timeout: 3600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for generated .srt files
    pub subtitle_dir: PathBuf,

    /// Directory for burned output videos
    pub video_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            subtitle_dir: PathBuf::from("subtitles"),
            video_dir: PathBuf::from("output_videos"),
        }
    }
}

/// Rendering style for the burned-in overlay.
///
/// Every field is optional in the TOML source; omitted fields take the
/// documented defaults. Validation is lenient: unrecognized keys in the
/// `[style]` table are silently ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Font family name
    pub font: String,

    /// Font size in PlayRes units
    pub font_size: u32,

    /// Body text color (named color or #RRGGBB)
    pub text_color: String,

    /// Outline color
    pub stroke_color: String,

    /// Outline width
    pub stroke_width: u32,

    /// Where the text block is anchored on the frame
    pub anchor: AnchorPosition,

    /// Color applied to fully upper-case words
    pub highlight_color: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font: "Arial-Bold".to_string(),
            font_size: 60,
            text_color: "white".to_string(),
            stroke_color: "black".to_string(),
            stroke_width: 2,
            anchor: AnchorPosition::BottomCenter,
            highlight_color: "yellow".to_string(),
        }
    }
}

impl StyleConfig {
    /// Validate once per render pass and produce the fully-populated style.
    /// Pure function of the input; colors become ASS BGR hex.
    pub fn resolve(&self) -> Result<ResolvedStyle> {
        if self.font.trim().is_empty() {
            return Err(anyhow!("style.font must not be empty"));
        }
        if self.font_size == 0 {
            return Err(anyhow!("style.font_size must be greater than 0"));
        }

        Ok(ResolvedStyle {
            font: self.font.clone(),
            font_size: self.font_size,
            text_bgr: color_to_bgr(&self.text_color)?,
            stroke_bgr: color_to_bgr(&self.stroke_color)?,
            highlight_bgr: color_to_bgr(&self.highlight_color)?,
            stroke_width: self.stroke_width,
            alignment: self.anchor.to_ass_alignment(),
        })
    }
}

/// Fully-populated style for one render pass, immutable once resolved.
/// Colors are hex BGR as ASS consumes them.
#[derive(Debug, Clone)]
pub struct ResolvedStyle {
    pub font: String,
    pub font_size: u32,
    pub text_bgr: String,
    pub stroke_bgr: String,
    pub highlight_bgr: String,
    pub stroke_width: u32,
    pub alignment: u8,
}

/// Convert a named color or #RRGGBB hex string to ASS BGR hex digits
fn color_to_bgr(value: &str) -> Result<String> {
    let rgb = match value.trim().to_ascii_lowercase().as_str() {
        "white" => "FFFFFF".to_string(),
        "black" => "000000".to_string(),
        "yellow" => "FFFF00".to_string(),
        "red" => "FF0000".to_string(),
        "green" => "00FF00".to_string(),
        "blue" => "0000FF".to_string(),
        "cyan" => "00FFFF".to_string(),
        "magenta" => "FF00FF".to_string(),
        "orange" => "FFA500".to_string(),
        "gray" | "grey" => "808080".to_string(),
        other => {
            let hex = other.strip_prefix('#').unwrap_or(other);
            if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(anyhow!("unrecognized color: {value}"));
            }
            hex.to_ascii_uppercase()
        }
    };

    // RRGGBB -> BBGGRR
    Ok(format!("{}{}{}", &rgb[4..6], &rgb[2..4], &rgb[0..2]))
}

impl Config {
    /// Load configuration, probing known file locations, then environment
    /// overrides, then built-in defaults
    pub fn load() -> Result<Self> {
        let config_paths = ["subburn.toml", "config/subburn.toml"];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Ok(Self::from_env())
    }

    /// Built-in defaults with environment variable overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(model) = std::env::var("SUBBURN_MODEL") {
            config.transcription.model = model;
        }
        if let Ok(dir) = std::env::var("SUBBURN_SUBTITLE_DIR") {
            config.output.subtitle_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("SUBBURN_VIDEO_DIR") {
            config.output.video_dir = PathBuf::from(dir);
        }

        config
    }

    /// Validate configuration before a render pass
    pub fn validate(&self) -> Result<()> {
        const MODELS: [&str; 5] = ["tiny", "base", "small", "medium", "large"];
        if !MODELS.contains(&self.transcription.model.as_str()) {
            return Err(anyhow!(
                "unknown whisper model '{}' (expected one of {})",
                self.transcription.model,
                MODELS.join(", ")
            ));
        }

        // Style errors surface here rather than mid-render
        self.style.resolve()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style_values() {
        let style = StyleConfig::default();
        assert_eq!(style.font, "Arial-Bold");
        assert_eq!(style.font_size, 60);
        assert_eq!(style.text_color, "white");
        assert_eq!(style.stroke_color, "black");
        assert_eq!(style.stroke_width, 2);
        assert_eq!(style.anchor, AnchorPosition::BottomCenter);
        assert_eq!(style.highlight_color, "yellow");
    }

    #[test]
    fn test_partial_style_fills_defaults() {
        let style: StyleConfig = toml::from_str("font_size = 48").unwrap();
        assert_eq!(style.font_size, 48);
        assert_eq!(style.font, "Arial-Bold");
        assert_eq!(style.highlight_color, "yellow");
    }

    #[test]
    fn test_unknown_style_keys_ignored() {
        let style: StyleConfig =
            toml::from_str("font_size = 48\nglow_radius = 4\n").unwrap();
        assert_eq!(style.font_size, 48);
    }

    #[test]
    fn test_resolve_colors_to_bgr() {
        let resolved = StyleConfig::default().resolve().unwrap();
        assert_eq!(resolved.text_bgr, "FFFFFF");
        assert_eq!(resolved.stroke_bgr, "000000");
        assert_eq!(resolved.highlight_bgr, "00FFFF"); // yellow, BGR order
        assert_eq!(resolved.alignment, 2);
    }

    #[test]
    fn test_resolve_hex_color() {
        let style = StyleConfig {
            text_color: "#FFA500".to_string(),
            ..Default::default()
        };
        assert_eq!(style.resolve().unwrap().text_bgr, "00A5FF");
    }

    #[test]
    fn test_resolve_rejects_bad_input() {
        let bad_color = StyleConfig {
            text_color: "not-a-color".to_string(),
            ..Default::default()
        };
        assert!(bad_color.resolve().is_err());

        let zero_size = StyleConfig {
            font_size: 0,
            ..Default::default()
        };
        assert!(zero_size.resolve().is_err());
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.transcription.model = "gigantic".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_anchor_from_toml() {
        let style: StyleConfig = toml::from_str(r#"anchor = "top-center""#).unwrap();
        assert_eq!(style.anchor, AnchorPosition::TopCenter);
    }
}
