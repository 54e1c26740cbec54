use serde::{Deserialize, Serialize};

use crate::config::ResolvedStyle;
use crate::transcription::srt::Segment;

/// Opacity ease-in applied at the start of each overlay, seconds
pub const FADE_IN_SECS: f64 = 0.15;
/// Opacity ease-out applied at the end of each overlay, seconds
pub const FADE_OUT_SECS: f64 = 0.15;
/// Minimum visible window; zero/negative-duration segments are clamped to
/// this so the fade envelope always fits
pub const MIN_VISIBLE_SECS: f64 = FADE_IN_SECS + FADE_OUT_SECS;

/// Anchor position for overlay text on the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorPosition {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    /// Standard subtitle position
    #[default]
    BottomCenter,
    BottomRight,
}

impl AnchorPosition {
    /// Convert to ASS alignment value (1-9, numpad style)
    pub fn to_ass_alignment(self) -> u8 {
        match self {
            Self::BottomLeft => 1,
            Self::BottomCenter => 2,
            Self::BottomRight => 3,
            Self::MiddleLeft => 4,
            Self::MiddleCenter => 5,
            Self::MiddleRight => 6,
            Self::TopLeft => 7,
            Self::TopCenter => 8,
            Self::TopRight => 9,
        }
    }
}

/// A renderable, time-bounded, styled text object derived from one segment.
///
/// Owned by the compositor for a single render pass and discarded after.
#[derive(Debug, Clone)]
pub struct Overlay {
    /// Markup-annotated text (ASS override tags around highlighted words)
    pub styled_text: String,
    /// ASS alignment derived from the anchor position
    pub alignment: u8,
    /// Seconds from media start at which the overlay appears
    pub visible_from: f64,
    /// Seconds from media start at which the overlay disappears
    pub visible_until: f64,
    /// Ease-in duration, seconds
    pub fade_in: f64,
    /// Ease-out duration, seconds
    pub fade_out: f64,
}

/// Converts segments into positioned, time-bounded, fade-wrapped overlays,
/// applying the word-level highlight rule from the resolved style.
#[derive(Debug, Clone)]
pub struct OverlayBuilder {
    style: ResolvedStyle,
}

impl OverlayBuilder {
    pub fn new(style: ResolvedStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &ResolvedStyle {
        &self.style
    }

    /// Build one overlay from one segment.
    ///
    /// Words that are fully upper-case and contain at least one alphabetic
    /// character get the highlight color; punctuation-only tokens are never
    /// highlighted. Words are rejoined with single spaces.
    pub fn build(&self, segment: &Segment) -> Overlay {
        let styled_text = self.style_words(&segment.text);

        let visible_from = segment.start;
        let mut visible_until = segment.end;
        if visible_until <= visible_from + MIN_VISIBLE_SECS {
            visible_until = visible_from + MIN_VISIBLE_SECS;
        }

        Overlay {
            styled_text,
            alignment: self.style.alignment,
            visible_from,
            visible_until,
            fade_in: FADE_IN_SECS,
            fade_out: FADE_OUT_SECS,
        }
    }

    /// Build overlays for a whole segment list, preserving input order
    /// (later overlays stack on top when time ranges overlap)
    pub fn build_all(&self, segments: &[Segment]) -> Vec<Overlay> {
        segments.iter().map(|s| self.build(s)).collect()
    }

    fn style_words(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|word| {
                let escaped = escape_ass_text(word);
                if is_highlight_word(word) {
                    format!("{{\\c&H{}&}}{escaped}{{\\c}}", self.style.highlight_bgr)
                } else {
                    escaped
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A word is highlighted iff it has at least one alphabetic character and no
/// lowercase character. The alphabetic guard keeps punctuation-only tokens
/// ("!", "...") from being marked.
fn is_highlight_word(word: &str) -> bool {
    let mut has_alpha = false;
    for c in word.chars() {
        if c.is_alphabetic() {
            if c.is_lowercase() {
                return false;
            }
            has_alpha = true;
        }
    }
    has_alpha
}

/// Escape characters that would be parsed as ASS override syntax
fn escape_ass_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('{', "\\{")
        .replace('}', "\\}")
}
