use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// One unit of transcribed speech.
///
/// `start`/`end` are seconds from media start. Producers guarantee
/// `start >= 0`, `end > start` and non-empty text; sequences are consumed in
/// non-decreasing `start` order (the pipeline sorts defensively before
/// handing segments to either consumer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Transcribed text
    pub text: String,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// Format seconds as an SRT timestamp (HH:MM:SS,mmm).
///
/// Milliseconds are truncated, not rounded. Negative input is a caller bug;
/// callers guarantee non-negative values.
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds * 1000.0) as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Parse an SRT timestamp (HH:MM:SS,mmm) back to seconds.
pub fn parse_timestamp(timestamp: &str) -> Result<f64> {
    let time_parts: Vec<&str> = timestamp.trim().split(',').collect();
    if time_parts.len() != 2 {
        return Err(anyhow::anyhow!("invalid timestamp format: {timestamp}"));
    }

    let hms_parts: Vec<&str> = time_parts[0].split(':').collect();
    if hms_parts.len() != 3 {
        return Err(anyhow::anyhow!("invalid time format: {timestamp}"));
    }

    let hours: u64 = hms_parts[0].parse()?;
    let minutes: u64 = hms_parts[1].parse()?;
    let seconds: u64 = hms_parts[2].parse()?;
    let millis: u64 = time_parts[1].parse()?;

    Ok((hours * 3600 + minutes * 60 + seconds) as f64 + millis as f64 / 1000.0)
}

/// A single SRT entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SrtEntry {
    /// Sequential number, 1-based
    pub index: u32,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Subtitle text, stripped of leading/trailing whitespace
    pub text: String,
}

impl SrtEntry {
    /// Create a new SRT entry; text is trimmed, internal whitespace kept
    pub fn new(index: u32, start: f64, end: f64, text: &str) -> Self {
        Self {
            index,
            start,
            end,
            text: text.trim().to_string(),
        }
    }
}

impl fmt::Display for SrtEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(
            f,
            "{} --> {}",
            format_timestamp(self.start),
            format_timestamp(self.end)
        )?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// SRT file generator
#[derive(Debug, Clone, Default)]
pub struct SrtGenerator {
    entries: Vec<SrtEntry>,
}

impl SrtGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build entries from segments, numbering from 1 regardless of gaps or
    /// overlaps in time
    pub fn from_segments(segments: &[Segment]) -> Self {
        let entries = segments
            .iter()
            .enumerate()
            .map(|(i, seg)| SrtEntry::new(i as u32 + 1, seg.start, seg.end, &seg.text))
            .collect();

        Self { entries }
    }

    pub fn add_entry(&mut self, entry: SrtEntry) {
        self.entries.push(entry);
    }

    pub fn get_entries(&self) -> &[SrtEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Generate SRT content as a string; blocks separated by exactly one
    /// blank line, an empty entry list yields an empty string
    pub fn generate(&self) -> String {
        let mut content = String::new();
        for entry in &self.entries {
            content.push_str(&entry.to_string());
        }
        content
    }

    /// Write the SRT file, creating or overwriting the destination.
    /// Returns the destination path on success; I/O failures propagate.
    pub async fn save_to_file<'a>(&self, path: &'a Path) -> Result<&'a Path> {
        tokio::fs::write(path, self.generate()).await?;
        Ok(path)
    }
}

/// Parse SRT content into entries (used for validation and tests)
pub fn parse_srt(content: &str) -> Result<Vec<SrtEntry>> {
    let mut entries = Vec::new();
    let mut lines = content.lines().peekable();

    while lines.peek().is_some() {
        while lines.peek().is_some_and(|l| l.trim().is_empty()) {
            lines.next();
        }

        let seq_line = match lines.next() {
            Some(l) => l,
            None => break,
        };

        let index: u32 = seq_line
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid sequence number: {seq_line}"))?;

        let time_line = lines
            .next()
            .ok_or_else(|| anyhow::anyhow!("missing timestamp line for entry {index}"))?;

        let parts: Vec<&str> = time_line.split("-->").collect();
        if parts.len() != 2 {
            return Err(anyhow::anyhow!("invalid timestamp line: {time_line}"));
        }
        let start = parse_timestamp(parts[0])?;
        let end = parse_timestamp(parts[1])?;

        let mut text_lines = Vec::new();
        while lines.peek().is_some_and(|l| !l.trim().is_empty()) {
            if let Some(line) = lines.next() {
                text_lines.push(line);
            }
        }

        entries.push(SrtEntry::new(index, start, end, &text_lines.join("\n")));
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_formatting() {
        assert_eq!(format_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_timestamp(1.5), "00:00:01,500");
        assert_eq!(format_timestamp(61.0), "00:01:01,000");
        assert_eq!(format_timestamp(3661.0), "01:01:01,000");
    }

    #[test]
    fn test_timestamp_truncates_millis() {
        // 3661.2505 truncates to 250ms, never rounds to 251
        assert_eq!(format_timestamp(3661.2505), "01:01:01,250");
        assert_eq!(format_timestamp(0.9999), "00:00:00,999");
    }

    #[test]
    fn test_timestamp_monotonic() {
        let samples = [0.0, 0.001, 0.5, 1.0, 59.999, 60.0, 3599.9, 3600.0, 86400.0];
        let formatted: Vec<String> = samples.iter().map(|&s| format_timestamp(s)).collect();
        let mut sorted = formatted.clone();
        sorted.sort();
        assert_eq!(formatted, sorted);
    }

    #[test]
    fn test_timestamp_parse_round_trip() {
        for secs in [0.0, 1.25, 59.999, 3661.25] {
            let parsed = parse_timestamp(&format_timestamp(secs)).unwrap();
            assert!((parsed - secs).abs() < 0.001);
        }
    }

    #[test]
    fn test_entry_display_block() {
        let entry = SrtEntry::new(1, 1.2, 3.5, "  First line of speech  ");
        assert_eq!(
            entry.to_string(),
            "1\n00:00:01,200 --> 00:00:03,500\nFirst line of speech\n\n"
        );
    }

    #[test]
    fn test_generator_sequential_indices() {
        let segments = vec![
            Segment::new(0.0, 1.0, "one"),
            Segment::new(5.0, 6.0, "two"),
            Segment::new(5.5, 7.0, "overlapping"),
        ];
        let gen = SrtGenerator::from_segments(&segments);

        let indices: Vec<u32> = gen.get_entries().iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_generate_empty_is_empty() {
        assert_eq!(SrtGenerator::new().generate(), "");
    }

    #[test]
    fn test_generate_idempotent() {
        let segments = vec![
            Segment::new(1.2, 3.5, "First line of speech"),
            Segment::new(3.7, 5.0, "SECOND LINE IN CAPS"),
        ];
        let gen = SrtGenerator::from_segments(&segments);
        assert_eq!(gen.generate(), gen.generate());
    }

    #[test]
    fn test_parse_round_trip() {
        let segments = vec![
            Segment::new(1.2, 3.5, " First line of speech "),
            Segment::new(3.7, 5.0, "SECOND LINE IN CAPS"),
        ];
        let content = SrtGenerator::from_segments(&segments).generate();
        let parsed = parse_srt(&content).unwrap();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].index, 1);
        assert_eq!(parsed[0].text, "First line of speech");
        assert_eq!(parsed[1].index, 2);
        assert_eq!(parsed[1].text, "SECOND LINE IN CAPS");
    }

    #[test]
    fn test_parse_rejects_bad_sequence_line() {
        let content = "not-a-number\n00:00:00,000 --> 00:00:01,000\nhi\n\n";
        assert!(parse_srt(content).is_err());
    }

    #[test]
    fn test_parse_multiline_text() {
        let content = "1\n00:00:00,000 --> 00:00:02,000\nTwo\nlines\n\n";
        let parsed = parse_srt(content).unwrap();
        assert_eq!(parsed[0].text, "Two\nlines");
    }
}
