use std::path::Path;

use subburn::compositor::Compositor;
use subburn::config::{Config, StyleConfig};
use subburn::overlay::OverlayBuilder;
use subburn::transcription::srt::{parse_srt, Segment, SrtGenerator};
use subburn::video::VideoInfo;
use tempfile::TempDir;

fn sample_segments() -> Vec<Segment> {
    vec![
        Segment::new(0.0, 2.4, "The quick brown fox"),
        Segment::new(2.4, 5.1, "jumps over the LAZY dog"),
        Segment::new(5.1, 9.75, "and keeps on running"),
    ]
}

#[tokio::test]
async fn srt_file_survives_write_and_parse() {
    let dir = TempDir::new().unwrap();
    let srt_path = dir.path().join("clip.srt");

    let generator = SrtGenerator::from_segments(&sample_segments());
    generator.save_to_file(&srt_path).await.unwrap();

    let content = tokio::fs::read_to_string(&srt_path).await.unwrap();
    let parsed = parse_srt(&content).unwrap();

    assert_eq!(parsed.len(), 3);
    assert_eq!(parsed[0].index, 1);
    assert_eq!(parsed[1].text, "jumps over the LAZY dog");
    assert!((parsed[2].end - 9.75).abs() < 0.001);
}

#[tokio::test]
async fn srt_rewrite_is_byte_identical() {
    let dir = TempDir::new().unwrap();

    let generator = SrtGenerator::from_segments(&sample_segments());

    let first_path = dir.path().join("first.srt");
    generator.save_to_file(&first_path).await.unwrap();
    let first = tokio::fs::read(&first_path).await.unwrap();

    // Regenerating from the parsed file must not drift
    let parsed = parse_srt(std::str::from_utf8(&first).unwrap()).unwrap();
    let reparsed_segments: Vec<Segment> = parsed
        .iter()
        .map(|e| Segment::new(e.start, e.end, e.text.as_str()))
        .collect();

    let second_path = dir.path().join("second.srt");
    SrtGenerator::from_segments(&reparsed_segments)
        .save_to_file(&second_path)
        .await
        .unwrap();
    let second = tokio::fs::read(&second_path).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn empty_transcription_writes_empty_srt() {
    let dir = TempDir::new().unwrap();
    let srt_path = dir.path().join("silent.srt");

    let generator = SrtGenerator::from_segments(&[]);
    generator.save_to_file(&srt_path).await.unwrap();

    let content = tokio::fs::read_to_string(&srt_path).await.unwrap();
    assert!(content.is_empty());
    assert!(parse_srt(&content).unwrap().is_empty());
}

#[test]
fn style_config_tolerates_unknown_keys() {
    let toml_src = r#"
        [transcription]
        model = "small"

        [style]
        font_size = 72
        highlight_color = "orange"
        drop_shadow = true
    "#;

    let config: Config = toml::from_str(toml_src).unwrap();
    assert_eq!(config.transcription.model, "small");
    assert_eq!(config.style.font_size, 72);
    // Omitted keys fall back to defaults
    assert_eq!(config.style.font, "Arial-Bold");
    assert!(config.validate().is_ok());
}

#[test]
fn ass_document_renders_overlapping_speech() {
    let style = StyleConfig::default().resolve().unwrap();
    let builder = OverlayBuilder::new(style.clone());
    let compositor = Compositor::new(style);

    let segments = vec![
        Segment::new(10.0, 14.0, "speaker one talks"),
        Segment::new(12.0, 16.0, "speaker TWO interrupts"),
    ];
    let overlays = builder.build_all(&segments);

    let video_info = VideoInfo {
        path: Path::new("meeting.mp4").to_path_buf(),
        filename: "meeting.mp4".to_string(),
        duration: std::time::Duration::from_secs(30),
        width: 1920,
        height: 1080,
        file_size: 4096,
    };

    let doc = compositor.generate_ass(&overlays, &video_info);

    // Both events present, with the uppercase word carrying a color override
    let dialogues: Vec<&str> = doc.lines().filter(|l| l.starts_with("Dialogue:")).collect();
    assert_eq!(dialogues.len(), 2);
    assert!(dialogues[0].contains("0:00:10.00,0:00:14.00"));
    assert!(dialogues[1].contains("0:00:12.00,0:00:16.00"));
    assert!(dialogues[1].contains("{\\c&H00FFFF&}TWO{\\c}"));
}

#[test]
fn short_segments_get_minimum_display_window() {
    let style = StyleConfig::default().resolve().unwrap();
    let builder = OverlayBuilder::new(style);

    let overlays = builder.build_all(&[Segment::new(5.0, 5.0, "blip")]);

    assert_eq!(overlays.len(), 1);
    assert!(overlays[0].visible_until > overlays[0].visible_from);
    assert!((overlays[0].visible_until - overlays[0].visible_from - 0.3).abs() < 1e-9);
}
