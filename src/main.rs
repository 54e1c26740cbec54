use anyhow::Result;
use clap::parser::ValueSource;
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;
use tracing::{error, info, warn};

use subburn::config::Config;
use subburn::pipeline::Pipeline;

fn build_cli() -> Command {
    Command::new("subburn")
        .version("0.1.0")
        .about("Transcribe video audio with Whisper and burn styled subtitles")
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("PATH")
                .help("Video file to subtitle")
                .required(true)
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .help("Whisper model size")
                .value_parser(["tiny", "base", "small", "medium", "large"])
                .default_value("base")
        )
        .arg(
            Arg::new("no-burn")
                .long("no-burn")
                .help("Only generate the .srt file, skip video rendering")
                .action(clap::ArgAction::SetTrue)
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue)
        )
}

/// An explicit --model wins over the config file; the clap default does not,
/// so a configured model survives a bare invocation
fn apply_model_override(matches: &ArgMatches, config: &mut Config) {
    if matches.value_source("model") == Some(ValueSource::CommandLine) {
        if let Some(model) = matches.get_one::<String>("model") {
            config.transcription.model = model.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let verbose = matches.get_flag("verbose");

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(if verbose {
            "subburn=debug,info"
        } else {
            "subburn=info,warn"
        })
        .init();

    let input = PathBuf::from(matches.get_one::<String>("file").ok_or_else(|| {
        anyhow::anyhow!("missing --file argument")
    })?);
    let no_burn = matches.get_flag("no-burn");

    // Load configuration
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });
    apply_model_override(&matches, &mut config);

    info!("🚀 subburn starting...");
    info!("📁 Input file: {}", input.display());
    info!("⚙️  Model: {}", config.transcription.model);

    if !input.exists() {
        error!("Input file does not exist: {}", input.display());
        return Err(anyhow::anyhow!("Input file not found"));
    }

    // Create output directories
    tokio::fs::create_dir_all(&config.output.subtitle_dir).await?;
    tokio::fs::create_dir_all(&config.output.video_dir).await?;

    let pipeline = Pipeline::new(config)?;

    let start_time = std::time::Instant::now();
    let outcome = pipeline.run(&input, no_burn).await?;
    let duration = start_time.elapsed();

    info!("🎉 Processing completed in {:.2}s", duration.as_secs_f64());
    info!("📝 Subtitles: {}", outcome.srt_path.display());
    if let Some(video_path) = &outcome.video_path {
        info!("🎬 Video: {}", video_path.display());
    }
    info!("📊 Segments: {}", outcome.segment_count);

    Ok(())
}
