//! Emotion detection over image files.

use anyhow::{Context, Result};
use clap::Parser;
use emotion_detection::config::{Config, LocatorMode};
use emotion_detection::pipeline::EmotionPipeline;
use emotion_detection::session::EmotionSession;
use log::{error, info};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Image files to analyze, in order
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Emotion model (ONNX), overrides the configuration
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Feed every image this many times
    #[arg(short, long, default_value = "1")]
    repeat: usize,

    /// Use the fixed center crop instead of face detection
    #[arg(long)]
    center_crop: bool,

    /// Print the example configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.print_config {
        print!("{}", emotion_detection::config::EXAMPLE_CONFIG);
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            Config::from_file(path).with_context(|| format!("Failed to load config {}", path.display()))?
        }
        None => Config::default(),
    };
    if let Some(model) = args.model {
        config.model.path = Some(model);
    }
    if args.center_crop {
        config.face_detection.locator = LocatorMode::CenterCrop;
    }
    config.validate().context("Invalid configuration")?;

    let pipeline = EmotionPipeline::from_config(&config)?;
    let session = EmotionSession::from_config(&config.smoothing)?;

    for path in &args.images {
        for _ in 0..args.repeat.max(1) {
            match pipeline.analyze_file(path, &session) {
                Ok(result) => {
                    let confidence = result
                        .confidence
                        .map_or_else(|| "-".to_string(), |c| format!("{c:.2}"));
                    let source = result.source.map_or_else(|| "-".to_string(), |s| s.to_string());
                    println!(
                        "{}\t{}\t{}\t{}\t{}\t{}",
                        path.display(),
                        result.label,
                        result.reason,
                        confidence,
                        source,
                        result.suggestion()
                    );
                }
                Err(e) => {
                    error!("Failed to analyze {}: {e}", path.display());
                    break;
                }
            }
        }
    }

    Ok(())
}
