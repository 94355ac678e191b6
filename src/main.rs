use anyhow::Context;
use clap::Parser;
use imgmark::config::ProcessingConfig;
use imgmark::logging::{init_subscriber, LogFormat};
use imgmark::pipeline::{FileRecord, ImagePipeline};
use std::path::{Path, PathBuf};

/// imgmark - watermark and transcode uploaded images in place
#[derive(Parser, Debug)]
#[command(name = "imgmark")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults are used when it does not exist)
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Log output format: json or pretty
    #[arg(long, default_value = "json")]
    log_format: LogFormat,

    /// Validate the configuration and exit
    #[arg(long)]
    test: bool,

    /// Image files to process
    #[arg(required_unless_present = "test")]
    files: Vec<PathBuf>,
}

fn load_config(path: &Path) -> anyhow::Result<ProcessingConfig> {
    if !path.exists() {
        tracing::info!(config_file = %path.display(), "Config file not found, using defaults");
        return Ok(ProcessingConfig::default());
    }
    let config = ProcessingConfig::from_file(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_subscriber(args.log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging subsystem: {}", e))?;

    let config = load_config(&args.config)?;

    tracing::info!(
        config_file = %args.config.display(),
        watermark_enabled = config.watermark_enable,
        webp_enabled = config.webp_enable,
        min_width = config.min_width,
        min_height = config.min_height,
        "Configuration loaded successfully"
    );

    if args.test {
        return Ok(());
    }

    let pipeline = ImagePipeline::from_config(&config);
    let mut failures = 0usize;

    for file in &args.files {
        let info = match FileRecord::for_path(file, config.document_root.as_deref()) {
            Ok(info) => info,
            Err(e) => {
                tracing::error!(path = %file.display(), error = %e, "Cannot read file");
                failures += 1;
                continue;
            }
        };

        let result = match pipeline.process(file, &config, &info) {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(path = %file.display(), error = %e, "Image processing failed");
                failures += 1;
                continue;
            }
        };

        let line = serde_json::json!({
            "file": file.display().to_string(),
            "result": result,
        });
        println!("{}", line);
    }

    if failures > 0 {
        anyhow::bail!("{} of {} files failed", failures, args.files.len());
    }
    Ok(())
}
