//! Subtrad - subtitle and text translation
//!
//! Command line entry point: translates single files or whole directories
//! of .srt/.txt documents through a local Ollama model.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use subtrad::cli::{Args, Commands};
use subtrad::config::{Config, Device};
use subtrad::error::SubtradError;
use subtrad::language::{parse_language, LANGUAGES};
use subtrad::workflow::{OutputFormat, Workflow};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    info!("Starting Subtrad");

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Languages => {
            println!("{:<6} {}", "Code", "Language");
            println!("{}", "-".repeat(24));
            for (code, name) in LANGUAGES {
                println!("{:<6} {}", code, name);
            }
        }
        Commands::InitConfig { path } => {
            Config::default().save_to_file(&path)?;
            println!("Wrote default configuration to {}", path.display());
        }
        Commands::Detect { input } => {
            let workflow = Workflow::new(config)?;
            let language = workflow.detect_file_language(&input).await?;
            println!("{}", language);
        }
        Commands::Translate { input, output, source, target, format, device } => {
            let source = parse_language(&source, true)?;
            let target = parse_target(&target)?;
            let format = format.as_deref().map(parse_output_format).transpose()?;

            let device = device.as_deref().map(parse_device).transpose()?;

            let mut workflow = Workflow::new(config)?;
            if let Some(device) = device.filter(|d| *d != workflow.config().backend.device) {
                workflow.set_device(device).await?;
            }
            let report = workflow
                .translate_file(&input, output.as_deref(), source.as_deref(), &target, format)
                .await?;
            workflow.shutdown().await?;

            println!(
                "{} -> {} ({} translated, {} kept after failure)",
                input.display(),
                report.output.display(),
                report.stats.translated,
                report.stats.failed
            );
        }
        Commands::Batch { input_dir, output_dir, source, target, format } => {
            let source = parse_language(&source, true)?;
            let target = parse_target(&target)?;
            let format = format.as_deref().map(parse_output_format).transpose()?;

            let mut workflow = Workflow::new(config)?;
            let summary = workflow
                .process_directory(&input_dir, output_dir.as_deref(), source.as_deref(), &target, format)
                .await?;
            workflow.shutdown().await?;

            println!("{} files translated, {} failed", summary.processed, summary.failed);
        }
    }

    info!("Subtrad completed successfully");
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".subtrad").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Daily rotation
    let file_appender = rolling::daily(&log_dir, "subtrad.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("subtrad.log").display());

    Ok(())
}

/// Target language must be an explicit code
fn parse_target(code: &str) -> Result<String> {
    parse_language(code, false)?
        .ok_or_else(|| SubtradError::Config("A target language is required".to_string()).into())
}

/// Parse output format from string
fn parse_output_format(format: &str) -> Result<OutputFormat> {
    match format.to_lowercase().as_str() {
        "srt" => Ok(OutputFormat::Srt),
        "txt" => Ok(OutputFormat::Txt),
        _ => Err(SubtradError::Config(format!(
            "Invalid output format '{}'. Valid formats: srt, txt",
            format
        )).into()),
    }
}

/// Parse device from string
fn parse_device(device: &str) -> Result<Device> {
    match device.to_lowercase().as_str() {
        "cpu" => Ok(Device::Cpu),
        "gpu" | "cuda" => Ok(Device::Gpu),
        _ => Err(SubtradError::Config(format!(
            "Invalid device '{}'. Valid devices: cpu, gpu",
            device
        )).into()),
    }
}
