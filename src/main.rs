mod cli;

use vidshrink::{config, ConsoleFrontend, Orchestrator};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use vs_av::{EncodeSettings, FfmpegEngine, ToolRegistry};
use vs_core::events::EventBus;

/// Event buffer for the console renderer. A job publishes a handful of
/// status events plus one progress sample per ffmpeg report; the renderer
/// only falls behind by this much if the terminal blocks.
const BUS_CAPACITY: usize = 4096;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "vidshrink=debug,vs_av=debug,vs_core=debug".to_string()
        } else {
            "vidshrink=warn,vs_av=warn,vs_core=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Compress {
            input,
            bitrate,
            max_width,
            output,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(compress(
                input.as_deref(),
                bitrate,
                max_width,
                output,
                cli.config.as_deref(),
            ))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate { file } => {
            let path = file.or(cli.config);
            validate_config(path.as_deref())
        }
    }
}

async fn compress(
    input: Option<&Path>,
    bitrate: Option<u32>,
    max_width: Option<u32>,
    output: Option<PathBuf>,
    config_path: Option<&Path>,
) -> Result<ExitCode> {
    let config = config::load_config_or_default(config_path)?;
    let params = config.encode.job_params(bitrate, max_width);
    let settings = EncodeSettings::from(&config.encode);

    let engine = FfmpegEngine::new(config.tools.clone())
        .with_required_encoders([settings.video_codec.clone(), settings.audio_codec.clone()])
        .with_timeout(Duration::from_secs(config.encode.timeout_secs));

    let bus = Arc::new(EventBus::new(BUS_CAPACITY));
    let frontend = tokio::spawn(ConsoleFrontend::stdio().run(bus.subscribe()));

    let mut orchestrator = Orchestrator::new(engine, settings, Arc::clone(&bus));
    let report = orchestrator.submit(input, params).await;
    if let Some(version) = orchestrator.engine().version() {
        tracing::info!("encoder: {version}");
    }

    // Dropping every bus handle closes the channel and lets the renderer
    // drain and exit.
    drop(orchestrator);
    drop(bus);
    frontend.await?;

    let Some(report) = report else {
        return Ok(ExitCode::FAILURE);
    };

    for line in report.summary.lines() {
        println!("{line}");
    }

    let dest = output.unwrap_or(config.output.dir);
    let saved = report.artifact.save(&dest)?;
    println!("Saved to {}", saved.display());

    Ok(ExitCode::SUCCESS)
}

fn check_tools(config_path: Option<&Path>) -> Result<ExitCode> {
    println!("Checking external tools...\n");

    let config = config::load_config_or_default(config_path)?;
    let registry = ToolRegistry::discover(&config.tools);
    let mut all_ok = true;

    for tool in registry.check_all() {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("ffmpeg is missing. Install it or set tools.ffmpeg_path in the config.");
    }

    Ok(ExitCode::SUCCESS)
}

fn validate_config(path: Option<&Path>) -> Result<ExitCode> {
    let (config, source) = match path.map(Path::to_path_buf).or_else(config::find_default_config) {
        Some(p) => {
            println!("Validating config: {:?}", p);
            (config::load_config(&p)?, Some(p))
        }
        None => {
            println!("No config file specified, using defaults");
            (config::Config::default(), None)
        }
    };

    let warnings = config.validate();
    if source.is_some() {
        println!("✓ Configuration is valid");
    }
    println!("  Bitrate: {} kbps", config.encode.bitrate_kbps);
    println!("  Max width: {}", config.encode.max_width);
    println!("  Preset: {}", config.encode.preset);
    println!(
        "  Audio: {} @ {}",
        config.encode.audio_codec, config.encode.audio_bitrate
    );
    println!("  Output dir: {}", config.output.dir.display());
    if let Some(ref ffmpeg) = config.tools.ffmpeg_path {
        println!("  ffmpeg: {}", ffmpeg.display());
    }

    for w in &warnings {
        println!("  warning: {w}");
    }

    Ok(ExitCode::SUCCESS)
}
