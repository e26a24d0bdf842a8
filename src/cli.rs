use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vidshrink")]
#[command(author, version, about = "Re-encode a video into a smaller MP4 using ffmpeg")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compress a video into a smaller MP4
    Compress {
        /// Video file to compress
        input: Option<PathBuf>,

        /// Target video bitrate in kbps [default: 1200]
        #[arg(short, long)]
        bitrate: Option<u32>,

        /// Maximum output width in pixels; 0 keeps the original size
        #[arg(short = 'w', long)]
        max_width: Option<u32>,

        /// Where to save the result (file or directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that ffmpeg is available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        file: Option<PathBuf>,
    },
}
