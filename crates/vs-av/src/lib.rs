//! # vs-av
//!
//! The media engine side of vidshrink.
//!
//! This crate provides:
//!
//! - **The engine seam** ([`Engine`]) -- stage files, run the encoder, read
//!   results back, observe progress. [`FfmpegEngine`] implements it on top of
//!   a native ffmpeg binary.
//! - **Argument construction** ([`args`]) -- the ffmpeg command line for one
//!   compression job.
//! - **Progress parsing** ([`ProgressParser`]) -- turns ffmpeg's stderr into
//!   progress fractions.
//! - **Tool discovery** ([`ToolRegistry`]) and **command execution**
//!   ([`ToolCommand`]).
//! - **Working storage** ([`Workspace`]) -- a private temporary directory.

pub mod args;
pub mod command;
pub mod engine;
pub mod progress;
pub mod tools;
pub mod workspace;

// ---- Re-exports for convenience ----

pub use args::{build_encode_args, EncodeSettings, INPUT_NAME, OUTPUT_NAME};
pub use command::{ToolCommand, ToolOutput};
pub use engine::{Engine, FfmpegEngine, ProgressCallback};
pub use progress::ProgressParser;
pub use tools::{ToolConfig, ToolInfo, ToolRegistry};
pub use workspace::Workspace;
