//! vidshrink - re-encode videos into smaller MP4 files.
//!
//! The library crate exposes the orchestrator and front end so they can be
//! driven from integration tests.

pub mod config;
pub mod download;
pub mod frontend;
pub mod orchestrator;

pub use download::DownloadArtifact;
pub use frontend::ConsoleFrontend;
pub use orchestrator::{JobReport, Orchestrator};
