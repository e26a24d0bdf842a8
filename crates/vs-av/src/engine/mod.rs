//! The media engine seam.
//!
//! An [`Engine`] is an opaque encoder with a file-staging API, a command
//! execution API and a progress event source. The orchestrator only ever
//! talks to this trait, which keeps it testable without a real encoder.

mod ffmpeg;

pub use ffmpeg::FfmpegEngine;

use async_trait::async_trait;

/// Single-slot progress observer. Receives raw, unclamped fractions.
pub type ProgressCallback = Box<dyn FnMut(f64) + Send>;

#[async_trait]
pub trait Engine: Send {
    /// Whether [`Engine::load`] has completed successfully.
    fn is_loaded(&self) -> bool;

    /// Register the progress observer, replacing any previous one.
    fn on_progress(&mut self, callback: ProgressCallback);

    /// Initialize the engine. A no-op once loaded.
    async fn load(&mut self) -> vs_core::Result<()>;

    /// Stage `data` in working storage under `name`.
    async fn write_file(&mut self, name: &str, data: &[u8]) -> vs_core::Result<()>;

    /// Run the encoder with `args`, relative to working storage.
    async fn exec(&mut self, args: &[String]) -> vs_core::Result<()>;

    /// Read `name` back out of working storage.
    async fn read_file(&mut self, name: &str) -> vs_core::Result<Vec<u8>>;

    /// Remove `name` from working storage if present.
    async fn delete_file(&mut self, name: &str) -> vs_core::Result<()>;
}
