//! vs-core: shared types, errors, configuration and the job event system.
//!
//! This crate is the foundational dependency for the other vidshrink crates,
//! providing the unified error type, job parameters and reports, size
//! formatting helpers, application configuration, and a broadcast event bus
//! through which a running job talks to whatever front end is attached.

pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod ids;
pub mod job;

// Re-export the most commonly used items at the crate root.
pub use error::{EngineStage, Error, Result};
pub use format::{format_reduction, human_readable_size, reduction_percent};
pub use ids::JobId;
pub use job::{clamp_progress, JobParams, JobStatus, JobSummary};
