//! Job parameters, status messages and result summaries.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::format::{format_reduction, human_readable_size, reduction_percent};

/// Default target video bitrate in kbps.
pub const DEFAULT_BITRATE_KBPS: u32 = 1200;

/// Parameters for a single compression job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobParams {
    /// Target average video bitrate in kilobits per second.
    pub bitrate_kbps: u32,
    /// Maximum output width in pixels; `0` disables scaling.
    pub max_width: u32,
}

impl Default for JobParams {
    fn default() -> Self {
        Self {
            bitrate_kbps: DEFAULT_BITRATE_KBPS,
            max_width: 0,
        }
    }
}

impl JobParams {
    /// Reject parameters the encoder cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.bitrate_kbps == 0 {
            return Err(Error::Validation(
                "bitrate must be a positive number of kbps".into(),
            ));
        }
        Ok(())
    }

    /// Scaling width, if scaling was requested.
    pub fn scale_width(&self) -> Option<u32> {
        (self.max_width > 0).then_some(self.max_width)
    }
}

/// Clamp an engine progress sample into `[0, 1]`.
///
/// The engine is allowed to report values outside that range or move
/// backwards; non-finite samples display as zero.
pub fn clamp_progress(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// Human-facing job status, in the order a successful job passes through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobStatus {
    /// The engine is being initialized for the first time.
    Loading,
    /// The source file is being read and staged.
    Reading { size: u64 },
    /// The engine is encoding.
    Compressing,
    /// The encoded output is being read back.
    Preparing,
    /// The job finished successfully.
    Done,
    /// The job failed with the given description.
    Failed { message: String },
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Loading => f.write_str("Loading compressor (first time can take a bit)…"),
            JobStatus::Reading { size } => {
                write!(f, "Reading file ({})…", human_readable_size(*size))
            }
            JobStatus::Compressing => f.write_str("Compressing…"),
            JobStatus::Preparing => f.write_str("Preparing download…"),
            JobStatus::Done => f.write_str("Done."),
            JobStatus::Failed { message } => write!(f, "Error: {message}"),
        }
    }
}

/// Size statistics of a finished job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub original_size: u64,
    pub compressed_size: u64,
    /// `None` when the reduction is not a finite number.
    pub reduction_percent: Option<f64>,
}

impl JobSummary {
    pub fn new(original_size: u64, compressed_size: u64) -> Self {
        Self {
            original_size,
            compressed_size,
            reduction_percent: reduction_percent(original_size, compressed_size),
        }
    }

    /// Render the two summary lines shown after a successful job.
    pub fn lines(&self) -> [String; 2] {
        [
            format!("Original: {}", human_readable_size(self.original_size)),
            format!(
                "Compressed: {} ({}% smaller)",
                human_readable_size(self.compressed_size),
                format_reduction(self.reduction_percent)
            ),
        ]
    }
}
