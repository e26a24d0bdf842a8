//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from TOML and carries the
//! tool overrides, encoder defaults and output location. Every section
//! defaults sensibly so a completely empty file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::job::{JobParams, DEFAULT_BITRATE_KBPS};
use crate::Error;

/// x264 presets ffmpeg accepts for `-preset`.
const KNOWN_PRESETS: &[&str] = &[
    "ultrafast",
    "superfast",
    "veryfast",
    "faster",
    "fast",
    "medium",
    "slow",
    "slower",
    "veryslow",
    "placebo",
];

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tools: ToolsConfig,
    pub encode: EncodeConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Deserialize a `Config` from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| Error::Config(format!("config parse error: {e}")))
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.encode.bitrate_kbps == 0 {
            warnings.push("encode.bitrate_kbps is 0; every job will be rejected".into());
        }

        if self.encode.preset.is_empty() {
            warnings.push("encode.preset is empty".into());
        } else if !KNOWN_PRESETS.contains(&self.encode.preset.as_str()) {
            warnings.push(format!(
                "encode.preset '{}' is not a recognized x264 preset (valid: {})",
                self.encode.preset,
                KNOWN_PRESETS.join(", ")
            ));
        }

        if self.encode.audio_codec.is_empty() {
            warnings.push("encode.audio_codec is empty".into());
        }

        if self.encode.timeout_secs == 0 {
            warnings.push("encode.timeout_secs is 0; encodes will time out immediately".into());
        }

        if let Some(ref p) = self.tools.ffmpeg_path {
            if !p.exists() {
                warnings.push(format!(
                    "tools.ffmpeg_path {} does not exist; PATH will be searched",
                    p.display()
                ));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Paths to external CLI tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
}

/// Encoder defaults. The rate-control ratios are fixed and not configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    pub bitrate_kbps: u32,
    pub max_width: u32,
    pub preset: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
    /// Upper bound on a single encode, in seconds.
    pub timeout_secs: u64,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            bitrate_kbps: DEFAULT_BITRATE_KBPS,
            max_width: 0,
            preset: "veryfast".into(),
            audio_codec: "aac".into(),
            audio_bitrate: "128k".into(),
            timeout_secs: 86_400,
        }
    }
}

impl EncodeConfig {
    /// Job parameters from CLI input, falling back to these defaults.
    pub fn job_params(&self, bitrate_kbps: Option<u32>, max_width: Option<u32>) -> JobParams {
        JobParams {
            bitrate_kbps: bitrate_kbps.unwrap_or(self.bitrate_kbps),
            max_width: max_width.unwrap_or(self.max_width),
        }
    }
}

/// Where finished downloads are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}
