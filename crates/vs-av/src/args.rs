//! Encoder argument construction.
//!
//! Builds the ffmpeg argument list for one compression job: H.264 at a
//! target bitrate with a bounded peak rate, optional downscale-only width
//! cap, AAC audio and a faststart MP4 layout.

use vs_core::config::EncodeConfig;
use vs_core::JobParams;

/// Fixed name the source is staged under.
pub const INPUT_NAME: &str = "input";

/// Fixed name the encoder writes to.
pub const OUTPUT_NAME: &str = "output.mp4";

/// Peak rate cap relative to the target bitrate, in tenths.
const MAXRATE_TENTHS: u64 = 12;

/// Rate-control buffer size relative to the target bitrate.
const BUFSIZE_FACTOR: u64 = 2;

/// `-maxrate` in kbps: 1.2x target, rounded to the nearest integer.
pub fn maxrate_kbps(bitrate_kbps: u32) -> u64 {
    (u64::from(bitrate_kbps) * MAXRATE_TENTHS + 5) / 10
}

/// `-bufsize` in kbps: 2x target.
pub fn bufsize_kbps(bitrate_kbps: u32) -> u64 {
    u64::from(bitrate_kbps) * BUFSIZE_FACTOR
}

/// Scale filter capping width at `max_width` without upscaling.
///
/// `-2` keeps the aspect ratio and rounds the height to an even number.
pub fn scale_filter(max_width: u32) -> String {
    format!("scale='min({max_width},iw)':-2")
}

/// Encoder settings that stay fixed across jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeSettings {
    pub video_codec: String,
    pub preset: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self::from(&EncodeConfig::default())
    }
}

impl From<&EncodeConfig> for EncodeSettings {
    fn from(cfg: &EncodeConfig) -> Self {
        Self {
            video_codec: "libx264".into(),
            preset: cfg.preset.clone(),
            audio_codec: cfg.audio_codec.clone(),
            audio_bitrate: cfg.audio_bitrate.clone(),
        }
    }
}

/// Build the full argument list for a job, reading [`INPUT_NAME`] and
/// writing [`OUTPUT_NAME`].
pub fn build_encode_args(params: &JobParams, settings: &EncodeSettings) -> Vec<String> {
    let b = params.bitrate_kbps;
    let mut args: Vec<String> = vec!["-i".into(), INPUT_NAME.into()];

    if let Some(w) = params.scale_width() {
        args.extend(["-vf".into(), scale_filter(w)]);
    }

    args.extend([
        "-c:v".into(),
        settings.video_codec.clone(),
        "-preset".into(),
        settings.preset.clone(),
        "-b:v".into(),
        format!("{b}k"),
        "-maxrate".into(),
        format!("{}k", maxrate_kbps(b)),
        "-bufsize".into(),
        format!("{}k", bufsize_kbps(b)),
        "-movflags".into(),
        "+faststart".into(),
        "-c:a".into(),
        settings.audio_codec.clone(),
        "-b:a".into(),
        settings.audio_bitrate.clone(),
        OUTPUT_NAME.into(),
    ]);

    args
}
