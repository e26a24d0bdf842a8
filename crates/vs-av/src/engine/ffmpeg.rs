//! [`Engine`] backed by a native ffmpeg binary.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use vs_core::config::ToolsConfig;
use vs_core::{EngineStage, Error};

use super::{Engine, ProgressCallback};
use crate::command::ToolCommand;
use crate::progress::ProgressParser;
use crate::tools::ToolRegistry;
use crate::workspace::Workspace;

/// Default encode timeout: 24 hours, enough for very large files.
const DEFAULT_ENCODE_TIMEOUT: Duration = Duration::from_secs(86_400);

/// Options ffmpeg needs for unattended runs with machine-readable progress.
const GLOBAL_ARGS: &[&str] = &["-hide_banner", "-nostdin", "-y", "-progress", "pipe:2", "-nostats"];

/// State that exists only after a successful load.
#[derive(Debug)]
struct Loaded {
    ffmpeg: PathBuf,
    version: Option<String>,
    workspace: Workspace,
}

/// ffmpeg subprocess engine with a private temporary working directory.
pub struct FfmpegEngine {
    tools: ToolsConfig,
    required_encoders: Vec<String>,
    timeout: Duration,
    loaded: Option<Loaded>,
    progress: Option<ProgressCallback>,
}

impl FfmpegEngine {
    pub fn new(tools: ToolsConfig) -> Self {
        Self {
            tools,
            required_encoders: vec!["libx264".into(), "aac".into()],
            timeout: DEFAULT_ENCODE_TIMEOUT,
            loaded: None,
            progress: None,
        }
    }

    /// Encoders that must be present for [`Engine::load`] to succeed.
    pub fn with_required_encoders(
        mut self,
        encoders: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.required_encoders = encoders.into_iter().map(Into::into).collect();
        self
    }

    /// Maximum duration of a single [`Engine::exec`] call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// First line of `ffmpeg -version`, once loaded.
    pub fn version(&self) -> Option<&str> {
        self.loaded.as_ref().and_then(|l| l.version.as_deref())
    }

    fn require_loaded(&self, stage: EngineStage) -> vs_core::Result<&Loaded> {
        self.loaded
            .as_ref()
            .ok_or_else(|| Error::engine(stage, "engine is not loaded"))
    }
}

#[async_trait]
impl Engine for FfmpegEngine {
    fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    fn on_progress(&mut self, callback: ProgressCallback) {
        self.progress = Some(callback);
    }

    async fn load(&mut self) -> vs_core::Result<()> {
        if self.loaded.is_some() {
            return Ok(());
        }

        let stage = EngineStage::Load;
        let registry = ToolRegistry::discover(&self.tools);
        let ffmpeg = registry.require("ffmpeg").map_err(|e| e.at_stage(stage))?.path.clone();

        let version = ToolCommand::new(ffmpeg.clone())
            .arg("-version")
            .execute()
            .await
            .map_err(|e| e.at_stage(stage))?
            .stdout
            .lines()
            .next()
            .map(str::to_string);

        let encoders = ToolCommand::new(ffmpeg.clone())
            .args(["-hide_banner", "-encoders"])
            .execute()
            .await
            .map_err(|e| e.at_stage(stage))?
            .stdout;
        let missing = missing_encoders(&encoders, &self.required_encoders);
        if !missing.is_empty() {
            return Err(Error::engine(
                stage,
                format!("ffmpeg lacks required encoders: {}", missing.join(", ")),
            ));
        }

        let workspace = Workspace::new().map_err(|e| e.at_stage(stage))?;

        tracing::info!(
            "engine loaded: {} ({})",
            ffmpeg.display(),
            version.as_deref().unwrap_or("unknown version")
        );

        self.loaded = Some(Loaded {
            ffmpeg,
            version,
            workspace,
        });
        Ok(())
    }

    async fn write_file(&mut self, name: &str, data: &[u8]) -> vs_core::Result<()> {
        let stage = EngineStage::Stage;
        let loaded = self.require_loaded(stage)?;
        loaded
            .workspace
            .write(name, data)
            .await
            .map_err(|e| e.at_stage(stage))
    }

    async fn exec(&mut self, args: &[String]) -> vs_core::Result<()> {
        let stage = EngineStage::Encode;
        let Self {
            loaded,
            progress,
            timeout,
            ..
        } = self;
        let loaded = loaded
            .as_ref()
            .ok_or_else(|| Error::engine(stage, "engine is not loaded"))?;

        let mut cmd = ToolCommand::new(loaded.ffmpeg.clone());
        cmd.current_dir(loaded.workspace.dir())
            .timeout(*timeout)
            .args(GLOBAL_ARGS.iter().copied())
            .args(args.iter().cloned());

        tracing::debug!("ffmpeg {}", cmd.get_args().join(" "));

        let mut parser = ProgressParser::new();
        cmd.execute_with_stderr_callback(|line| {
            if let Some(fraction) = parser.feed(line) {
                if let Some(cb) = progress.as_mut() {
                    cb(fraction);
                }
            } else {
                tracing::trace!("ffmpeg: {line}");
            }
        })
        .await
        .map_err(|e| e.at_stage(stage))?;

        Ok(())
    }

    async fn read_file(&mut self, name: &str) -> vs_core::Result<Vec<u8>> {
        let stage = EngineStage::ReadBack;
        let loaded = self.require_loaded(stage)?;
        loaded.workspace.read(name).await.map_err(|e| e.at_stage(stage))
    }

    async fn delete_file(&mut self, name: &str) -> vs_core::Result<()> {
        let stage = EngineStage::Stage;
        let loaded = self.require_loaded(stage)?;
        loaded.workspace.remove(name).await.map_err(|e| e.at_stage(stage))
    }
}

/// Encoders from `required` that do not appear in `ffmpeg -encoders` output.
fn missing_encoders(listing: &str, required: &[String]) -> Vec<String> {
    // Encoder rows follow the legend, after a "------" separator.
    let available: Vec<&str> = listing
        .lines()
        .skip_while(|line| line.trim() != "------")
        .skip(1)
        .filter_map(|line| line.split_whitespace().nth(1))
        .collect();

    required
        .iter()
        .filter(|r| !available.contains(&r.as_str()))
        .cloned()
        .collect()
}
