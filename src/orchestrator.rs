//! Transcode orchestration.
//!
//! [`Orchestrator`] owns the engine and runs one compression job at a time:
//! load the engine once, stage the source, encode, read the result back.
//! Everything a front end shows is published on the [`EventBus`].

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use vs_av::{build_encode_args, EncodeSettings, Engine, INPUT_NAME, OUTPUT_NAME};
use vs_core::events::{EventBus, EventPayload};
use vs_core::{clamp_progress, EngineStage, Error, JobId, JobParams, JobStatus, JobSummary};

use crate::download::DownloadArtifact;

/// Message raised when a job is requested without a source file.
pub const NO_FILE_MESSAGE: &str = "Pick a video file first.";

/// Result of a successful job.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub job_id: JobId,
    pub summary: JobSummary,
    pub artifact: DownloadArtifact,
}

/// Runs compression jobs against a single, lazily loaded engine.
pub struct Orchestrator<E: Engine> {
    engine: E,
    settings: EncodeSettings,
    bus: Arc<EventBus>,
    /// Job the engine's progress samples belong to.
    current_job: Arc<Mutex<Option<JobId>>>,
    progress_registered: bool,
    trigger_enabled: bool,
}

impl<E: Engine> Orchestrator<E> {
    pub fn new(engine: E, settings: EncodeSettings, bus: Arc<EventBus>) -> Self {
        Self {
            engine,
            settings,
            bus,
            current_job: Arc::new(Mutex::new(None)),
            progress_registered: false,
            trigger_enabled: true,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Whether a new job may be started.
    pub fn is_trigger_enabled(&self) -> bool {
        self.trigger_enabled
    }

    /// Entry point for a front end: validate input, run one job, report.
    ///
    /// Returns the report on success. Every failure is published as a status
    /// message instead of being returned, and the trigger is enabled again
    /// on every path once a job has started.
    pub async fn submit(&mut self, file: Option<&Path>, params: JobParams) -> Option<JobReport> {
        let Some(file) = file else {
            self.bus.publish(
                None,
                EventPayload::Alert {
                    message: NO_FILE_MESSAGE.to_string(),
                },
            );
            return None;
        };

        if !self.trigger_enabled {
            tracing::warn!("job requested while another is running; ignoring");
            return None;
        }

        if let Err(e) = params.validate() {
            self.bus.publish(
                None,
                EventPayload::Alert {
                    message: e.to_string(),
                },
            );
            return None;
        }

        let job_id = JobId::new();
        self.set_trigger(Some(job_id), false);
        self.bus.publish(Some(job_id), EventPayload::OutputCleared);
        self.bus
            .publish(Some(job_id), EventPayload::Progress { progress: 0.0 });
        *self.current_job.lock() = Some(job_id);

        let result = self.run_job(job_id, file, &params).await;

        let report = match result {
            Ok(report) => {
                tracing::info!(
                    %job_id,
                    original = report.summary.original_size,
                    compressed = report.summary.compressed_size,
                    "job finished"
                );
                self.bus.publish(
                    Some(job_id),
                    EventPayload::Completed {
                        summary: report.summary,
                        file_name: report.artifact.file_name.clone(),
                    },
                );
                self.status(job_id, JobStatus::Done);
                Some(report)
            }
            Err(e) => {
                tracing::error!(%job_id, "job failed: {e}");
                let message = e.to_string();
                self.status(
                    job_id,
                    JobStatus::Failed {
                        message: message.clone(),
                    },
                );
                self.bus
                    .publish(Some(job_id), EventPayload::Failed { error: message });
                None
            }
        };

        *self.current_job.lock() = None;
        self.set_trigger(Some(job_id), true);
        report
    }

    /// Run one job to completion. Does not touch the trigger.
    pub async fn run_job(
        &mut self,
        job_id: JobId,
        file: &Path,
        params: &JobParams,
    ) -> vs_core::Result<JobReport> {
        params.validate()?;
        self.ensure_loaded(job_id).await?;

        let stage_err =
            |e: std::io::Error| Error::engine(EngineStage::Stage, format!("{}: {e}", file.display()));

        let size = tokio::fs::metadata(file).await.map_err(stage_err)?.len();
        self.status(job_id, JobStatus::Reading { size });

        let source = tokio::fs::read(file).await.map_err(stage_err)?;
        let original_size = source.len() as u64;

        // A leftover output from an earlier job must never be read back.
        self.engine.delete_file(OUTPUT_NAME).await?;
        self.engine.write_file(INPUT_NAME, &source).await?;
        drop(source);

        let args = build_encode_args(params, &self.settings);
        tracing::debug!(%job_id, ?args, "encoder arguments");

        self.status(job_id, JobStatus::Compressing);
        self.engine.exec(&args).await?;

        self.status(job_id, JobStatus::Preparing);
        let encoded = self.engine.read_file(OUTPUT_NAME).await?;

        if let Err(e) = self.engine.delete_file(INPUT_NAME).await {
            tracing::warn!(%job_id, "failed to clear staged input: {e}");
        }

        let artifact = DownloadArtifact::mp4(encoded);
        Ok(JobReport {
            job_id,
            summary: JobSummary::new(original_size, artifact.len()),
            artifact,
        })
    }

    /// Load the engine unless it already is, registering the progress
    /// observer exactly once.
    async fn ensure_loaded(&mut self, job_id: JobId) -> vs_core::Result<()> {
        if self.engine.is_loaded() {
            return Ok(());
        }

        self.status(job_id, JobStatus::Loading);

        if !self.progress_registered {
            let bus = Arc::clone(&self.bus);
            let current = Arc::clone(&self.current_job);
            self.engine.on_progress(Box::new(move |raw| {
                let job = *current.lock();
                bus.publish(
                    job,
                    EventPayload::Progress {
                        progress: clamp_progress(raw),
                    },
                );
            }));
            self.progress_registered = true;
        }

        self.engine
            .load()
            .await
            .map_err(|e| e.at_stage(EngineStage::Load))
    }

    fn status(&self, job_id: JobId, status: JobStatus) {
        tracing::debug!(%job_id, "{status}");
        self.bus
            .publish(Some(job_id), EventPayload::Status { status });
    }

    fn set_trigger(&mut self, job_id: Option<JobId>, enabled: bool) {
        self.trigger_enabled = enabled;
        self.bus
            .publish(job_id, EventPayload::TriggerEnabled { enabled });
    }
}
