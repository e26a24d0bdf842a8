//! Shared test helpers.

#![allow(dead_code)]

use std::path::PathBuf;

use async_trait::async_trait;
use tempfile::TempDir;
use vs_av::{Engine, ProgressCallback};
use vs_core::events::{Event, EventBus, EventPayload};
use vs_core::{EngineStage, Error, JobStatus};

/// One recorded engine call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load,
    Write(String, usize),
    Exec(Vec<String>),
    Read(String),
    Delete(String),
}

/// In-memory engine that follows a script instead of running ffmpeg.
pub struct ScriptedEngine {
    pub loaded: bool,
    pub calls: Vec<Call>,
    pub callbacks_registered: usize,
    /// Stage at which the next operations fail, until cleared.
    pub fail_at: Option<EngineStage>,
    /// Raw progress samples emitted during `exec`.
    pub progress_samples: Vec<f64>,
    /// Bytes the encode "produces".
    pub output: Vec<u8>,
    progress: Option<ProgressCallback>,
    files: Vec<(String, Vec<u8>)>,
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self {
            loaded: false,
            calls: Vec::new(),
            callbacks_registered: 0,
            fail_at: None,
            progress_samples: vec![0.1, 0.5, 0.4, 1.3, -0.2, f64::NAN, 1.0],
            output: vec![7u8; 400],
            progress: None,
            files: Vec::new(),
        }
    }
}

impl ScriptedEngine {
    pub fn failing_at(stage: EngineStage) -> Self {
        Self {
            fail_at: Some(stage),
            ..Self::default()
        }
    }

    pub fn load_count(&self) -> usize {
        self.calls.iter().filter(|c| **c == Call::Load).count()
    }

    pub fn exec_args(&self) -> Vec<Vec<String>> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Exec(args) => Some(args.clone()),
                _ => None,
            })
            .collect()
    }

    fn check(&self, stage: EngineStage) -> vs_core::Result<()> {
        if self.fail_at == Some(stage) {
            return Err(Error::engine(stage, format!("scripted {stage} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl Engine for ScriptedEngine {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn on_progress(&mut self, callback: ProgressCallback) {
        self.callbacks_registered += 1;
        self.progress = Some(callback);
    }

    async fn load(&mut self) -> vs_core::Result<()> {
        self.calls.push(Call::Load);
        self.check(EngineStage::Load)?;
        self.loaded = true;
        Ok(())
    }

    async fn write_file(&mut self, name: &str, data: &[u8]) -> vs_core::Result<()> {
        self.calls.push(Call::Write(name.to_string(), data.len()));
        self.check(EngineStage::Stage)?;
        self.files.retain(|(n, _)| n != name);
        self.files.push((name.to_string(), data.to_vec()));
        Ok(())
    }

    async fn exec(&mut self, args: &[String]) -> vs_core::Result<()> {
        self.calls.push(Call::Exec(args.to_vec()));
        if let Some(cb) = self.progress.as_mut() {
            for p in &self.progress_samples {
                cb(*p);
            }
        }
        self.check(EngineStage::Encode)?;
        let out = args.last().cloned().unwrap_or_default();
        self.files.retain(|(n, _)| *n != out);
        self.files.push((out, self.output.clone()));
        Ok(())
    }

    async fn read_file(&mut self, name: &str) -> vs_core::Result<Vec<u8>> {
        self.calls.push(Call::Read(name.to_string()));
        self.check(EngineStage::ReadBack)?;
        self.files
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d.clone())
            .ok_or_else(|| Error::engine(EngineStage::ReadBack, format!("{name} not found")))
    }

    async fn delete_file(&mut self, name: &str) -> vs_core::Result<()> {
        self.calls.push(Call::Delete(name.to_string()));
        self.files.retain(|(n, _)| n != name);
        Ok(())
    }
}

/// A source video on disk with the given content.
pub fn source_file(content: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("holiday.mov");
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

/// All events published so far, oldest first.
pub fn events(bus: &EventBus) -> Vec<Event> {
    let mut events = bus.recent_events(usize::MAX);
    events.reverse();
    events
}

pub fn statuses(bus: &EventBus) -> Vec<JobStatus> {
    events(bus)
        .into_iter()
        .filter_map(|e| match e.payload {
            EventPayload::Status { status } => Some(status),
            _ => None,
        })
        .collect()
}

pub fn trigger_states(bus: &EventBus) -> Vec<bool> {
    events(bus)
        .into_iter()
        .filter_map(|e| match e.payload {
            EventPayload::TriggerEnabled { enabled } => Some(enabled),
            _ => None,
        })
        .collect()
}

pub fn progress_values(bus: &EventBus) -> Vec<f64> {
    events(bus)
        .into_iter()
        .filter_map(|e| match e.payload {
            EventPayload::Progress { progress } => Some(progress),
            _ => None,
        })
        .collect()
}

pub fn completed_count(bus: &EventBus) -> usize {
    events(bus)
        .iter()
        .filter(|e| matches!(e.payload, EventPayload::Completed { .. }))
        .count()
}

pub fn alerts(bus: &EventBus) -> Vec<String> {
    events(bus)
        .into_iter()
        .filter_map(|e| match e.payload {
            EventPayload::Alert { message } => Some(message),
            _ => None,
        })
        .collect()
}
