//! Console front end.
//!
//! Renders orchestrator events on a terminal: status lines and alerts on
//! stderr and a progress bar while encoding. The size summary is printed by
//! the caller from the returned report.

use std::io::{self, Write};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::broadcast::{self, error::RecvError};
use vs_core::events::{Event, EventPayload};

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos:>3}%";

/// Writes job events to an error stream and a progress bar.
pub struct ConsoleFrontend<E: Write> {
    err: E,
    draw_target: fn() -> ProgressDrawTarget,
    /// Open while a job is encoding.
    bar: Option<ProgressBar>,
}

impl ConsoleFrontend<io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stderr(), ProgressDrawTarget::stderr)
    }
}

impl<E: Write> ConsoleFrontend<E> {
    pub fn new(err: E, draw_target: fn() -> ProgressDrawTarget) -> Self {
        Self {
            err,
            draw_target,
            bar: None,
        }
    }

    /// Render events until the bus is dropped.
    ///
    /// A renderer that falls behind skips the events it missed, so the bus
    /// must be sized well above the events of one job.
    pub async fn run(mut self, mut rx: broadcast::Receiver<Event>) -> Self {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Err(e) = self.render(&event) {
                        tracing::warn!("failed to render event: {e}");
                    }
                }
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!("renderer skipped {n} events");
                }
                Err(RecvError::Closed) => break,
            }
        }
        self.clear_bar();
        self
    }

    /// Render a single event.
    pub fn render(&mut self, event: &Event) -> io::Result<()> {
        match &event.payload {
            EventPayload::Progress { progress } => {
                self.draw_progress(*progress);
                Ok(())
            }
            EventPayload::Status { status } => {
                self.clear_bar();
                writeln!(self.err, "{status}")
            }
            EventPayload::Alert { message } => {
                self.clear_bar();
                writeln!(self.err, "{message}")
            }
            EventPayload::Completed { .. } => {
                self.clear_bar();
                Ok(())
            }
            EventPayload::TriggerEnabled { enabled } => {
                tracing::trace!(enabled, "trigger");
                Ok(())
            }
            // The error already went out as a status line.
            EventPayload::OutputCleared | EventPayload::Failed { .. } => Ok(()),
        }
    }

    /// Position of the open progress bar, in percent.
    pub fn progress_position(&self) -> Option<u64> {
        self.bar.as_ref().map(ProgressBar::position)
    }

    /// Consume the front end, returning its error writer.
    pub fn into_inner(mut self) -> E {
        self.clear_bar();
        self.err
    }

    fn draw_progress(&mut self, progress: f64) {
        let pct = (progress * 100.0).round() as u64;
        // The zero reset at job start does not open a bar.
        if self.bar.is_none() && pct == 0 {
            return;
        }
        let draw_target = self.draw_target;
        let bar = self.bar.get_or_insert_with(|| {
            let bar = ProgressBar::with_draw_target(Some(100), draw_target());
            if let Ok(style) = ProgressStyle::with_template(PROGRESS_TEMPLATE) {
                bar.set_style(style.progress_chars("#>-"));
            }
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        });
        bar.set_position(pct.min(100));
    }

    fn clear_bar(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
