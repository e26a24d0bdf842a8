//! Job event system.
//!
//! [`EventBus`] wraps a `tokio::sync::broadcast` channel with a bounded
//! ring-buffer of recent events. The orchestrator publishes everything the
//! front end needs to render (status text, progress, trigger state, results)
//! and never calls into the front end directly.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio::sync::broadcast;

use crate::ids::JobId;
use crate::job::{JobStatus, JobSummary};

/// Maximum number of events retained in the ring buffer.
const MAX_RECENT_EVENTS: usize = 100;

// ---------------------------------------------------------------------------
// EventPayload
// ---------------------------------------------------------------------------

/// Payload describing what happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// The status line changed.
    Status { status: JobStatus },
    /// The progress display changed; always within `[0, 1]`.
    Progress { progress: f64 },
    /// The control that starts a job was enabled or disabled.
    TriggerEnabled { enabled: bool },
    /// Any previously rendered result should be cleared.
    OutputCleared,
    /// A message the user must acknowledge, raised before any job starts.
    Alert { message: String },
    /// A job produced a download.
    Completed {
        summary: JobSummary,
        file_name: String,
    },
    /// A job failed and produced nothing.
    Failed { error: String },
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A timestamped event ready for broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// The job this event belongs to, if one was running.
    pub job_id: Option<JobId>,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub payload: EventPayload,
}

impl Event {
    /// Create a new event stamped with the current time.
    pub fn new(job_id: Option<JobId>, payload: EventPayload) -> Self {
        Self {
            job_id,
            timestamp: Utc::now(),
            payload,
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Broadcast channel with a bounded ring buffer of recent events.
pub struct EventBus {
    tx: broadcast::Sender<Event>,
    recent: RwLock<VecDeque<Event>>,
}

impl EventBus {
    /// Create a new event bus.
    ///
    /// `capacity` controls the broadcast channel buffer size (not the ring
    /// buffer, which is always [`MAX_RECENT_EVENTS`]). Receivers that fall
    /// more than `capacity` events behind skip ahead.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            recent: RwLock::new(VecDeque::with_capacity(MAX_RECENT_EVENTS)),
        }
    }

    /// Subscribe to the broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Broadcast an event to all current subscribers and store it in the
    /// ring buffer.
    pub fn publish(&self, job_id: Option<JobId>, payload: EventPayload) {
        let event = Event::new(job_id, payload);

        {
            let mut recent = self.recent.write();
            if recent.len() >= MAX_RECENT_EVENTS {
                recent.pop_back();
            }
            recent.push_front(event.clone());
        }

        // No subscribers is fine.
        let _ = self.tx.send(event);
    }

    /// Return the `n` most recent events (newest first).
    pub fn recent_events(&self, n: usize) -> Vec<Event> {
        let recent = self.recent.read();
        recent.iter().take(n).cloned().collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        let job_id = JobId::new();
        bus.publish(
            Some(job_id),
            EventPayload::Status {
                status: JobStatus::Compressing,
            },
        );

        let event = rx.try_recv().unwrap();
        assert_eq!(event.job_id, Some(job_id));
        match &event.payload {
            EventPayload::Status { status } => assert_eq!(*status, JobStatus::Compressing),
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn recent_events_capped() {
        let bus = EventBus::new(256);
        for i in 0..150 {
            bus.publish(None, EventPayload::Progress { progress: i as f64 / 150.0 });
        }
        let recent = bus.recent_events(200);
        assert_eq!(recent.len(), MAX_RECENT_EVENTS);
    }

    #[test]
    fn recent_events_newest_first() {
        let bus = EventBus::new(16);
        bus.publish(None, EventPayload::TriggerEnabled { enabled: false });
        bus.publish(None, EventPayload::OutputCleared);
        bus.publish(None, EventPayload::TriggerEnabled { enabled: true });

        let recent = bus.recent_events(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].payload, EventPayload::TriggerEnabled { enabled: true });
        assert_eq!(recent[1].payload, EventPayload::OutputCleared);
    }

    #[test]
    fn no_subscribers_does_not_panic() {
        let bus = EventBus::new(4);
        bus.publish(
            None,
            EventPayload::Failed {
                error: "test".into(),
            },
        );
    }

    #[test]
    fn event_serializes_with_tag() {
        let event = Event::new(
            Some(JobId::new()),
            EventPayload::Completed {
                summary: JobSummary::new(1_000, 500),
                file_name: "compressed.mp4".into(),
            },
        );
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"completed\""));
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn default_event_bus() {
        let bus = EventBus::default();
        assert!(bus.recent_events(10).is_empty());
    }
}
