//! # Event Bus System
//!
//! Typed notifications from the upload core, broadcast over
//! `tokio::sync::broadcast` so hosts can observe invocations without
//! coupling to the controller.
//!
//! ```text
//! ┌──────────────┐   emit   ┌──────────┐  subscribe  ┌────────────┐
//! │  Controller  ├─────────>│          ├────────────>│ Host / UI  │
//! └──────────────┘          │ EventBus │             └────────────┘
//! ┌──────────────┐   emit   │          │  subscribe  ┌────────────┐
//! │ Token bridge ├─────────>│          ├────────────>│   Tests    │
//! └──────────────┘          └──────────┘             └────────────┘
//! ```
//!
//! Emission is best-effort: callers discard the `SendError` returned when
//! nobody is subscribed (`event_bus.emit(event).ok()`).
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, UploadEvent};
//!
//! let bus = EventBus::new(16);
//! let mut rx = bus.subscribe();
//! bus.emit(CoreEvent::Upload(UploadEvent::JobCreated {
//!     key: "ABC-123".to_string(),
//! }))
//! .ok();
//! assert!(rx.try_recv().is_ok());
//! ```

use core_async::sync::broadcast::{self, error::SendError};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use core_async::sync::broadcast::error::RecvError;
pub use core_async::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that fall further behind receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Upload(UploadEvent),
    Auth(AuthEvent),
}

/// Lifecycle phase of an invocation, used in event payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadPhase {
    Retry,
    Acknowledge,
    Discovery,
}

impl fmt::Display for UploadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadPhase::Retry => write!(f, "retry"),
            UploadPhase::Acknowledge => write!(f, "acknowledge"),
            UploadPhase::Discovery => write!(f, "discovery"),
        }
    }
}

/// Events emitted by the upload job lifecycle controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum UploadEvent {
    /// An invocation began.
    InvocationStarted { invocation_id: String },
    /// Failed jobs were handed back to the host for another attempt.
    JobsRetried { count: usize },
    /// Terminal jobs were consumed.
    JobsAcknowledged { count: usize },
    /// A new upload job was enqueued for the asset with this dedup key.
    JobCreated { key: String },
    /// The host queue reported it is full.
    Backpressure { phase: UploadPhase },
    /// The termination signal was observed.
    Cancelled { phase: UploadPhase },
    /// An invocation ended.
    InvocationFinished {
        invocation_id: String,
        /// `processing`, `completed` or `failed`
        status: String,
        created: usize,
        scanned: usize,
    },
}

/// Events emitted by the auth token bridge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AuthEvent {
    /// No token could be obtained; discovery is skipped for this invocation.
    TokenUnavailable { reason: String },
}

/// Central broadcast channel for core events.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers, or an error when nobody is listening.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a receiver for all future events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created(key: &str) -> CoreEvent {
        CoreEvent::Upload(UploadEvent::JobCreated {
            key: key.to_string(),
        })
    }

    #[test]
    fn test_emit_without_subscribers_is_an_error() {
        let bus = EventBus::new(4);
        assert!(bus.emit(created("a")).is_err());
    }

    #[core_async::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(4);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        assert_eq!(bus.emit(created("a")).unwrap(), 2);

        assert_eq!(first.recv().await.unwrap(), created("a"));
        assert_eq!(second.recv().await.unwrap(), created("a"));
    }

    #[core_async::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();

        for key in ["a", "b", "c", "d"] {
            bus.emit(created(key)).ok();
        }

        match rx.recv().await {
            Err(RecvError::Lagged(n)) => assert_eq!(n, 2),
            other => panic!("expected lag, got {:?}", other),
        }
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Upload(UploadEvent::Backpressure {
            phase: UploadPhase::Discovery,
        });
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "Upload");
        assert_eq!(json["payload"]["event"], "Backpressure");
        assert_eq!(json["payload"]["phase"], "discovery");

        let back: CoreEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
