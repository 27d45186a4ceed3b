//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`PlatformEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the application.
//! Publishing is best-effort: ledger mutations never fail because an event
//! could not be delivered.

use chrono::{DateTime, Utc};
use hourbank_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Event type names
// ---------------------------------------------------------------------------

pub const EVENT_JOB_CREATED: &str = "job.created";
pub const EVENT_JOB_CLAIMED: &str = "job.claimed";
pub const EVENT_JOB_RELEASED: &str = "job.released";
pub const EVENT_JOB_COMPLETED: &str = "job.completed";
pub const EVENT_EXCHANGE_CREATED: &str = "exchange.created";
pub const EVENT_FLAG_CREATED: &str = "flag.created";
pub const EVENT_FLAG_UPDATED: &str = "flag.updated";
pub const EVENT_USER_DOWNGRADED: &str = "user.downgraded";
pub const EVENT_APPRECIATION_CREATED: &str = "appreciation.created";

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// A domain event that occurred on the platform.
///
/// Constructed via [`PlatformEvent::new`] and enriched with the builder
/// methods [`with_source`](PlatformEvent::with_source),
/// [`with_actor`](PlatformEvent::with_actor), and
/// [`with_payload`](PlatformEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Dot-separated event name, e.g. `"job.completed"`.
    pub event_type: String,

    /// Optional source entity kind (e.g. `"job"`, `"flag"`).
    pub source_entity_type: Option<String>,

    /// Optional source entity database id.
    pub source_entity_id: Option<DbId>,

    /// Optional id of the user that triggered the event.
    pub actor_user_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach a source entity to the event.
    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    /// Attach the acting user to the event.
    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Channel capacity. Slow subscribers past this lag and skip events rather
/// than block publishers.
const CHANNEL_CAPACITY: usize = 1024;

/// Central publish/subscribe hub for [`PlatformEvent`]s.
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }
}

impl EventBus {
    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received it. Zero subscribers
    /// is not an error.
    pub fn publish(&self, event: PlatformEvent) -> usize {
        match self.sender.send(event) {
            Ok(n) => n,
            Err(e) => {
                tracing::debug!(event_type = %e.0.event_type, "No subscribers for event");
                0
            }
        }
    }

    /// Create a new subscription starting from the next published event.
    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}
