// Event system for change notifications between services and their observers
// Implements event bus pattern using tokio broadcast channels

use crate::models::Profile;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Maximum capacity for the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Source name of events published by the photo feed service
pub const FEED_SOURCE: &str = "photo_feed";

/// Source name of events published by the profile fetcher
pub const PROFILE_SOURCE: &str = "profile";

/// Source name of events published by the avatar URL fetcher
pub const AVATAR_SOURCE: &str = "avatar";

/// A change notification
///
/// Carries the originating service name and what changed. Observers are
/// expected to re-read current state from the service.
#[derive(Debug, Clone)]
pub struct Event {
    pub source: String,
    pub kind: EventKind,
    pub timestamp: chrono::DateTime<chrono::Local>,
}

impl Event {
    /// Create a new event
    pub fn new(source: impl Into<String>, kind: EventKind) -> Self {
        Self {
            source: source.into(),
            kind,
            timestamp: chrono::Local::now(),
        }
    }

    /// Check if this event was published by the given service
    pub fn is_from(&self, source: &str) -> bool {
        self.source == source
    }
}

/// Types of change notifications
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// Feed contents changed: a page was appended (`updated_id` is None)
    /// or a photo's like state was refreshed (`updated_id` names it)
    FeedChanged { updated_id: Option<String> },

    /// Current user's profile was fetched
    ProfileChanged { profile: Profile },

    /// Avatar URL was fetched
    AvatarChanged { url: String },
}

/// Event bus for publishing and subscribing to events
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus with default capacity
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribe to events - returns a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Publish an event to all subscribers
    ///
    /// Fails with `SendFailed` when nobody is subscribed.
    pub fn publish(&self, event: Event) -> Result<usize, EventError> {
        self.tx.send(event).map_err(|_| EventError::SendFailed)
    }

    /// Publish an event, treating "no subscribers" as a non-event
    pub(crate) fn notify(&self, source: &str, kind: EventKind) {
        if self.publish(Event::new(source, kind)).is_err() {
            tracing::debug!("No subscribers for {} event", source);
        }
    }

    /// Register a callback for events from `source` (or all events when None)
    ///
    /// The callback runs on a spawned tokio task, so this must be called
    /// from within a runtime. Dropping the returned `Subscription`
    /// unregisters the callback.
    pub fn on<F>(&self, source: Option<&str>, mut callback: F) -> Subscription
    where
        F: FnMut(Event) + Send + 'static,
    {
        let mut rx = self.tx.subscribe();
        let filter = source.map(str::to_string);

        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if filter.as_deref().map_or(true, |s| event.is_from(s)) {
                            callback(event);
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Event subscriber lagged, skipped {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Subscription { handle }
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a callback registered with `EventBus::on`
///
/// The callback stays registered for as long as this handle lives.
#[must_use = "dropping a Subscription unregisters its callback"]
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Explicitly unregister the callback
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// True while the callback is still registered and the bus is open
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Errors that can occur during event operations
#[derive(Debug, Clone, Error)]
pub enum EventError {
    #[error("Failed to send event")]
    SendFailed,
}
