//! Event System
//!
//! Pub/sub event bus for build lifecycle notifications. Stands in for the
//! host editor's status bar and error dialogs: subscribers render
//! `BuildStarted`/`BuildFinished` as status indicators and `Error` as a
//! user-visible notification.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use tracing::debug;

/// How a build process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildResult {
    /// Process exited with status 0.
    Succeeded,
    /// Process exited non-zero or could not be launched.
    Failed,
    /// Process was terminated by an explicit kill request.
    Killed,
}

/// Events emitted by the build pipeline
#[derive(Debug, Clone)]
pub enum Event {
    /// A build process started; show the "building" status indicator.
    BuildStarted { target: String },
    /// A build was queued behind the in-flight one.
    BuildQueued { target: String },
    /// A build process exited; clear the status indicator.
    BuildFinished { target: String, result: BuildResult },
    /// User-visible error notification.
    Error { message: String },
}

/// Subscriber handle for receiving events
#[derive(Clone)]
pub struct EventSubscription {
    receiver: Receiver<Event>,
}

impl EventSubscription {
    /// Receive the next event (blocking)
    pub fn recv(&self) -> Result<Event, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking)
    pub fn try_recv(&self) -> Result<Event, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Get an iterator over events
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.receiver.iter()
    }
}

/// Event bus for publish/subscribe pattern
pub struct EventBus {
    subscribers: RwLock<Vec<Sender<Event>>>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> EventSubscription {
        let (sender, receiver) = unbounded();
        self.subscribers.write().push(sender);
        EventSubscription { receiver }
    }

    /// Emit an event to all subscribers
    pub fn emit(&self, event: Event) -> usize {
        let subscribers = self.subscribers.read();
        let mut delivered = 0;

        for sender in subscribers.iter() {
            if sender.send(event.clone()).is_ok() {
                delivered += 1;
            }
        }

        debug!("Event {:?} delivered to {} subscribers", event, delivered);
        delivered
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_bus() {
        let bus = EventBus::new();
        let sub1 = bus.subscribe();
        let sub2 = bus.subscribe();

        assert_eq!(bus.subscriber_count(), 2);

        let delivered = bus.emit(Event::BuildStarted {
            target: "debug".to_string(),
        });
        assert_eq!(delivered, 2);

        assert!(sub1.try_recv().is_ok());
        assert!(sub2.try_recv().is_ok());
    }

    #[test]
    fn test_build_finished_carries_result() {
        let bus = EventBus::new();
        let sub = bus.subscribe();

        bus.emit(Event::BuildFinished {
            target: "debug".to_string(),
            result: BuildResult::Killed,
        });

        match sub.try_recv().unwrap() {
            Event::BuildFinished { result, .. } => assert_eq!(result, BuildResult::Killed),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
