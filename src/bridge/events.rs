//! Push-style events from the backend (log and exec streams)

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, trace};

/// Event topics, each scoped to one container
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    LogStream(String),
    LogStreamError(String),
    LogStreamEnded(String),
    ExecOutput(String),
    ExecError(String),
    ExecEnded(String),
}

impl Topic {
    /// Wire name, e.g. `log-stream-ended-<id>`
    pub fn name(&self) -> String {
        match self {
            Topic::LogStream(id) => format!("log-stream-{}", id),
            Topic::LogStreamError(id) => format!("log-stream-error-{}", id),
            Topic::LogStreamEnded(id) => format!("log-stream-ended-{}", id),
            Topic::ExecOutput(id) => format!("exec-output-{}", id),
            Topic::ExecError(id) => format!("exec-error-{}", id),
            Topic::ExecEnded(id) => format!("exec-ended-{}", id),
        }
    }

    pub fn container_id(&self) -> &str {
        match self {
            Topic::LogStream(id)
            | Topic::LogStreamError(id)
            | Topic::LogStreamEnded(id)
            | Topic::ExecOutput(id)
            | Topic::ExecError(id)
            | Topic::ExecEnded(id) => id,
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One pushed event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    pub topic: Topic,
    pub payload: String,
}

#[derive(Default)]
struct HubInner {
    next_id: u64,
    listeners: HashMap<Topic, Vec<(u64, UnboundedSender<StreamEvent>)>>,
}

/// Topic-based fan-out of backend events to subscribed views
#[derive(Clone, Default)]
pub struct EventHub {
    inner: Arc<Mutex<HubInner>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe to a topic; dropping the returned handle unsubscribes
    pub fn subscribe(&self, topic: Topic) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.listeners.entry(topic.clone()).or_default().push((id, tx));
        debug!("Subscribed #{} to {}", id, topic);

        Subscription {
            topic,
            id,
            rx,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver a payload to every current subscriber of `topic`.
    ///
    /// Returns how many subscribers received it.
    pub fn emit(&self, topic: &Topic, payload: impl Into<String>) -> usize {
        let event = StreamEvent {
            topic: topic.clone(),
            payload: payload.into(),
        };
        let mut inner = self.lock();
        let Some(listeners) = inner.listeners.get_mut(topic) else {
            trace!("No listeners for {}", topic);
            return 0;
        };

        listeners.retain(|(_, tx)| tx.send(event.clone()).is_ok());
        let delivered = listeners.len();
        if listeners.is_empty() {
            inner.listeners.remove(topic);
        }
        delivered
    }

    pub fn listener_count(&self, topic: &Topic) -> usize {
        self.lock().listeners.get(topic).map(Vec::len).unwrap_or(0)
    }
}

fn unsubscribe(inner: &Mutex<HubInner>, topic: &Topic, id: u64) {
    let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(listeners) = inner.listeners.get_mut(topic) {
        listeners.retain(|(listener_id, _)| *listener_id != id);
        if listeners.is_empty() {
            inner.listeners.remove(topic);
        }
    }
}

/// Live subscription to one topic
pub struct Subscription {
    topic: Topic,
    id: u64,
    rx: UnboundedReceiver<StreamEvent>,
    hub: Weak<Mutex<HubInner>>,
}

impl Subscription {
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Next event if one is already queued
    pub fn try_next(&mut self) -> Option<StreamEvent> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next event
    pub async fn next(&mut self) -> Option<StreamEvent> {
        self.rx.recv().await
    }

    /// Everything queued so far
    pub fn drain(&mut self) -> Vec<StreamEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            unsubscribe(&inner, &self.topic, self.id);
            debug!("Unsubscribed #{} from {}", self.id, self.topic);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_names_are_distinct_per_container() {
        let topics = [
            Topic::LogStream("abc".into()),
            Topic::LogStreamError("abc".into()),
            Topic::LogStreamEnded("abc".into()),
            Topic::ExecOutput("abc".into()),
            Topic::ExecError("abc".into()),
            Topic::ExecEnded("abc".into()),
        ];
        let names: std::collections::HashSet<String> = topics.iter().map(Topic::name).collect();
        assert_eq!(names.len(), topics.len());
        for topic in &topics {
            assert_eq!(topic.container_id(), "abc");
            assert!(topic.name().ends_with("-abc"));
        }
        assert_eq!(Topic::LogStreamEnded("x1".into()).name(), "log-stream-ended-x1");
    }

    #[test]
    fn test_emit_reaches_only_matching_topic() {
        let hub = EventHub::new();
        let mut logs = hub.subscribe(Topic::LogStream("a".into()));
        let mut other = hub.subscribe(Topic::LogStream("b".into()));

        assert_eq!(hub.emit(&Topic::LogStream("a".into()), "line 1\n"), 1);

        let event = logs.try_next().expect("event delivered");
        assert_eq!(event.payload, "line 1\n");
        assert!(other.try_next().is_none());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let hub = EventHub::new();
        let topic = Topic::ExecOutput("a".into());
        let first = hub.subscribe(topic.clone());
        let second = hub.subscribe(topic.clone());
        assert_eq!(hub.listener_count(&topic), 2);

        drop(first);
        assert_eq!(hub.listener_count(&topic), 1);

        drop(second);
        assert_eq!(hub.listener_count(&topic), 0);
        assert_eq!(hub.emit(&topic, "ignored"), 0);
    }

    #[test]
    fn test_drain_collects_in_order() {
        let hub = EventHub::new();
        let topic = Topic::LogStream("a".into());
        let mut sub = hub.subscribe(topic.clone());
        hub.emit(&topic, "1");
        hub.emit(&topic, "2");
        hub.emit(&topic, "3");

        let payloads: Vec<_> = sub.drain().into_iter().map(|e| e.payload).collect();
        assert_eq!(payloads, vec!["1", "2", "3"]);
        assert!(sub.try_next().is_none());
    }

    #[tokio::test]
    async fn test_async_next() {
        let hub = EventHub::new();
        let topic = Topic::ExecEnded("a".into());
        let mut sub = hub.subscribe(topic.clone());

        let emitter = hub.clone();
        tokio::spawn(async move {
            emitter.emit(&Topic::ExecEnded("a".into()), "0");
        });

        let event = sub.next().await.expect("event");
        assert_eq!(event.topic, topic);
    }
}
