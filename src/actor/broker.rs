use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;

use crate::actor::model::InternalMessage;

pub const SNAPSHOT_TOPIC: &str = "snapshots";

const TOPIC_CAPACITY: usize = 100;

#[derive(Clone, Debug)]
pub struct Topic {
    pub name: String,
    pub sender: broadcast::Sender<InternalMessage>,
}

impl Topic {
    fn new(name: &str) -> Self {
        let (sender, _) = broadcast::channel(TOPIC_CAPACITY);
        Topic {
            name: name.to_string(),
            sender,
        }
    }

    /// Returns how many subscribers got the message. Publishing with nobody
    /// listening is not an error.
    pub fn publish(&self, message: InternalMessage) -> usize {
        self.sender.send(message).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<InternalMessage> {
        self.sender.subscribe()
    }
}

/// Named broadcast topics, created on first use.
#[derive(Clone, Debug, Default)]
pub struct Broker {
    topics: Arc<Mutex<HashMap<String, Topic>>>,
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn topic(&self, name: &str) -> Topic {
        self.topics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_insert_with(|| Topic::new(name))
            .clone()
    }

    pub fn subscribe(&self, name: &str) -> broadcast::Receiver<InternalMessage> {
        self.topic(name).subscribe()
    }

    pub fn publish(&self, name: &str, message: InternalMessage) -> usize {
        self.topic(name).publish(message)
    }
}
