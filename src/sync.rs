// State-sync channel between model objects and their visual counterparts

use std::cell::RefCell;

use serde_json::{json, Map, Value};

use crate::model::ModelId;

/// One observable change on the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncMessage {
    Open {
        id: ModelId,
        model: &'static str,
        state: Map<String, Value>,
    },
    Update {
        id: ModelId,
        state: Map<String, Value>,
    },
    Close {
        id: ModelId,
    },
}

impl SyncMessage {
    pub fn id(&self) -> ModelId {
        match self {
            SyncMessage::Open { id, .. }
            | SyncMessage::Update { id, .. }
            | SyncMessage::Close { id } => *id,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            SyncMessage::Open { id, model, state } => {
                json!({"method": "open", "id": id.reference(), "model": model, "state": state})
            }
            SyncMessage::Update { id, state } => {
                json!({"method": "update", "id": id.reference(), "state": state})
            }
            SyncMessage::Close { id } => json!({"method": "close", "id": id.reference()}),
        }
    }
}

/// Receiver of model changes. The transport behind it is not our concern.
pub trait SyncChannel {
    fn send(&self, message: SyncMessage);
}

/// Drops every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullChannel;

impl SyncChannel for NullChannel {
    fn send(&self, _message: SyncMessage) {}
}

/// Keeps every message in order of arrival.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    messages: RefCell<Vec<SyncMessage>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<SyncMessage> {
        self.messages.borrow().clone()
    }

    /// Update payloads sent for one model.
    pub fn updates_for(&self, id: ModelId) -> Vec<Map<String, Value>> {
        self.messages
            .borrow()
            .iter()
            .filter_map(|m| match m {
                SyncMessage::Update { id: target, state } if *target == id => Some(state.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn was_closed(&self, id: ModelId) -> bool {
        self.messages
            .borrow()
            .iter()
            .any(|m| matches!(m, SyncMessage::Close { id: target } if *target == id))
    }

    pub fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.messages.borrow_mut().clear();
    }

    pub fn to_json(&self) -> Value {
        Value::Array(self.messages.borrow().iter().map(SyncMessage::to_json).collect())
    }
}

impl SyncChannel for RecordingChannel {
    fn send(&self, message: SyncMessage) {
        self.messages.borrow_mut().push(message);
    }
}
