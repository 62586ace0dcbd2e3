// Shared model handles, property bags and batched updates

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{PlotError, Result};
use crate::sync::{SyncChannel, SyncMessage};

/// Ordered property assignments, applied in insertion order.
pub type Attrs = IndexMap<String, Value>;

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a model node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(u64);

impl ModelId {
    pub fn next() -> Self {
        ModelId(NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// How other models refer to this one in their state.
    pub fn reference(&self) -> String {
        format!("IPY_MODEL_{}", self.0)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node in the model graph mirrored to a rendering counterpart.
pub trait Model: Clone {
    fn id(&self) -> ModelId;

    fn model_name(&self) -> &'static str;

    /// Full synchronized state.
    fn state(&self) -> Map<String, Value>;

    /// Assign one property, validating its value.
    fn set_property(&mut self, name: &str, value: &Value) -> Result<()>;
}

/// Shared handle to a model. Equality is identity, never value.
pub struct Handle<T>(Rc<RefCell<T>>);

impl<T> Handle<T> {
    pub fn new(value: T) -> Self {
        Handle(Rc::new(RefCell::new(value)))
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Model> Handle<T> {
    pub fn id(&self) -> ModelId {
        self.borrow().id()
    }

    pub fn reference(&self) -> Value {
        Value::String(self.id().reference())
    }

    /// Announce the model with its full state.
    pub fn open(&self, channel: &dyn SyncChannel) {
        let model = self.borrow();
        channel.send(SyncMessage::Open {
            id: model.id(),
            model: model.model_name(),
            state: model.state(),
        });
    }

    /// Send the current value of `keys` as a single update.
    pub fn publish(&self, channel: &dyn SyncChannel, keys: &[&str]) {
        let model = self.borrow();
        let full = model.state();
        let state: Map<String, Value> = keys
            .iter()
            .filter_map(|k| full.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect();
        channel.send(SyncMessage::Update {
            id: model.id(),
            state,
        });
    }

    /// Apply every assignment in `attrs` as one batch.
    ///
    /// Writes go to a staged copy. The first invalid write fails the batch and
    /// nothing is committed or flushed. On success the channel sees exactly one
    /// update carrying every touched property.
    pub fn hold_sync(&self, channel: &dyn SyncChannel, attrs: &Attrs) -> Result<()> {
        if attrs.is_empty() {
            return Ok(());
        }
        let mut staged = self.borrow().clone();
        for (name, value) in attrs {
            staged.set_property(name, value)?;
        }
        let full = staged.state();
        let state: Map<String, Value> = attrs
            .keys()
            .filter_map(|k| full.get(k).map(|v| (k.clone(), v.clone())))
            .collect();
        let id = staged.id();
        *self.borrow_mut() = staged;
        channel.send(SyncMessage::Update { id, state });
        Ok(())
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Handle(Rc::clone(&self.0))
    }
}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T> Eq for Handle<T> {}

impl<T: fmt::Debug> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(inner) => f.debug_tuple("Handle").field(&*inner).finish(),
            Err(_) => f.write_str("Handle(<borrowed>)"),
        }
    }
}

// Property value coercions shared by the model types.

pub(crate) fn expect_f64(model: &str, property: &str, value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| PlotError::invalid_property(model, property, format!("expected a number, got {}", value)))
}

pub(crate) fn expect_opt_f64(model: &str, property: &str, value: &Value) -> Result<Option<f64>> {
    if value.is_null() {
        Ok(None)
    } else {
        expect_f64(model, property, value).map(Some)
    }
}

pub(crate) fn expect_u32(model: &str, property: &str, value: &Value) -> Result<u32> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            PlotError::invalid_property(model, property, format!("expected a non-negative integer, got {}", value))
        })
}

pub(crate) fn expect_bool(model: &str, property: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| PlotError::invalid_property(model, property, format!("expected a boolean, got {}", value)))
}

pub(crate) fn expect_str(model: &str, property: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| PlotError::invalid_property(model, property, format!("expected a string, got {}", value)))
}

pub(crate) fn expect_choice(
    model: &str,
    property: &str,
    value: &Value,
    choices: &[&str],
) -> Result<String> {
    let s = expect_str(model, property, value)?;
    if choices.contains(&s.as_str()) {
        Ok(s)
    } else {
        Err(PlotError::invalid_property(
            model,
            property,
            format!("'{}' is not one of {}", s, choices.join(", ")),
        ))
    }
}
