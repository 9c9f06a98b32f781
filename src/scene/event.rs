//! Event Bus
//!
//! String-keyed multicast dispatcher used to decouple actors, input and
//! scenes.
//!
//! - Handlers run synchronously on the dispatching thread.
//! - Handlers for one key run in registration order.
//! - A handler may subscribe, unsubscribe or dispatch re-entrantly: the
//!   handler list is snapshotted before any handler runs.
//! - There is no queue; dispatch returns once every handler has returned.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::errors::{Result, TundraError};

/// One argument of an event.
#[derive(Clone)]
pub enum EventArg {
    Text(String),
    Number(f32),
    /// Shared payload the receiver downcasts.
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl EventArg {
    #[must_use]
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<&T> {
        match self {
            Self::Opaque(payload) => payload.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Debug for EventArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Self::Number(v) => f.debug_tuple("Number").field(v).finish(),
            Self::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

impl From<f32> for EventArg {
    fn from(value: f32) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for EventArg {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for EventArg {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Argument list carried by one dispatch.
pub type EventArgs = SmallVec<[EventArg; 4]>;

/// Builds an [`EventArgs`] list from values convertible into [`EventArg`].
#[macro_export]
macro_rules! event_args {
    () => { $crate::scene::event::EventArgs::new() };
    ($($arg:expr),+ $(,)?) => {{
        let mut args = $crate::scene::event::EventArgs::new();
        $( args.push($crate::scene::event::EventArg::from($arg)); )+
        args
    }};
}

/// What happens when an event has no handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingHandlerPolicy {
    /// Log a warning and continue.
    Warn,
    /// Return [`TundraError::UnhandledEvent`].
    #[default]
    Fail,
}

/// Identifies one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

type Handler = Arc<dyn Fn(&[EventArg]) + Send + Sync>;

pub struct EventBus {
    handlers: RwLock<FxHashMap<String, Vec<(HandlerId, Handler)>>>,
    policy: MissingHandlerPolicy,
    next_id: AtomicU64,
}

impl EventBus {
    #[must_use]
    pub fn new(policy: MissingHandlerPolicy) -> Self {
        Self {
            handlers: RwLock::new(FxHashMap::default()),
            policy,
            next_id: AtomicU64::new(1),
        }
    }

    #[must_use]
    pub fn policy(&self) -> MissingHandlerPolicy {
        self.policy
    }

    /// Registers a handler for `key`, after any existing ones.
    pub fn subscribe<F>(&self, key: &str, handler: F) -> HandlerId
    where
        F: Fn(&[EventArg]) + Send + Sync + 'static,
    {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .entry(key.to_string())
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Removes one subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: HandlerId) -> bool {
        let mut guard = self.handlers.write();
        let mut removed = false;
        guard.retain(|_, list| {
            let before = list.len();
            list.retain(|(handler_id, _)| *handler_id != id);
            removed |= list.len() != before;
            !list.is_empty()
        });
        removed
    }

    /// Removes every handler of `key`.
    pub fn erase(&self, key: &str) {
        self.handlers.write().remove(key);
    }

    pub fn clear(&self) {
        self.handlers.write().clear();
    }

    /// Keys with at least one handler, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.handlers.read().keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    #[must_use]
    pub fn handler_count(&self, key: &str) -> usize {
        self.handlers.read().get(key).map_or(0, Vec::len)
    }

    /// Delivers `args` to every handler of `key`.
    ///
    /// Returns the number of handlers invoked. With no handler registered the
    /// configured [`MissingHandlerPolicy`] decides between a warning
    /// (`Ok(0)`) and [`TundraError::UnhandledEvent`].
    pub fn dispatch(&self, key: &str, args: &[EventArg]) -> Result<usize> {
        let snapshot: SmallVec<[Handler; 4]> = match self.handlers.read().get(key) {
            Some(list) => list.iter().map(|(_, h)| Arc::clone(h)).collect(),
            None => SmallVec::new(),
        };

        if snapshot.is_empty() {
            return match self.policy {
                MissingHandlerPolicy::Warn => {
                    log::warn!("Event '{key}' dispatched with no handler registered");
                    Ok(0)
                }
                MissingHandlerPolicy::Fail => Err(TundraError::UnhandledEvent(key.to_string())),
            };
        }

        for handler in &snapshot {
            handler(args);
        }
        Ok(snapshot.len())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(MissingHandlerPolicy::default())
    }
}
