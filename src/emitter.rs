//! # EventEmitter
//!
//! Synchronous publish/subscribe registry. Listeners are stored per
//! [`EventName`] in registration order and invoked in that order by
//! [`EventEmitter::emit`].
//!
//! ## Reentrancy
//!
//! Every method takes `&self`. The mapping lives behind a per-instance
//! `parking_lot::Mutex` that is only held while the mapping is read or edited,
//! never while a listener runs. Listeners therefore receive the emitter and may
//! add or remove listeners freely; `emit` works on a snapshot, so such edits
//! only affect later emissions.
//!
//! ## Failure routing
//!
//! Registration failures ([`EmitterError::Validation`] and
//! [`EmitterError::Capacity`]) are emitted on the `error` slot when it has
//! listeners, and returned to the caller otherwise. A rejected registration
//! never inserts anything.
//!
//! A listener that returns `Err` aborts the emission in progress: later
//! listeners in the same pass are not called and nothing is rolled back.

use std::{
    collections::{hash_map::Entry, HashMap},
    fmt,
    sync::Arc,
};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::{
    config::{validate_max_listeners, EmitterConfig, DEFAULT_MAX_LISTENERS},
    error::{EmitterError, EmitterResult},
    event::{event_name::EventName, value::Value},
    listener::{Listener, ListenerEntry},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Append,
    Prepend,
}

/// Mapping state guarded by the emitter lock.
struct ListenerMap {
    /// Slot creation order, reported by `event_names`.
    order: Vec<EventName>,
    /// Never holds an empty sequence. Entries are shared so a registration
    /// keeps its identity across snapshots.
    slots: HashMap<EventName, Vec<Arc<ListenerEntry>>>,
    max_listeners: usize,
}

impl ListenerMap {
    fn new(max_listeners: usize) -> Self {
        Self {
            order: Vec::new(),
            slots: HashMap::new(),
            max_listeners,
        }
    }

    fn count(&self, event: &EventName) -> usize {
        self.slots.get(event).map_or(0, Vec::len)
    }

    fn capacity_error(&self, event: &EventName) -> Option<EmitterError> {
        (self.count(event) >= self.max_listeners).then(|| EmitterError::Capacity {
            event: event.to_string(),
            max: self.max_listeners,
        })
    }

    fn insert(&mut self, event: EventName, entry: ListenerEntry, position: Position) {
        let entries = match self.slots.entry(event) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => {
                self.order.push(vacant.key().clone());
                vacant.insert(Vec::new())
            }
        };
        match position {
            Position::Append => entries.push(Arc::new(entry)),
            Position::Prepend => entries.insert(0, Arc::new(entry)),
        }
    }

    fn find(&self, event: &EventName, listener: &Listener) -> Option<&Arc<ListenerEntry>> {
        self.slots
            .get(event)?
            .iter()
            .find(|entry| entry.matches(listener))
    }

    /// Removes exactly `target`, leaving other registrations of the same
    /// listener alone.
    fn remove_entry(
        &mut self,
        event: &EventName,
        target: &Arc<ListenerEntry>,
    ) -> Option<Arc<ListenerEntry>> {
        let entries = self.slots.get_mut(event)?;
        let index = entries.iter().position(|entry| Arc::ptr_eq(entry, target))?;
        let removed = entries.remove(index);
        if entries.is_empty() {
            self.remove_slot(event);
        }
        Some(removed)
    }

    fn remove_slot(&mut self, event: &EventName) -> Option<Vec<Arc<ListenerEntry>>> {
        let entries = self.slots.remove(event)?;
        self.order.retain(|name| name != event);
        Some(entries)
    }

    fn snapshot(&self) -> Vec<(EventName, Vec<Arc<ListenerEntry>>)> {
        self.order
            .iter()
            .filter_map(|event| {
                self.slots
                    .get(event)
                    .map(|entries| (event.clone(), entries.clone()))
            })
            .collect()
    }

    fn clear(&mut self) {
        self.order.clear();
        self.slots.clear();
    }
}

/// # EventEmitter
///
/// Registry of listeners keyed by event name, with a per-instance cap on the
/// number of listeners a single event may hold.
///
/// ## Example
///
/// ```rust
/// use event_emitter::{EventEmitter, Listener, Value};
///
/// # fn main() -> Result<(), event_emitter::EmitterError> {
/// let emitter = EventEmitter::new();
/// let listener = Listener::new(|_emitter, args| {
///     assert_eq!(args, &[Value::from(1)]);
///     Ok(())
/// });
///
/// emitter.on("data", &listener)?.once("data", &listener)?;
/// assert!(emitter.emit("data", &[Value::from(1)])?);
/// assert_eq!(emitter.listener_count("data"), 1);
/// # Ok(())
/// # }
/// ```
pub struct EventEmitter {
    state: Mutex<ListenerMap>,
}

impl EventEmitter {
    pub const DEFAULT_MAX_LISTENERS: usize = DEFAULT_MAX_LISTENERS;

    pub fn new() -> Self {
        Self {
            state: Mutex::new(ListenerMap::new(DEFAULT_MAX_LISTENERS)),
        }
    }

    pub fn with_max_listeners(max_listeners: usize) -> EmitterResult<Self> {
        validate_max_listeners(max_listeners)?;
        Ok(Self {
            state: Mutex::new(ListenerMap::new(max_listeners)),
        })
    }

    pub fn with_config(config: &EmitterConfig) -> EmitterResult<Self> {
        config.validate()?;
        Self::with_max_listeners(config.max_listeners)
    }

    /// Appends `listener` to the listeners of `event`.
    ///
    /// # Parameters
    ///
    /// * `event` - Name of the event slot
    /// * `listener` - Must be a [`Value::Function`]; anything else is rejected
    ///
    /// # Returns
    ///
    /// * `EmitterResult<&Self>` - The emitter itself, for chaining
    ///
    /// # Errors
    ///
    /// Returns [`EmitterError::Validation`] for a non-callable listener and
    /// [`EmitterError::Capacity`] when the event already holds
    /// [`max_listeners`](Self::max_listeners) listeners, unless the `error`
    /// event has listeners, in which case they receive the error instead.
    /// Errors returned by `newListener` or `error` listeners are propagated.
    pub fn on(
        &self,
        event: impl Into<EventName>,
        listener: impl Into<Value>,
    ) -> EmitterResult<&Self> {
        self.register(event.into(), listener.into(), Position::Append, false)
    }

    /// Alias of [`on`](Self::on).
    pub fn add_listener(
        &self,
        event: impl Into<EventName>,
        listener: impl Into<Value>,
    ) -> EmitterResult<&Self> {
        self.on(event, listener)
    }

    /// Like [`on`](Self::on), but the listener removes itself before its first
    /// invocation and is never called again.
    pub fn once(
        &self,
        event: impl Into<EventName>,
        listener: impl Into<Value>,
    ) -> EmitterResult<&Self> {
        self.register(event.into(), listener.into(), Position::Append, true)
    }

    /// Inserts `listener` in front of the listeners already registered for `event`.
    pub fn prepend_listener(
        &self,
        event: impl Into<EventName>,
        listener: impl Into<Value>,
    ) -> EmitterResult<&Self> {
        self.register(event.into(), listener.into(), Position::Prepend, false)
    }

    pub fn prepend_once_listener(
        &self,
        event: impl Into<EventName>,
        listener: impl Into<Value>,
    ) -> EmitterResult<&Self> {
        self.register(event.into(), listener.into(), Position::Prepend, true)
    }

    fn register(
        &self,
        event: EventName,
        listener: Value,
        position: Position,
        once: bool,
    ) -> EmitterResult<&Self> {
        let listener = match listener {
            Value::Function(listener) => listener,
            other => {
                return self.reject(EmitterError::Validation {
                    got: other.type_name().to_string(),
                })
            }
        };
        let entry = if once {
            ListenerEntry::once(event.clone(), listener)
        } else {
            ListenerEntry::Direct(listener)
        };
        self.insert(event, entry, position)
    }

    fn insert(
        &self,
        event: EventName,
        entry: ListenerEntry,
        position: Position,
    ) -> EmitterResult<&Self> {
        let rejected = self.state.lock().capacity_error(&event);
        if let Some(error) = rejected {
            return self.reject(error);
        }

        if self.has_listeners(&EventName::NewListener) {
            self.emit(
                EventName::NewListener,
                &[Value::from(&event), Value::from(entry.original())],
            )?;
        }

        // newListener handlers may have filled the slot in the meantime
        let rejected = {
            let mut state = self.state.lock();
            match state.capacity_error(&event) {
                Some(error) => Some(error),
                None => {
                    state.insert(event.clone(), entry, position);
                    None
                }
            }
        };
        if let Some(error) = rejected {
            return self.reject(error);
        }

        debug!("Registered listener for event: {} ({:?})", event, position);
        Ok(self)
    }

    fn reject(&self, error: EmitterError) -> EmitterResult<&Self> {
        if !error.is_registration_error() || !self.has_listeners(&EventName::Error) {
            warn!("Listener registration rejected: {}", error);
            return Err(error);
        }
        debug!("Redirecting registration failure to error listeners: {}", error);
        self.emit(EventName::Error, &[Value::Error(error)])?;
        Ok(self)
    }

    /// Calls every listener registered for `event`, in order, with `args`.
    ///
    /// The listener sequence is copied before the first call. Listeners added
    /// or removed while the pass runs take effect from the next emission on.
    ///
    /// # Returns
    ///
    /// * `Ok(false)` - No listeners were registered; nothing was called
    /// * `Ok(true)` - Every listener in the snapshot was called
    ///
    /// # Errors
    ///
    /// The first error returned by a listener. Listeners after it in the
    /// snapshot are not called.
    pub fn emit(&self, event: impl Into<EventName>, args: &[Value]) -> EmitterResult<bool> {
        let event = event.into();
        let snapshot: Vec<Listener> = {
            let state = self.state.lock();
            match state.slots.get(&event) {
                Some(entries) => entries.iter().map(|e| e.invoker().clone()).collect(),
                None => {
                    trace!("No listeners for event: {}", event);
                    return Ok(false);
                }
            }
        };

        trace!("Emitting event: {} to {} listeners", event, snapshot.len());
        for listener in snapshot {
            if let Err(e) = listener.call(self, args) {
                debug!("Listener for event {} failed, aborting emit: {}", event, e);
                return Err(e);
            }
        }
        Ok(true)
    }

    /// Removes the first registration matching `listener` from `event`.
    ///
    /// A registration matches when it is `listener` itself or a `once`
    /// registration of it. Unknown events and unknown listeners are ignored.
    /// `removeListener` listeners are notified before the registration is
    /// dropped. Only the registration found at the start of the call is
    /// removed; if a notified handler already removed it, nothing else is.
    pub fn remove_listener(
        &self,
        event: impl Into<EventName>,
        listener: &Listener,
    ) -> EmitterResult<&Self> {
        let event = event.into();
        let target = {
            let state = self.state.lock();
            match state.find(&event, listener) {
                Some(entry) => entry.clone(),
                None => return Ok(self),
            }
        };

        if self.has_listeners(&EventName::RemoveListener) {
            self.emit(
                EventName::RemoveListener,
                &[Value::from(&event), Value::from(target.original())],
            )?;
        }

        if self.state.lock().remove_entry(&event, &target).is_some() {
            debug!("Removed listener for event: {}", event);
        }
        Ok(self)
    }

    /// Removes every listener of `event`, or of all events when `None`.
    ///
    /// When `removeListener` has listeners, they are notified once per removed
    /// registration (with the original listener) before anything is dropped.
    pub fn remove_all_listeners(&self, event: Option<EventName>) -> EmitterResult<&Self> {
        match event {
            Some(event) => {
                let entries = match self.state.lock().slots.get(&event) {
                    Some(entries) => entries.clone(),
                    None => return Ok(self),
                };
                if self.has_listeners(&EventName::RemoveListener) {
                    self.notify_removed(&event, &entries)?;
                }
                self.state.lock().remove_slot(&event);
                debug!("Removed all listeners for event: {}", event);
            }
            None => {
                let slots = self.state.lock().snapshot();
                if self.has_listeners(&EventName::RemoveListener) {
                    for (event, entries) in &slots {
                        self.notify_removed(event, entries)?;
                    }
                }
                self.state.lock().clear();
                debug!("Removed all listeners of {} events", slots.len());
            }
        }
        Ok(self)
    }

    fn notify_removed(
        &self,
        event: &EventName,
        entries: &[Arc<ListenerEntry>],
    ) -> EmitterResult<()> {
        for entry in entries {
            self.emit(
                EventName::RemoveListener,
                &[Value::from(event), Value::from(entry.original())],
            )?;
        }
        Ok(())
    }

    /// Changes the cap for future registrations. Existing sequences longer
    /// than `n` are kept as they are.
    pub fn set_max_listeners(&self, n: usize) -> EmitterResult<&Self> {
        validate_max_listeners(n)?;
        self.state.lock().max_listeners = n;
        debug!("Max listeners set to {}", n);
        Ok(self)
    }

    pub fn max_listeners(&self) -> usize {
        self.state.lock().max_listeners
    }

    pub fn listener_count(&self, event: impl Into<EventName>) -> usize {
        self.state.lock().count(&event.into())
    }

    /// Copies of the listeners registered for `event`. `once` registrations
    /// are reported as the original listener.
    pub fn listeners(&self, event: impl Into<EventName>) -> Vec<Listener> {
        self.state
            .lock()
            .slots
            .get(&event.into())
            .map(|entries| entries.iter().map(|e| e.original().clone()).collect())
            .unwrap_or_default()
    }

    /// Events with at least one listener, in the order their slots were created.
    pub fn event_names(&self) -> Vec<EventName> {
        self.state.lock().order.clone()
    }

    fn has_listeners(&self, event: &EventName) -> bool {
        self.state.lock().slots.contains_key(event)
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        let events: Vec<(&str, usize)> = state
            .order
            .iter()
            .map(|event| (event.as_str(), state.count(event)))
            .collect();
        f.debug_struct("EventEmitter")
            .field("events", &events)
            .field("max_listeners", &state.max_listeners)
            .finish()
    }
}
