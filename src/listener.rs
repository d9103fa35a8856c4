//! # Listeners
//!
//! A [`Listener`] is a shared handle to a [`Handler`]. Handles are cheap to
//! clone and compare by reference identity only: two closures with identical
//! bodies are still different listeners, and removing one never touches the
//! other.
//!
//! Internally every registration is stored as a [`ListenerEntry`]. Entries
//! created by `once` keep the adapter that is actually invoked together with
//! the original listener, so identity lookups can match either one.

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Weak,
    },
};

use crate::{emitter::EventEmitter, error::EmitterResult, event::event_name::EventName, Value};

/// Callable invoked by [`EventEmitter::emit`].
///
/// The emitter that is delivering the event is passed as the invocation
/// context, so handlers can register or remove listeners while they run.
/// Returning `Err` stops the current emission; remaining listeners are skipped.
pub trait Handler: Send + Sync {
    fn call(&self, emitter: &EventEmitter, args: &[Value]) -> EmitterResult<()>;
}

impl<F> Handler for F
where
    F: Fn(&EventEmitter, &[Value]) -> EmitterResult<()> + Send + Sync,
{
    fn call(&self, emitter: &EventEmitter, args: &[Value]) -> EmitterResult<()> {
        self(emitter, args)
    }
}

#[derive(Clone)]
pub struct Listener(Arc<dyn Handler>);

impl Listener {
    /// # Example
    ///
    /// ```rust
    /// use event_emitter::{EventEmitter, Listener};
    ///
    /// let emitter = EventEmitter::new();
    /// let listener = Listener::new(|_emitter, args| {
    ///     println!("received {:?}", args);
    ///     Ok(())
    /// });
    /// emitter.on("data", &listener).unwrap();
    /// assert_eq!(emitter.listener_count("data"), 1);
    /// ```
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&EventEmitter, &[Value]) -> EmitterResult<()> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn from_handler<H: Handler + 'static>(handler: H) -> Self {
        Self(Arc::new(handler))
    }

    pub fn call(&self, emitter: &EventEmitter, args: &[Value]) -> EmitterResult<()> {
        self.0.call(emitter, args)
    }

    /// Reference identity. Only the data pointer is compared.
    pub fn same(&self, other: &Listener) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}

/// Stored registration.
#[derive(Clone, Debug)]
pub(crate) enum ListenerEntry {
    Direct(Listener),
    Once { adapter: Listener, original: Listener },
}

impl ListenerEntry {
    pub(crate) fn once(event: EventName, original: Listener) -> Self {
        let adapter: Arc<OnceAdapter> = Arc::new_cyclic(|this| OnceAdapter {
            event,
            original: original.clone(),
            fired: AtomicBool::new(false),
            this: this.clone(),
        });
        ListenerEntry::Once {
            adapter: Listener(adapter),
            original,
        }
    }

    /// What `emit` calls.
    pub(crate) fn invoker(&self) -> &Listener {
        match self {
            ListenerEntry::Direct(listener) => listener,
            ListenerEntry::Once { adapter, .. } => adapter,
        }
    }

    /// What callers registered.
    pub(crate) fn original(&self) -> &Listener {
        match self {
            ListenerEntry::Direct(listener) => listener,
            ListenerEntry::Once { original, .. } => original,
        }
    }

    pub(crate) fn matches(&self, listener: &Listener) -> bool {
        self.invoker().same(listener) || self.original().same(listener)
    }
}

/// Removes its own entry, then forwards to the original listener.
struct OnceAdapter {
    event: EventName,
    original: Listener,
    fired: AtomicBool,
    this: Weak<OnceAdapter>,
}

impl Handler for OnceAdapter {
    fn call(&self, emitter: &EventEmitter, args: &[Value]) -> EmitterResult<()> {
        // an outer snapshot may still hold this adapter after a nested emit fired it
        if self
            .fired
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(());
        }
        if let Some(this) = self.this.upgrade() {
            if let Err(e) = emitter.remove_listener(&self.event, &Listener(this)) {
                // still registered, so the next emission retries
                self.fired.store(false, Ordering::SeqCst);
                return Err(e);
            }
        }
        self.original.call(emitter, args)
    }
}
