//! # event-emitter: Synchronous Publish/Subscribe Registry
//!
//! Listeners are registered against event names and later invoked, in order and
//! on the calling thread, when the event is emitted.
//!
//! ## Components
//!
//! - Registry ([`emitter`]): storage, ordering, capacity and removal
//! - Listeners ([`listener`]): identity-compared handles to callables
//! - Event vocabulary ([`event`]): event names and dynamic argument values
//! - Configuration ([`config`]) and errors ([`error`])
//!
//! ## Delivery Model
//!
//! ```text
//! emit(event, args)
//!   │
//!   ├─ lock ─ copy listener sequence ─ unlock
//!   │
//!   └─ for each listener in the copy: listener(emitter, args)?
//! ```
//!
//! Everything runs to completion before `emit` returns. There is no queueing,
//! no background dispatch and no persistence of registrations.
//!
//! A listener that returns `Err` stops the emission in progress. Listeners
//! after it are skipped for that pass and the error is returned from `emit`.
//! Nothing already done by earlier listeners is undone.
//!
//! ## Capacity
//!
//! Each emitter caps the number of listeners per event
//! ([`DEFAULT_MAX_LISTENERS`] unless configured). Exceeding the cap is a
//! registration failure, routed like any other (see [`emitter`]).

pub mod config;
pub mod emitter;
pub mod error;
pub mod event;
pub mod listener;

// Re-exports
pub use config::{EmitterConfig, DEFAULT_MAX_LISTENERS};
pub use emitter::EventEmitter;
pub use error::*;
pub use event::{event_name::EventName, value::Value};
pub use listener::{Handler, Listener};
