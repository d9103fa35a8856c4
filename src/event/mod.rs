//! # Events
//!
//! Vocabulary shared by the emitter and its listeners: the names of event slots
//! and the dynamic values passed to listeners.
//!
//! ## Reserved Event Names
//!
//! Three names are ordinary slots that the emitter also consults:
//!
//! - **error**: receives registration failures ([`crate::EmitterError::Validation`],
//!   [`crate::EmitterError::Capacity`]) when it has at least one listener
//! - **newListener**: notified with `(event, listener)` before a listener is added
//! - **removeListener**: notified with `(event, listener)` before a listener is removed
//!
//! ## Registration Flow
//!
//! ```text
//! ┌────────┐   ┌──────────┐   ┌──────────┐   ┌─────────────┐   ┌────────┐
//! │ on(..) │──▶│ callable?│──▶│ capacity?│──▶│ newListener │──▶│ insert │
//! └────────┘   └────┬─────┘   └────┬─────┘   └─────────────┘   └────────┘
//!                   │ no           │ full
//!                   ▼              ▼
//!             ┌──────────────────────────┐
//!             │ emit("error") or Err(..) │
//!             └──────────────────────────┘
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use event_emitter::{EventEmitter, EventName, Listener, Value};
//!
//! # fn main() -> Result<(), event_emitter::EmitterError> {
//! let emitter = EventEmitter::new();
//! emitter.on(
//!     EventName::NewListener,
//!     Listener::new(|_, args| {
//!         println!("adding listener for {:?}", args[0]);
//!         Ok(())
//!     }),
//! )?;
//! emitter.on("tick", Listener::new(|_, _| Ok(())))?;
//!
//! assert_eq!(emitter.event_names(), vec![EventName::NewListener, EventName::from("tick")]);
//! # Ok(())
//! # }
//! ```

pub mod event_name;
pub mod value;
