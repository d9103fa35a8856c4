use std::{
    fmt,
    hash::{Hash, Hasher},
};

/// Identifier of an event slot.
///
/// Three identifiers are consulted by the emitter itself; everything else is an
/// opaque `Custom` name. [`EventName::new`] and the `From` conversions always
/// prefer the reserved variants, so `"error"` never ends up as
/// `Custom("error")`. Equality and hashing use the textual form either way.
#[derive(Debug, Clone, strum::EnumIs)]
pub enum EventName {
    /// Receives registration failures when at least one listener is present.
    Error,
    /// Notified before a listener is added.
    NewListener,
    /// Notified before a listener is removed.
    RemoveListener,
    Custom(String),
}

impl EventName {
    pub fn new<S: AsRef<str>>(name: S) -> Self {
        match name.as_ref() {
            "error" => EventName::Error,
            "newListener" => EventName::NewListener,
            "removeListener" => EventName::RemoveListener,
            other => EventName::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventName::Error => "error",
            EventName::NewListener => "newListener",
            EventName::RemoveListener => "removeListener",
            EventName::Custom(name) => name,
        }
    }

    pub fn is_reserved(&self) -> bool {
        // a hand-built Custom("error") still names the reserved slot
        !EventName::new(self.as_str()).is_custom()
    }
}

// Slots are keyed by their textual form.
impl PartialEq for EventName {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for EventName {}

impl Hash for EventName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EventName {
    fn from(name: &str) -> Self {
        EventName::new(name)
    }
}

impl From<String> for EventName {
    fn from(name: String) -> Self {
        EventName::new(name)
    }
}

impl From<&String> for EventName {
    fn from(name: &String) -> Self {
        EventName::new(name)
    }
}

impl From<&EventName> for EventName {
    fn from(name: &EventName) -> Self {
        name.clone()
    }
}
