//! rsy-dispatch
//!
//! Handler registries keyed by value or by runtime type.
//!
//! Architectural decisions:
//! - Explicit registration at construction time, no global tables
//! - Every dispatcher has a default handler for unregistered keys
//! - Registering the same key twice is an error, never an overwrite

mod by_type;
mod by_value;

pub use by_type::TypeDispatcher;
pub use by_value::{ValueDispatcher, ValueDispatcher1Arg};

/// A handler was already registered for this key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateHandler {
    /// Debug rendering of the key (or the type name for type dispatch).
    pub key: String,
}

impl std::fmt::Display for DuplicateHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "duplicate handler registered for {}", self.key)
    }
}

impl std::error::Error for DuplicateHandler {}
