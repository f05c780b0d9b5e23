use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::DuplicateHandler;

type Handler<R> = Box<dyn Fn() -> R + Send + Sync>;
type Fallback<K, R> = Box<dyn Fn(&K) -> R + Send + Sync>;
type Handler1<A, R> = Box<dyn Fn(A) -> R + Send + Sync>;
type Fallback1<K, A, R> = Box<dyn Fn(&K, A) -> R + Send + Sync>;

// ---------------------------------------------------------------------------
// ValueDispatcher
// ---------------------------------------------------------------------------

/// Calls a per-value handler, or the fallback for values without one.
///
/// ```
/// use rsy_dispatch::ValueDispatcher;
///
/// let mut d = ValueDispatcher::new(|v: &u8| format!("other {v}"));
/// d.register(1, || "one".to_string()).unwrap();
/// assert_eq!(d.call(&1), "one");
/// assert_eq!(d.call(&7), "other 7");
/// ```
pub struct ValueDispatcher<K, R> {
    fallback: Fallback<K, R>,
    handlers: BTreeMap<K, Handler<R>>,
}

impl<K: Ord + Debug, R> ValueDispatcher<K, R> {
    pub fn new(fallback: impl Fn(&K) -> R + Send + Sync + 'static) -> Self {
        Self {
            fallback: Box::new(fallback),
            handlers: BTreeMap::new(),
        }
    }

    pub fn register(
        &mut self,
        key: K,
        handler: impl Fn() -> R + Send + Sync + 'static,
    ) -> Result<(), DuplicateHandler> {
        if self.handlers.contains_key(&key) {
            return Err(DuplicateHandler {
                key: format!("{key:?}"),
            });
        }
        self.handlers.insert(key, Box::new(handler));
        Ok(())
    }

    pub fn call(&self, key: &K) -> R {
        match self.handlers.get(key) {
            Some(h) => h(),
            None => (self.fallback)(key),
        }
    }

    pub fn is_registered(&self, key: &K) -> bool {
        self.handlers.contains_key(key)
    }
}

// ---------------------------------------------------------------------------
// ValueDispatcher1Arg
// ---------------------------------------------------------------------------

/// [`ValueDispatcher`] whose handlers also receive one argument.
pub struct ValueDispatcher1Arg<K, A, R> {
    fallback: Fallback1<K, A, R>,
    handlers: BTreeMap<K, Handler1<A, R>>,
}

impl<K: Ord + Debug, A, R> ValueDispatcher1Arg<K, A, R> {
    pub fn new(fallback: impl Fn(&K, A) -> R + Send + Sync + 'static) -> Self {
        Self {
            fallback: Box::new(fallback),
            handlers: BTreeMap::new(),
        }
    }

    pub fn register(
        &mut self,
        key: K,
        handler: impl Fn(A) -> R + Send + Sync + 'static,
    ) -> Result<(), DuplicateHandler> {
        if self.handlers.contains_key(&key) {
            return Err(DuplicateHandler {
                key: format!("{key:?}"),
            });
        }
        self.handlers.insert(key, Box::new(handler));
        Ok(())
    }

    pub fn call(&self, key: &K, arg: A) -> R {
        match self.handlers.get(key) {
            Some(h) => h(arg),
            None => (self.fallback)(key, arg),
        }
    }

    pub fn is_registered(&self, key: &K) -> bool {
        self.handlers.contains_key(key)
    }
}
