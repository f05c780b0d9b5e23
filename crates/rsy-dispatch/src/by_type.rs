use std::any::{type_name, Any, TypeId};
use std::collections::BTreeMap;

use crate::DuplicateHandler;

type Erased<C, R> = Box<dyn Fn(&mut C, &dyn Any) -> R + Send + Sync>;

/// Dispatches a type-erased message to the handler registered for its
/// concrete type, passing a mutable context alongside.
///
/// Messages of unregistered types go to the fallback.
pub struct TypeDispatcher<C, R> {
    fallback: Erased<C, R>,
    handlers: BTreeMap<TypeId, Erased<C, R>>,
}

impl<C: 'static, R: 'static> TypeDispatcher<C, R> {
    pub fn new(fallback: impl Fn(&mut C, &dyn Any) -> R + Send + Sync + 'static) -> Self {
        Self {
            fallback: Box::new(fallback),
            handlers: BTreeMap::new(),
        }
    }

    pub fn register<T: Any>(
        &mut self,
        handler: impl Fn(&mut C, &T) -> R + Send + Sync + 'static,
    ) -> Result<(), DuplicateHandler> {
        let id = TypeId::of::<T>();
        if self.handlers.contains_key(&id) {
            return Err(DuplicateHandler {
                key: type_name::<T>().to_string(),
            });
        }
        let erased = move |ctx: &mut C, msg: &dyn Any| match msg.downcast_ref::<T>() {
            Some(m) => handler(ctx, m),
            None => unreachable!("handler keyed by TypeId received another type"),
        };
        self.handlers.insert(id, Box::new(erased));
        Ok(())
    }

    pub fn dispatch(&self, ctx: &mut C, msg: &dyn Any) -> R {
        match self.handlers.get(&Any::type_id(msg)) {
            Some(h) => h(ctx, msg),
            None => (self.fallback)(ctx, msg),
        }
    }

    pub fn handles<T: Any>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<T>())
    }
}
