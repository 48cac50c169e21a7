//! Bus - Type-Safe Resource Injection
//!
//! The Bus carries the resources a circuit run needs (settings, backend
//! handles, the clock) keyed by their type. No string keys.

use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Type-keyed resource container (TypeMap pattern).
#[derive(Default)]
pub struct Bus {
    resources: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Bus {
    pub fn new() -> Self {
        Bus {
            resources: HashMap::new(),
        }
    }

    /// Builder-style insert.
    pub fn with<T: Send + Sync + 'static>(mut self, resource: T) -> Self {
        self.insert(resource);
        self
    }

    /// Insert a resource, replacing any previous value of the same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, resource: T) {
        self.resources.insert(TypeId::of::<T>(), Box::new(resource));
    }

    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.resources
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref())
    }

    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.resources
            .get_mut(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_mut())
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.resources.contains_key(&TypeId::of::<T>())
    }

    pub fn remove<T: 'static>(&mut self) -> Option<T> {
        self.resources
            .remove(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast().ok())
            .map(|boxed| *boxed)
    }
}

impl std::fmt::Debug for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bus")
            .field("resource_count", &self.resources.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    #[test]
    fn test_insert_and_get() {
        let bus = Bus::new()
            .with(Settings::new("Mesa", "+1"))
            .with(42u32);

        assert_eq!(bus.get::<u32>(), Some(&42));
        assert_eq!(bus.get::<Settings>().map(|s| s.business_name.as_str()), Some("Mesa"));
        assert!(bus.get::<String>().is_none());
    }

    #[test]
    fn test_replace_and_remove() {
        let mut bus = Bus::new();
        bus.insert(1u8);
        bus.insert(2u8);
        if let Some(v) = bus.get_mut::<u8>() {
            *v += 1;
        }
        assert_eq!(bus.remove::<u8>(), Some(3));
        assert!(!bus.contains::<u8>());
    }
}
