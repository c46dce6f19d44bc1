//! Processor registry mapping service names to processors
//!
//! The registry owns every processor a plugin hands over at registration
//! time and keeps it alive until [`ProcessorRegistry::clear`].

use std::collections::HashMap;
use std::sync::Arc;

use bytebridge_plugin_sdk::Processor;
use parking_lot::RwLock;
use tracing::{debug, info};

/// Process-wide mapping from service name to processor.
///
/// Constructed once at startup and shared via `Arc`; concurrent lookups are
/// cheap read-lock acquisitions, and late registrations take the write lock
/// without invalidating processors already handed out to in-flight
/// dispatches.
#[derive(Default)]
pub struct ProcessorRegistry {
    /// Registered processors by service name
    processors: RwLock<HashMap<String, Arc<dyn Processor>>>,
}

impl ProcessorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a processor under `name`, taking ownership of it.
    ///
    /// Names are case-sensitive and not validated; registering an existing
    /// name replaces the previous processor (last write wins, no error).
    pub fn register(&self, name: impl Into<String>, processor: Box<dyn Processor>) {
        let name = name.into();
        let replaced = self
            .processors
            .write()
            .insert(name.clone(), Arc::from(processor))
            .is_some();
        if replaced {
            info!("Re-registered service: {} (previous processor dropped)", name);
        } else {
            info!("Registered service: {}", name);
        }
    }

    /// Look up the processor for `name`.
    ///
    /// Returns a clone of the owning `Arc` so callers can execute the
    /// processor without holding any registry lock.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Processor>> {
        self.processors.read().get(name).cloned()
    }

    /// Remove all entries, releasing the registry's ownership of every
    /// processor. Does not unload any module; the loader must be torn down
    /// separately, and only after this call.
    pub fn clear(&self) {
        let mut processors = self.processors.write();
        debug!("Clearing registry ({} services)", processors.len());
        processors.clear();
    }

    /// Number of registered services
    pub fn len(&self) -> usize {
        self.processors.read().len()
    }

    /// Whether the registry holds no services
    pub fn is_empty(&self) -> bool {
        self.processors.read().is_empty()
    }

    /// Names of all registered services, in arbitrary order
    pub fn service_names(&self) -> Vec<String> {
        self.processors.read().keys().cloned().collect()
    }
}
