//! The host facade wiring registry, loader, and dispatcher together
//!
//! This is the surface a binding layer consumes: `initialize`, `dispatch`,
//! `shutdown`. Components are explicit objects owned by the [`Bridge`] and
//! injected into each other; there is no process-global state.

use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::info;

use crate::config::BridgeConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{BridgeError, Result};
use crate::loader::{LoadReport, PluginLoader};
use crate::registry::ProcessorRegistry;

/// Lifecycle state of the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BridgeState {
    /// Constructed, load phase not yet run
    Created,
    /// Load phase completed; dispatching is allowed
    Ready,
    /// Torn down; all dispatches fail with `NotInitialized`
    ShutDown,
}

/// The RPC dispatch hub.
///
/// Constructed once at process start. `initialize` runs the plugin load
/// phase exactly once; `dispatch` is then safe from any number of threads.
/// Shutdown is cooperative: the caller stops issuing dispatches and drains
/// in-flight ones before calling [`Bridge::shutdown`] — no cancellation is
/// imposed on a running processor, and no timeout bounds `execute`.
pub struct Bridge {
    registry: Arc<ProcessorRegistry>,
    dispatcher: Dispatcher,
    loader: Mutex<PluginLoader>,
    state: RwLock<BridgeState>,
}

impl Bridge {
    /// Create an uninitialized bridge with an empty registry
    pub fn new() -> Self {
        let registry = Arc::new(ProcessorRegistry::new());
        Self {
            dispatcher: Dispatcher::new(registry.clone()),
            registry,
            loader: Mutex::new(PluginLoader::new()),
            state: RwLock::new(BridgeState::Created),
        }
    }

    /// Create a bridge and run the load phase from `config`
    pub fn from_config(config: &BridgeConfig) -> Result<(Self, LoadReport)> {
        let bridge = Self::new();
        let report = bridge.initialize(&config.plugin_dir)?;
        Ok((bridge, report))
    }

    /// Run the plugin load phase against `plugin_dir`.
    ///
    /// Idempotent: repeat calls (from any thread) do not rescan and return
    /// an empty report; concurrent calls serialize on the loader. A missing
    /// directory counts as a successful load of zero plugins. After a
    /// shutdown the bridge stays shut down; initialize does not revive it.
    pub fn initialize(&self, plugin_dir: &Path) -> Result<LoadReport> {
        let mut loader = self.loader.lock();
        let report = loader.load_all(plugin_dir, &self.registry);

        let mut state = self.state.write();
        if *state == BridgeState::Created {
            *state = BridgeState::Ready;
            info!(
                "Bridge initialized: {} service(s) available",
                self.registry.len()
            );
        }
        Ok(report)
    }

    /// Route one encoded request to the processor for `service`.
    ///
    /// Fails with [`BridgeError::NotInitialized`] before `initialize` has
    /// completed or after `shutdown`, with [`BridgeError::ServiceNotFound`]
    /// for an unknown name, and with [`BridgeError::ProcessingFailed`] when
    /// the processor faults. The returned buffer is owned by the caller.
    pub fn dispatch(&self, service: &str, request: &[u8]) -> Result<Vec<u8>> {
        if *self.state.read() != BridgeState::Ready {
            return Err(BridgeError::NotInitialized);
        }
        self.dispatcher.dispatch(service, request)
    }

    /// Tear down: refuse new dispatches, clear the registry, then unload
    /// every plugin module — strictly in that order, so no module is
    /// released while a processor it produced is still registered.
    ///
    /// The caller must have drained in-flight dispatches first. Idempotent.
    pub fn shutdown(&self) {
        let mut loader = self.loader.lock();
        {
            let mut state = self.state.write();
            if *state == BridgeState::ShutDown {
                return;
            }
            *state = BridgeState::ShutDown;
        }

        self.registry.clear();
        loader.unload_all();
        info!("Bridge shut down");
    }

    /// Whether the bridge currently accepts dispatches
    pub fn is_ready(&self) -> bool {
        *self.state.read() == BridgeState::Ready
    }

    /// The shared registry, for host-side (late) registrations
    pub fn registry(&self) -> &Arc<ProcessorRegistry> {
        &self.registry
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytebridge_plugin_sdk::Processor;
    use tempfile::tempdir;

    struct Echo;

    impl Processor for Echo {
        fn execute(&self, request: &[u8]) -> bytebridge_plugin_sdk::Result<Vec<u8>> {
            Ok(request.to_vec())
        }
    }

    #[test]
    fn dispatch_before_initialize_is_not_initialized() {
        let bridge = Bridge::new();
        let err = bridge.dispatch("echo", b"hi").unwrap_err();
        assert!(matches!(err, BridgeError::NotInitialized));
    }

    #[test]
    fn initialize_on_missing_directory_succeeds_empty() {
        let temp = tempdir().unwrap();
        let bridge = Bridge::new();
        let report = bridge.initialize(&temp.path().join("no-plugins")).unwrap();
        assert!(report.loaded.is_empty());
        assert!(bridge.is_ready());
        assert!(bridge.registry().is_empty());
    }

    #[test]
    fn initialize_is_idempotent() {
        let temp = tempdir().unwrap();
        let bridge = Bridge::new();
        bridge.initialize(temp.path()).unwrap();
        bridge.registry().register("echo", Box::new(Echo));

        // A second initialize must not rescan or disturb the registry.
        let report = bridge.initialize(temp.path()).unwrap();
        assert!(report.loaded.is_empty());
        assert_eq!(bridge.registry().len(), 1);
        assert_eq!(bridge.dispatch("echo", b"still here").unwrap(), b"still here");
    }

    #[test]
    fn shutdown_clears_registry_and_blocks_dispatch() {
        let temp = tempdir().unwrap();
        let bridge = Bridge::new();
        bridge.initialize(temp.path()).unwrap();
        bridge.registry().register("echo", Box::new(Echo));
        assert_eq!(bridge.dispatch("echo", b"hello").unwrap(), b"hello");

        bridge.shutdown();
        assert!(!bridge.is_ready());
        assert!(bridge.registry().is_empty());
        let err = bridge.dispatch("echo", b"hello").unwrap_err();
        assert!(matches!(err, BridgeError::NotInitialized));

        // Idempotent.
        bridge.shutdown();
    }

    #[test]
    fn initialize_after_shutdown_does_not_revive() {
        let temp = tempdir().unwrap();
        let bridge = Bridge::new();
        bridge.initialize(temp.path()).unwrap();
        bridge.shutdown();

        bridge.initialize(temp.path()).unwrap();
        assert!(!bridge.is_ready());
        assert!(matches!(
            bridge.dispatch("echo", b"hi").unwrap_err(),
            BridgeError::NotInitialized
        ));
    }
}
