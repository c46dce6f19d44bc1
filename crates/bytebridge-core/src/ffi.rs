//! The narrow unsafe boundary around dynamic loading
//!
//! Everything raw lives here: resolving the entrypoint symbol, building the
//! `#[repr(C)]` registration context, and the `extern "C"` trampoline that
//! converts a plugin's raw registration call back into safe owned types.
//! Nothing above this module knows that dynamic loading occurred.

use std::ffi::CStr;
use std::os::raw::{c_char, c_void};
use std::sync::Arc;

use bytebridge_plugin_sdk::abi::{
    ABI_VERSION, ENTRYPOINT_SYMBOL, PluginEntrypoint, RawProcessor, RawRegistrationContext,
};
use libloading::Library;
use tracing::warn;

use crate::registry::ProcessorRegistry;

/// Resolve the well-known registration entrypoint in a loaded module.
pub(crate) fn resolve_entrypoint(
    library: &Library,
) -> Result<PluginEntrypoint, libloading::Error> {
    // Copy the function pointer out of the Symbol; the caller keeps the
    // Library alive for as long as the pointer may be called.
    let symbol = unsafe { library.get::<PluginEntrypoint>(ENTRYPOINT_SYMBOL)? };
    Ok(*symbol)
}

/// Invoke a plugin entrypoint with a freshly built registration context
/// bound to `registry`.
///
/// The context lives only for this call; the registry pointer inside it is
/// kept valid by the `Arc` the caller holds.
pub(crate) fn invoke_entrypoint(entry: PluginEntrypoint, registry: &Arc<ProcessorRegistry>) {
    let mut context = RawRegistrationContext {
        abi_version: ABI_VERSION,
        registry: Arc::as_ptr(registry) as *mut c_void,
        register: register_trampoline,
    };
    unsafe { entry(&mut context) }
}

/// Host-side registration callback handed to plugins.
///
/// Reclaims ownership of the processor immediately, before any validation,
/// so a bad name can never leak the allocation.
unsafe extern "C" fn register_trampoline(
    registry: *mut c_void,
    name: *const c_char,
    processor: *mut RawProcessor,
) {
    if processor.is_null() {
        warn!("Plugin passed a null processor; ignoring registration");
        return;
    }
    let processor = unsafe { Box::from_raw(processor) };

    if registry.is_null() || name.is_null() {
        warn!("Plugin passed a null registry or service name; dropping processor");
        return;
    }
    let name = unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned();

    let registry = unsafe { &*(registry as *const ProcessorRegistry) };
    registry.register(name, processor.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytebridge_plugin_sdk::error::Result;
    use bytebridge_plugin_sdk::{OwnedProcessorHandle, Processor, RegistrationContext};

    struct Echo;

    impl Processor for Echo {
        fn execute(&self, request: &[u8]) -> Result<Vec<u8>> {
            Ok(request.to_vec())
        }
    }

    // Exercises the same trampoline path a real plugin entrypoint takes,
    // minus the dlopen.
    #[test]
    fn trampoline_registers_into_registry() {
        let registry = Arc::new(ProcessorRegistry::new());
        let mut raw = RawRegistrationContext {
            abi_version: ABI_VERSION,
            registry: Arc::as_ptr(&registry) as *mut c_void,
            register: register_trampoline,
        };

        let mut ctx = unsafe { RegistrationContext::from_raw(&mut raw) }.unwrap();
        ctx.register("echo", OwnedProcessorHandle::new(Echo))
            .unwrap();

        let processor = registry.lookup("echo").unwrap();
        assert_eq!(processor.execute(b"hello").unwrap(), b"hello");
    }
}
