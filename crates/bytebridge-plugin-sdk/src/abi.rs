//! The raw cross-module ABI shared by the host and every plugin
//!
//! This is the only layout both sides must agree on: a well-known entrypoint
//! symbol, a `#[repr(C)]` registration context, and a registration function
//! pointer. Everything else (the [`Processor`] trait object behind
//! [`RawProcessor`]) stays opaque to the boundary; only a pointer crosses.
//!
//! Both sides must be built with the same Rust toolchain, since the processor
//! trait object itself is not ABI-stable. The version field exists to reject
//! plugins built against a different contract revision before anything else
//! in the context is read.

use std::os::raw::{c_char, c_void};

use crate::traits::Processor;

/// Current ABI revision. Bump on any change to [`RawRegistrationContext`]
/// or to the entrypoint signature.
pub const ABI_VERSION: u32 = 1;

/// Name of the registration entrypoint every plugin module must export.
pub const ENTRYPOINT_NAME: &str = "bytebridge_register_processors";

/// Entrypoint symbol as a NUL-terminated byte string, for symbol resolution.
pub const ENTRYPOINT_SYMBOL: &[u8] = b"bytebridge_register_processors\0";

/// Signature of the exported plugin entrypoint.
pub type PluginEntrypoint = unsafe extern "C" fn(*mut RawRegistrationContext);

/// Signature of the host's registration callback.
///
/// `registry` is the opaque host-side registry pointer from the context,
/// `name` is a NUL-terminated service name, and `processor` transfers
/// ownership of a [`RawProcessor`] to the host. After the call the plugin
/// must not touch the processor again.
pub type RegisterFn =
    unsafe extern "C" fn(registry: *mut c_void, name: *const c_char, processor: *mut RawProcessor);

/// The registration context passed to a plugin's entrypoint.
///
/// `abi_version` is deliberately the first field: a plugin checks it before
/// reading anything else, so a layout mismatch in later fields can be
/// detected instead of dereferenced.
#[repr(C)]
pub struct RawRegistrationContext {
    /// ABI revision the host was built against. Must equal [`ABI_VERSION`].
    pub abi_version: u32,
    /// Opaque pointer to the host's processor registry.
    pub registry: *mut c_void,
    /// Host callback that takes ownership of a processor.
    pub register: RegisterFn,
}

/// Owned processor as it crosses the module boundary.
///
/// The struct is opaque to the ABI; only `*mut RawProcessor` is ever passed.
/// The host reclaims it with `Box::from_raw` and takes the inner trait
/// object, the plugin creates it through
/// [`OwnedProcessorHandle`](crate::OwnedProcessorHandle).
pub struct RawProcessor(pub Box<dyn Processor>);
