//! bytebridge Plugin SDK
//!
//! This crate provides the SDK for building bytebridge plugins as native
//! shared modules. A plugin implements [`Processor`] for each service it
//! offers, then exports the registration entrypoint with
//! [`export_plugin!`]. The host scans a directory at startup, resolves the
//! entrypoint in every shared module it finds, and invokes it once with a
//! [`RegistrationContext`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use bytebridge_plugin_sdk::prelude::*;
//!
//! struct EchoProcessor;
//!
//! impl Processor for EchoProcessor {
//!     fn execute(&self, request: &[u8]) -> Result<Vec<u8>> {
//!         Ok(request.to_vec())
//!     }
//! }
//!
//! fn init(ctx: &mut RegistrationContext) {
//!     // "echo" is NUL-free, so registration cannot fail here.
//!     let _ = ctx.register("echo", OwnedProcessorHandle::new(EchoProcessor));
//! }
//!
//! bytebridge_plugin_sdk::export_plugin!(init);
//! ```
//!
//! A plugin may register any number of services from one entrypoint
//! invocation. Once a handle has been passed to
//! [`RegistrationContext::register`] the host owns the processor; the move
//! semantics of [`OwnedProcessorHandle`] make retaining or re-registering it
//! impossible.

pub mod abi;
pub mod error;
pub mod prelude;
pub mod registration;
pub mod traits;

// Re-exports
pub use abi::{ABI_VERSION, ENTRYPOINT_NAME, ENTRYPOINT_SYMBOL};
pub use error::{ProcessorError, RegistrationError, Result};
pub use registration::{OwnedProcessorHandle, RegistrationContext};
pub use traits::Processor;

/// Export a plugin registration entrypoint.
///
/// Generates the `bytebridge_register_processors` symbol the host resolves
/// (the name must stay in sync with [`ENTRYPOINT_NAME`]). The generated
/// entrypoint validates the context's ABI version before anything else and
/// registers nothing on a mismatch, and a panic inside the init function is
/// caught rather than unwound into the host.
///
/// # Example
///
/// ```rust,ignore
/// fn init(ctx: &mut RegistrationContext) {
///     let _ = ctx.register("my-service", OwnedProcessorHandle::new(MyProcessor));
/// }
///
/// bytebridge_plugin_sdk::export_plugin!(init);
/// ```
#[macro_export]
macro_rules! export_plugin {
    ($init:path) => {
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn bytebridge_register_processors(
            raw: *mut $crate::abi::RawRegistrationContext,
        ) {
            // Null context or ABI mismatch: register nothing.
            let Some(mut ctx) = (unsafe { $crate::RegistrationContext::from_raw(raw) }) else {
                return;
            };
            let init: fn(&mut $crate::RegistrationContext) = $init;
            let _ = ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| {
                init(&mut ctx);
            }));
        }
    };
}
