//! Safe plugin-side wrappers over the raw registration ABI

use std::ffi::CString;

use crate::abi::{ABI_VERSION, RawProcessor, RawRegistrationContext};
use crate::error::RegistrationError;
use crate::traits::Processor;

/// An owned processor ready to be handed to the host.
///
/// The handle is consumed by value in [`RegistrationContext::register`], so a
/// processor can be registered at most once; a second `register` with the
/// same handle is a compile error. A handle that is never registered frees
/// its processor on drop.
pub struct OwnedProcessorHandle {
    raw: *mut RawProcessor,
}

impl OwnedProcessorHandle {
    /// Wrap a processor for transfer to the host.
    pub fn new<P: Processor + 'static>(processor: P) -> Self {
        Self {
            raw: Box::into_raw(Box::new(RawProcessor(Box::new(processor)))),
        }
    }

    /// Release ownership of the raw pointer to the caller.
    fn into_raw(self) -> *mut RawProcessor {
        let raw = self.raw;
        std::mem::forget(self);
        raw
    }
}

impl Drop for OwnedProcessorHandle {
    fn drop(&mut self) {
        // Only reached when the handle was never registered.
        unsafe { drop(Box::from_raw(self.raw)) }
    }
}

/// The capability a plugin entrypoint uses to register its processors.
///
/// Lives only for the duration of the single entrypoint call; it cannot be
/// stored because of the borrowed context.
pub struct RegistrationContext<'a> {
    raw: &'a RawRegistrationContext,
}

impl<'a> RegistrationContext<'a> {
    /// Build the safe wrapper from the raw pointer the host passed in.
    ///
    /// Returns `None` when the pointer is null or the host was built against
    /// a different [`ABI_VERSION`]; in that case the plugin must register
    /// nothing. The version check reads only the first field of the context,
    /// so a layout mismatch in later fields is never dereferenced.
    ///
    /// # Safety
    ///
    /// `raw` must either be null or point to a context that stays valid for
    /// the lifetime of the returned wrapper.
    pub unsafe fn from_raw(raw: *mut RawRegistrationContext) -> Option<Self> {
        if raw.is_null() {
            return None;
        }
        let raw = unsafe { &*raw };
        (raw.abi_version == ABI_VERSION).then_some(Self { raw })
    }

    /// ABI revision of the host.
    pub fn abi_version(&self) -> u32 {
        self.raw.abi_version
    }

    /// Register a processor under `name`, transferring ownership to the host.
    ///
    /// Last write wins if the name is already taken; the host raises no
    /// error. The only failure is a service name with an interior NUL byte,
    /// which cannot cross the C boundary — the handle is consumed and the
    /// processor freed in that case too.
    pub fn register(
        &mut self,
        name: &str,
        processor: OwnedProcessorHandle,
    ) -> Result<(), RegistrationError> {
        let cname = CString::new(name)
            .map_err(|_| RegistrationError::InvalidServiceName(name.to_string()))?;
        unsafe { (self.raw.register)(self.raw.registry, cname.as_ptr(), processor.into_raw()) }
        Ok(())
    }
}
