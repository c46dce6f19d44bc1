//! Convenience prelude for plugin authors
//!
//! ```rust,ignore
//! use bytebridge_plugin_sdk::prelude::*;
//! ```

pub use crate::abi::ABI_VERSION;
pub use crate::error::{ProcessorError, RegistrationError, Result};
pub use crate::export_plugin;
pub use crate::registration::{OwnedProcessorHandle, RegistrationContext};
pub use crate::traits::Processor;
