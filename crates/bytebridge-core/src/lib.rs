//! bytebridge core - a pluggable, dynamically-extensible RPC dispatch hub
//!
//! This crate provides the host side of the bridge:
//! - A [`ProcessorRegistry`] mapping service names to processors contributed
//!   by independently compiled shared modules
//! - A [`PluginLoader`] that scans a directory at startup, loads every
//!   shared module in it, and runs each module's registration entrypoint
//! - A [`Dispatcher`] routing opaque encoded requests to the matching
//!   processor and returning opaque encoded responses
//! - The [`Bridge`] facade (`initialize` / `dispatch` / `shutdown`) a
//!   binding layer consumes
//!
//! Payloads are pure passthrough: the core imposes no framing and never
//! interprets request or response bytes — only the registered processor
//! does. Plugins are trusted code; there is no sandboxing.

pub mod bridge;
pub mod config;
pub mod dispatcher;
pub mod error;
mod ffi;
pub mod loader;
pub mod registry;

pub use bridge::Bridge;
pub use config::BridgeConfig;
pub use dispatcher::Dispatcher;
pub use error::{BridgeError, Result};
pub use loader::{LoadFailure, LoadReport, PluginFailure, PluginLoader, PluginRecord};
pub use registry::ProcessorRegistry;

// The plugin-facing contract, re-exported so hosts can register processors
// of their own without depending on the SDK crate directly.
pub use bytebridge_plugin_sdk::{Processor, ProcessorError};
