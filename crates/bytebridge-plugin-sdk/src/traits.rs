//! The processor trait defining the contract between plugins and the host
//!
//! Plugins implement [`Processor`] to serve one request/response cycle.

use crate::error::Result;

/// A request processor for one service.
///
/// The host hands `execute` an opaque encoded request and expects an opaque
/// encoded response back. The processor owns its wire codec: it decodes the
/// request, runs its business logic, and encodes the response. The host never
/// interprets either buffer.
///
/// Processors are called concurrently from many threads once loading has
/// completed, hence the `Send + Sync` bound.
pub trait Processor: Send + Sync {
    /// Run one request/response cycle.
    fn execute(&self, request: &[u8]) -> Result<Vec<u8>>;
}
