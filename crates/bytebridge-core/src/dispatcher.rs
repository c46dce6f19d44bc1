//! Generic request dispatcher
//!
//! Routes an opaque encoded request to the processor registered under the
//! matching service name and returns its opaque encoded response. The
//! dispatcher is pure passthrough: it imposes no framing and never inspects
//! the payload.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tracing::{debug, error};

use crate::error::{BridgeError, Result};
use crate::registry::ProcessorRegistry;

/// Routes requests through the shared [`ProcessorRegistry`].
///
/// Safe to call from many threads at once; each dispatch is independent (no
/// retries, no caching, no affinity between successive calls for the same
/// service).
pub struct Dispatcher {
    registry: Arc<ProcessorRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher over `registry`
    pub fn new(registry: Arc<ProcessorRegistry>) -> Self {
        Self { registry }
    }

    /// Run one request/response cycle through the processor for `service`.
    ///
    /// The processor is cloned out of the registry before `execute` runs, so
    /// no registry lock is held during processing and late registrations
    /// never block in-flight dispatches. A processor error or panic is
    /// caught here and surfaced as [`BridgeError::ProcessingFailed`]; a
    /// processor fault must never crash the host.
    pub fn dispatch(&self, service: &str, request: &[u8]) -> Result<Vec<u8>> {
        let processor = self
            .registry
            .lookup(service)
            .ok_or_else(|| BridgeError::ServiceNotFound(service.to_string()))?;

        debug!("Dispatching {} byte(s) to service '{}'", request.len(), service);

        match catch_unwind(AssertUnwindSafe(|| processor.execute(request))) {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => {
                error!("Processor for service '{}' failed: {}", service, e);
                Err(BridgeError::ProcessingFailed(e.to_string()))
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!("Processor for service '{}' panicked: {}", service, message);
                Err(BridgeError::ProcessingFailed(message))
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "processor panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytebridge_plugin_sdk::error::ProcessorError;
    use bytebridge_plugin_sdk::Processor;

    struct Echo;

    impl Processor for Echo {
        fn execute(&self, request: &[u8]) -> bytebridge_plugin_sdk::Result<Vec<u8>> {
            Ok(request.to_vec())
        }
    }

    struct Failing;

    impl Processor for Failing {
        fn execute(&self, _request: &[u8]) -> bytebridge_plugin_sdk::Result<Vec<u8>> {
            Err(ProcessorError::malformed("bad frame"))
        }
    }

    struct Panicking;

    impl Processor for Panicking {
        fn execute(&self, _request: &[u8]) -> bytebridge_plugin_sdk::Result<Vec<u8>> {
            panic!("boom");
        }
    }

    fn dispatcher_with(entries: Vec<(&str, Box<dyn Processor>)>) -> Dispatcher {
        let registry = Arc::new(ProcessorRegistry::new());
        for (name, processor) in entries {
            registry.register(name, processor);
        }
        Dispatcher::new(registry)
    }

    #[test]
    fn echo_round_trip() {
        let dispatcher = dispatcher_with(vec![("echo", Box::new(Echo))]);
        let response = dispatcher.dispatch("echo", b"hello").unwrap();
        assert_eq!(response, b"hello");
    }

    #[test]
    fn unknown_service_is_service_not_found() {
        let dispatcher = dispatcher_with(vec![]);
        let err = dispatcher.dispatch("unknown", b"anything").unwrap_err();
        assert!(matches!(err, BridgeError::ServiceNotFound(name) if name == "unknown"));
    }

    #[test]
    fn processor_error_is_processing_failed() {
        let dispatcher = dispatcher_with(vec![("svc", Box::new(Failing))]);
        let err = dispatcher.dispatch("svc", b"\xff\xff").unwrap_err();
        assert!(matches!(err, BridgeError::ProcessingFailed(_)));
    }

    #[test]
    fn processor_panic_is_caught() {
        let dispatcher = dispatcher_with(vec![("svc", Box::new(Panicking))]);
        let err = dispatcher.dispatch("svc", b"x").unwrap_err();
        match err {
            BridgeError::ProcessingFailed(msg) => assert_eq!(msg, "boom"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_request_is_still_passthrough() {
        let dispatcher = dispatcher_with(vec![("echo", Box::new(Echo))]);
        assert_eq!(dispatcher.dispatch("echo", b"").unwrap(), b"");
    }
}
