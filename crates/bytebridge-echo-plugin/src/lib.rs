//! Example bytebridge plugin.
//!
//! Registers two services from a single entrypoint invocation: `echo`
//! (identity) and `reverse` (reversed payload bytes). Build as a shared
//! module and drop it in the host's plugin directory.

use bytebridge_plugin_sdk::prelude::*;

/// Returns the request bytes unchanged.
struct EchoProcessor;

impl Processor for EchoProcessor {
    fn execute(&self, request: &[u8]) -> Result<Vec<u8>> {
        Ok(request.to_vec())
    }
}

/// Returns the request bytes in reverse order.
struct ReverseProcessor;

impl Processor for ReverseProcessor {
    fn execute(&self, request: &[u8]) -> Result<Vec<u8>> {
        let mut response = request.to_vec();
        response.reverse();
        Ok(response)
    }
}

fn init(ctx: &mut RegistrationContext) {
    // Static, NUL-free service names: registration cannot fail here.
    let _ = ctx.register("echo", OwnedProcessorHandle::new(EchoProcessor));
    let _ = ctx.register("reverse", OwnedProcessorHandle::new(ReverseProcessor));
}

bytebridge_plugin_sdk::export_plugin!(init);
