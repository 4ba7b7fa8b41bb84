//! Wrapping native host tasks behind the uniform handle contract.

use tickbridge_core::CancelSink;
use tickbridge_host::NativeHandle;
use tracing::debug;

/// Adapts a host's native task to the handle's cancellation backend.
///
/// Native cancel and status calls can fail on some hosts; per the handle
/// contract those failures are swallowed and read as "already not
/// cancellable".
pub(crate) struct NativeSink(NativeHandle);

impl NativeSink {
    pub(crate) fn new(native: NativeHandle) -> Self {
        Self(native)
    }
}

impl CancelSink for NativeSink {
    fn cancel(&self) -> bool {
        match self.0.cancel() {
            Ok(()) => true,
            Err(err) => {
                debug!(%err, "native cancel failed, treating as not cancellable");
                false
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.0.is_cancelled().unwrap_or(false)
    }
}
