use std::sync::{Arc, Mutex};

/// In-memory sink for everything one invocation writes to its stdout.
///
/// Cloning shares the underlying buffer: the clone handed to the VM's writer
/// object and the one kept by the executor observe the same text. Each
/// invocation gets its own buffer, so captures never cross invocations.
#[derive(Clone, Default)]
pub struct OutputBuffer {
    inner: Arc<Mutex<String>>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk in write order.
    pub fn push(&self, chunk: &str) {
        let mut buf = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        buf.push_str(chunk);
    }

    /// Read back the full contents written so far, in write order.
    pub fn contents(&self) -> String {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
