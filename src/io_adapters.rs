use std::io::{Result as IoResult, Write};

/// Memory-backed writer that optionally mirrors everything it receives.
///
/// Used to capture a child's output in full while, unless the call is silent, also
/// echoing each chunk to one of the host's own streams as soon as it arrives.
/// A mirror that fails is dropped; capturing never stops because of it.
pub(crate) struct Tee<W> {
    buf: Vec<u8>,
    mirror: Option<W>,
}

impl<W: Write> Tee<W> {
    pub(crate) fn new(mirror: Option<W>) -> Self {
        Self {
            buf: Vec::new(),
            mirror,
        }
    }

    /// Captured bytes, decoded lossily.
    pub(crate) fn into_string(self) -> String {
        match String::from_utf8(self.buf) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }
}

impl<W: Write> Write for Tee<W> {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.extend_from_slice(data);
        if let Some(mirror) = self.mirror.as_mut() {
            if let Err(e) = mirror.write_all(data).and_then(|()| mirror.flush()) {
                tracing::warn!(error = %e, "output mirror failed, capturing only");
                self.mirror = None;
            }
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}
