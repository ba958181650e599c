//! Writers used to mirror child process output.

use std::io::{self, Write};

/// Fans every write out to each sink in turn.
///
/// Sinks are borrowed, so callers keep ownership of capture buffers and can
/// read them back once the tee is dropped.
pub struct Tee<'a> {
    sinks: Vec<&'a mut dyn Write>,
}

impl<'a> Tee<'a> {
    pub fn new(sinks: Vec<&'a mut dyn Write>) -> Self {
        Self { sinks }
    }
}

impl Write for Tee<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for sink in &mut self.sinks {
            sink.write_all(buf)?;
            // Console sinks must show partial lines (progress output) immediately.
            sink.flush()?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        for sink in &mut self.sinks {
            sink.flush()?;
        }
        Ok(())
    }
}

/// In-memory capture that keeps at most `limit` bytes.
///
/// Bytes past the limit are counted and dropped; writes never fail, so the
/// child's pipe is always drained.
#[derive(Debug, Default)]
pub struct CaptureBuffer {
    buf: Vec<u8>,
    limit: usize,
    truncated: usize,
}

impl CaptureBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            limit,
            truncated: 0,
        }
    }

    /// Captured bytes and the number of bytes dropped.
    pub fn into_parts(self) -> (Vec<u8>, usize) {
        (self.buf, self.truncated)
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let remaining = self.limit.saturating_sub(self.buf.len());
        let keep = buf.len().min(remaining);
        self.buf.extend_from_slice(&buf[..keep]);
        self.truncated += buf.len() - keep;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
