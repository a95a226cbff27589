//! Bounded writer enforcing a byte budget during decompression.

use std::io::Write;

/// Wrapper writer that counts bytes and refuses to exceed a budget.
///
/// The decompression stream of an archive entry is piped through this
/// writer so that an entry whose actual inflated size exceeds its declared
/// size (size-field spoofing) is cut off instead of filling the disk. The
/// budget is the declared size plus a small slack; the counter only
/// advances on successful writes.
///
/// When the budget would be exceeded the write fails with
/// [`std::io::ErrorKind::FileTooLarge`] and [`Self::budget_exceeded`]
/// starts returning `true`, letting the caller distinguish the guard
/// tripping from an ordinary I/O failure.
///
/// # Examples
///
/// ```
/// use fb2drop_core::io::BoundedWriter;
/// use std::io::Write;
///
/// let mut buffer = Vec::new();
/// let mut writer = BoundedWriter::new(&mut buffer, 8);
///
/// writer.write_all(b"12345678")?;
/// assert_eq!(writer.bytes_written(), 8);
/// assert!(writer.write_all(b"9").is_err());
/// assert!(writer.budget_exceeded());
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct BoundedWriter<W> {
    inner: W,
    bytes_written: u64,
    budget: u64,
    exceeded: bool,
}

impl<W> BoundedWriter<W> {
    /// Creates a bounded writer with the given byte budget.
    #[must_use]
    pub fn new(inner: W, budget: u64) -> Self {
        Self {
            inner,
            bytes_written: 0,
            budget,
            exceeded: false,
        }
    }

    /// Returns the number of bytes successfully written so far.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Returns `true` if a write was refused for exceeding the budget.
    #[must_use]
    pub fn budget_exceeded(&self) -> bool {
        self.exceeded
    }

    /// Consumes the writer and returns the inner writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for BoundedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let projected = self.bytes_written.saturating_add(buf.len() as u64);
        if projected > self.budget {
            self.exceeded = true;
            return Err(std::io::Error::new(
                std::io::ErrorKind::FileTooLarge,
                format!(
                    "write of {} bytes exceeds remaining budget ({} of {} used)",
                    buf.len(),
                    self.bytes_written,
                    self.budget
                ),
            ));
        }

        let written = self.inner.write(buf)?;
        self.bytes_written += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
