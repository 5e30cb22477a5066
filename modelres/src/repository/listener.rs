//! Transfer progress notifications.

use std::io::{self, Write};

use super::error::TransportError;

/// Receives events for every resource the repository fetches.
///
/// All methods default to doing nothing, so implementors only override the
/// events they care about. `resource` is the path relative to the
/// repository root.
pub trait TransferListener: Send + Sync {
    /// A fetch is about to be attempted.
    fn transfer_initiated(&self, _resource: &str) {}

    /// The first bytes arrived.
    fn transfer_started(&self, _resource: &str) {}

    /// `transferred` bytes have been received so far.
    fn transfer_progressed(&self, _resource: &str, _transferred: u64) {}

    /// The resource was received completely.
    fn transfer_succeeded(&self, _resource: &str, _transferred: u64) {}

    /// The fetch failed.
    fn transfer_failed(&self, _resource: &str, _error: &TransportError) {}

    /// The resource did not match its published checksum.
    fn transfer_corrupted(&self, _resource: &str, _expected: &str, _actual: &str) {}
}

/// Listener that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTransferListener;

impl TransferListener for NoopTransferListener {}

/// Writer adapter reporting progress to a listener.
pub(crate) struct ProgressWriter<'a, W: Write + ?Sized> {
    inner: &'a mut W,
    listener: &'a dyn TransferListener,
    resource: &'a str,
    transferred: u64,
}

impl<'a, W: Write + ?Sized> ProgressWriter<'a, W> {
    pub(crate) fn new(inner: &'a mut W, listener: &'a dyn TransferListener, resource: &'a str) -> Self {
        Self {
            inner,
            listener,
            resource,
            transferred: 0,
        }
    }
}

impl<W: Write + ?Sized> Write for ProgressWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        if written > 0 {
            if self.transferred == 0 {
                self.listener.transfer_started(self.resource);
            }
            self.transferred += written as u64;
            self.listener
                .transfer_progressed(self.resource, self.transferred);
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
