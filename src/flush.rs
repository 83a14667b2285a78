//! Dirty-tracked flushing of a mapped region.
//!
//! A region remembers whether it was written since the last successful flush.
//! Flushing a clean region returns without calling `msync`.

use log::{debug, trace};

use crate::errors::Result;
use crate::mmap::{MapVariant, MappedRegion};
use crate::sys;

/// Synchronization mode passed to `msync`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    /// `MS_SYNC`: block until the pages are written.
    #[default]
    Sync,
    /// `MS_ASYNC`: schedule the write-back and return.
    Async,
    /// `MS_SYNC | MS_INVALIDATE`: write, then invalidate other mappings of the file.
    SyncInvalidate,
}

/// Policy controlling when writes flush implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushPolicy {
    /// Never flush implicitly; `flush()` must be called by the user.
    #[default]
    Manual,
    /// Flush after every write.
    Always,
    /// Flush after every N writes since the last flush.
    EveryWrites(usize),
    /// Flush once at least N bytes were written since the last flush.
    EveryBytes(usize),
}

impl MappedRegion {
    /// Synchronize the full extent with the backing file if the region is dirty.
    ///
    /// A clean region returns `Ok(())` without a syscall. On failure the region
    /// stays dirty.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::UnmappedMemory` after unmap.
    /// Returns `RegionError::Io` with the OS error if `msync` fails.
    pub fn flush(&mut self, mode: FlushMode) -> Result<()> {
        let map = self.live()?;
        if !self.dirty {
            trace!("flush skipped, region clean");
            return Ok(());
        }
        if let MapVariant::Rw(m) = map {
            sys::flush(m, mode)?;
            debug!("flushed {} bytes ({mode:?})", self.len());
        }
        self.dirty = false;
        self.writes_since_flush = 0;
        self.bytes_since_flush = 0;
        self.sync_count += 1;
        Ok(())
    }

    /// Number of flushes that reached the OS since the region was mapped.
    #[must_use]
    pub fn sync_count(&self) -> u64 {
        self.sync_count
    }

    /// The implicit flush policy in effect.
    #[must_use]
    pub fn flush_policy(&self) -> FlushPolicy {
        self.flush_policy
    }

    /// Replace the implicit flush policy. Counters keep accumulating from the last flush.
    pub fn set_flush_policy(&mut self, policy: FlushPolicy) {
        self.flush_policy = policy;
    }

    pub(crate) fn record_write(&mut self, bytes: usize) -> Result<()> {
        self.dirty = true;
        self.writes_since_flush += 1;
        self.bytes_since_flush += bytes;
        let due = match self.flush_policy {
            FlushPolicy::Manual => false,
            FlushPolicy::Always => true,
            FlushPolicy::EveryWrites(n) => self.writes_since_flush >= n,
            FlushPolicy::EveryBytes(n) => self.bytes_since_flush >= n,
        };
        if due {
            self.flush(FlushMode::Sync)?;
        }
        Ok(())
    }
}
