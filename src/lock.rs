//! Memory locking operations to keep a region's pages resident.

use log::{debug, warn};

use crate::errors::Result;
use crate::mmap::MappedRegion;
use crate::sys;

impl MappedRegion {
    /// Lock all pages of the region into physical memory.
    ///
    /// Locked pages count against `RLIMIT_MEMLOCK`; failure is reported as-is
    /// and never retried.
    ///
    /// # Platform-specific behavior
    ///
    /// - **Unix**: Uses `mlock`
    /// - **Windows**: Uses `VirtualLock`
    /// - **Other**: Reports `ErrorKind::Unsupported`
    ///
    /// # Errors
    ///
    /// Returns `RegionError::UnmappedMemory` after unmap.
    /// Returns `RegionError::Io` with the OS error if `mlock` fails.
    pub fn lock(&self) -> Result<()> {
        let bytes = self.live()?.as_slice();
        if let Err(err) = sys::lock(bytes.as_ptr(), bytes.len()) {
            warn!("mlock of {} bytes failed: {err}", bytes.len());
            return Err(err.into());
        }
        debug!("locked {} bytes", bytes.len());
        Ok(())
    }

    /// Release a previous [`MappedRegion::lock`], allowing the pages to be swapped.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::UnmappedMemory` after unmap.
    /// Returns `RegionError::Io` with the OS error if `munlock` fails.
    pub fn unlock(&self) -> Result<()> {
        let bytes = self.live()?.as_slice();
        sys::unlock(bytes.as_ptr(), bytes.len())?;
        debug!("unlocked {} bytes", bytes.len());
        Ok(())
    }
}
