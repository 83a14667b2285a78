//! Memory advise operations for optimizing OS behavior.

use log::trace;

use crate::errors::Result;
use crate::mmap::MappedRegion;
use crate::sys;

/// Memory access pattern advice for the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advice {
    /// Normal access pattern (default).
    Normal,
    /// Random access pattern.
    Random,
    /// Sequential access pattern.
    Sequential,
    /// Will need this range soon.
    WillNeed,
    /// Won't need this range soon. On a shared mapping the next access
    /// re-reads the pages from the file.
    DontNeed,
}

impl MappedRegion {
    /// Advise the OS about the expected access pattern over the whole region.
    ///
    /// The advice is a hint; it never changes what reads and writes observe.
    ///
    /// # Platform-specific behavior
    ///
    /// - **Unix**: Uses `madvise`
    /// - **Windows**: `WillNeed` uses `PrefetchVirtualMemory`; other hints are no-ops
    /// - **Other**: Reports `ErrorKind::Unsupported`
    ///
    /// # Errors
    ///
    /// Returns `RegionError::UnmappedMemory` after unmap.
    /// Returns `RegionError::Io` with the OS error if `madvise` fails.
    pub fn advise(&self, advice: Advice) -> Result<()> {
        let bytes = self.live()?.as_slice();
        trace!("advise {advice:?} over {} bytes", bytes.len());
        sys::advise(bytes.as_ptr(), bytes.len(), advice)?;
        Ok(())
    }
}
