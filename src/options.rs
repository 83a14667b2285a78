//! Builder for establishing a shared mapping over an already-open file.

use std::fs::File;

use log::debug;
use memmap2::MmapOptions;

use crate::errors::{RegionError, Result};
use crate::flush::FlushPolicy;
use crate::mmap::{MapVariant, MappedRegion, Protection};

/// Options for mapping `[offset, offset + len)` of a file.
///
/// # Examples
///
/// ```no_run
/// use std::fs::OpenOptions;
/// use mmap_region::{MapOptions, Protection};
///
/// let file = OpenOptions::new().read(true).write(true).open("data.bin")?;
/// let region = MapOptions::new()
///     .offset(4096)
///     .len(1024)
///     .protection(Protection::ReadWrite)
///     .map(&file)?;
/// assert_eq!(region.len(), 1024);
/// # Ok::<(), mmap_region::RegionError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    offset: u64,
    len: Option<u64>,
    protection: Protection,
    populate: bool,
    flush_policy: FlushPolicy,
}

impl MapOptions {
    /// Start with offset 0, no length, read-write protection and manual flushing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Byte offset into the file where the mapping starts. Need not be page aligned.
    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.offset = offset;
        self
    }

    /// Length of the mapping in bytes. Required, and must be positive.
    pub fn len(&mut self, len: u64) -> &mut Self {
        self.len = Some(len);
        self
    }

    /// Access mode of the mapping. The file must be opened compatibly.
    pub fn protection(&mut self, protection: Protection) -> &mut Self {
        self.protection = protection;
        self
    }

    /// Pre-fault the mapped pages (`MAP_POPULATE` on Linux, ignored elsewhere).
    pub fn populate(&mut self, populate: bool) -> &mut Self {
        self.populate = populate;
        self
    }

    /// Policy for flushing implicitly after writes.
    pub fn flush_policy(&mut self, policy: FlushPolicy) -> &mut Self {
        self.flush_policy = policy;
        self
    }

    /// Establish the shared mapping.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::InvalidLength` if no length was given, or it is zero,
    /// larger than `isize::MAX`, or overflows the file offset.
    /// Returns `RegionError::Io` if the OS refuses the mapping.
    #[allow(clippy::cast_sign_loss)]
    pub fn map(&self, file: &File) -> Result<MappedRegion> {
        let len = self.len.unwrap_or(0);
        if len == 0 || len > isize::MAX as u64 || self.offset.checked_add(len).is_none() {
            return Err(RegionError::InvalidLength(len));
        }
        let size = usize::try_from(len).map_err(|_| RegionError::InvalidLength(len))?;

        let mut opts = MmapOptions::new();
        opts.offset(self.offset).len(size);
        if self.populate {
            opts.populate();
        }

        // SAFETY: the mapping is shared with the file; the caller owns the file
        // and is responsible for not truncating it underneath a live region.
        let map = unsafe {
            match self.protection {
                Protection::ReadOnly => MapVariant::Ro(opts.map(file)?),
                Protection::ReadWrite => MapVariant::Rw(opts.map_mut(file)?),
                Protection::ReadExec => MapVariant::Ro(opts.map_exec(file)?),
            }
        };
        debug!(
            "mapped {len} bytes at file offset {} ({:?})",
            self.offset, self.protection
        );
        Ok(MappedRegion::from_parts(
            map,
            len,
            self.offset,
            self.protection,
            self.flush_policy,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn backing(len: usize) -> File {
        let mut file = tempfile::tempfile().expect("tempfile");
        file.write_all(&vec![7u8; len]).expect("fill");
        file
    }

    #[test]
    fn length_is_required() {
        let file = backing(16);
        assert!(matches!(
            MapOptions::new().map(&file),
            Err(RegionError::InvalidLength(0))
        ));
    }

    #[test]
    fn rejects_oversized_and_overflowing_lengths() {
        let file = backing(16);
        assert!(matches!(
            MapOptions::new().len(u64::MAX).map(&file),
            Err(RegionError::InvalidLength(u64::MAX))
        ));
        assert!(matches!(
            MapOptions::new().offset(u64::MAX - 2).len(8).map(&file),
            Err(RegionError::InvalidLength(8))
        ));
    }

    #[test]
    fn unaligned_offset_maps_requested_window() {
        let mut file = tempfile::tempfile().expect("tempfile");
        file.write_all(b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ").expect("fill");

        let region = MapOptions::new()
            .offset(10)
            .len(6)
            .protection(Protection::ReadOnly)
            .populate(true)
            .map(&file)
            .expect("map");
        assert_eq!(region.len(), 6);
        assert_eq!(region.file_offset(), 10);
        assert_eq!(region.protection(), Protection::ReadOnly);

        let mut buf = [0u8; 6];
        assert_eq!(region.read_at(&mut buf, 0).expect("read"), 6);
        assert_eq!(&buf, b"ABCDEF");
    }
}
