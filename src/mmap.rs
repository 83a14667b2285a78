//! The mapped region: lifecycle and boundary-checked access to a shared file mapping.

use std::fs::File;

use log::debug;
use memmap2::{Mmap, MmapMut};

use crate::errors::{RegionError, Result};
use crate::flush::FlushPolicy;
use crate::options::MapOptions;
use crate::utils::slice_range;

/// Access mode of a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protection {
    /// Read-only mapping.
    ReadOnly,
    /// Read-write shared mapping; writes reach the backing file.
    #[default]
    ReadWrite,
    /// Read-only, executable mapping.
    ReadExec,
}

impl Protection {
    /// Whether write-class accessors are permitted.
    #[must_use]
    pub fn is_writable(self) -> bool {
        self == Self::ReadWrite
    }
}

pub(crate) enum MapVariant {
    Ro(Mmap),
    Rw(MmapMut),
}

impl MapVariant {
    pub(crate) fn as_slice(&self) -> &[u8] {
        match self {
            Self::Ro(m) => &m[..],
            Self::Rw(m) => &m[..],
        }
    }
}

/// A shared memory mapping over `[file_offset, file_offset + len)` of a file.
///
/// Every access goes through a bounds check against `len` and a liveness check.
/// Reads take `&self`; writes, flushes and unmapping take `&mut self`, so a
/// region has exactly one writer at a time without any internal lock.
///
/// # Examples
///
/// ```no_run
/// use std::fs::OpenOptions;
/// use mmap_region::{FlushMode, MappedRegion, Protection};
///
/// let file = OpenOptions::new().read(true).write(true).open("data.bin")?;
/// let mut region = MappedRegion::map(&file, 0, 64, Protection::ReadWrite)?;
///
/// region.write_u64_at(10_000_000_000, 0)?;
/// assert_eq!(region.read_u64_at(0)?, 10_000_000_000);
///
/// region.flush(FlushMode::Sync)?;
/// region.unmap()?;
/// # Ok::<(), mmap_region::RegionError>(())
/// ```
pub struct MappedRegion {
    pub(crate) map: Option<MapVariant>,
    len: u64,
    file_offset: u64,
    protection: Protection,
    pub(crate) dirty: bool,
    pub(crate) flush_policy: FlushPolicy,
    pub(crate) writes_since_flush: usize,
    pub(crate) bytes_since_flush: usize,
    pub(crate) sync_count: u64,
}

impl std::fmt::Debug for MappedRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedRegion")
            .field("len", &self.len)
            .field("file_offset", &self.file_offset)
            .field("protection", &self.protection)
            .field("mapped", &self.is_mapped())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl MappedRegion {
    /// Map `len` bytes of `file` starting at `file_offset` with the given protection.
    ///
    /// Shorthand for [`MapOptions`] with default populate and flush policy.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::InvalidLength` for a zero or unrepresentable length.
    /// Returns `RegionError::Io` if the OS refuses the mapping.
    pub fn map(file: &File, file_offset: u64, len: u64, protection: Protection) -> Result<Self> {
        MapOptions::new()
            .offset(file_offset)
            .len(len)
            .protection(protection)
            .map(file)
    }

    pub(crate) fn from_parts(
        map: MapVariant,
        len: u64,
        file_offset: u64,
        protection: Protection,
        flush_policy: FlushPolicy,
    ) -> Self {
        Self {
            map: Some(map),
            len,
            file_offset,
            protection,
            dirty: false,
            flush_policy,
            writes_since_flush: 0,
            bytes_since_flush: 0,
            sync_count: 0,
        }
    }

    /// Release the mapping. Every later access fails with `UnmappedMemory`.
    ///
    /// Unflushed writes are not synchronized here; the kernel writes them back
    /// on its own schedule.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::UnmappedMemory` if the region is already unmapped.
    /// That is the only error: memmap2 releases the pages on drop and discards
    /// any `munmap` failure, so no OS error reaches the caller.
    pub fn unmap(&mut self) -> Result<()> {
        let map = self.map.take().ok_or(RegionError::UnmappedMemory)?;
        drop(map);
        debug!(
            "unmapped {} bytes at file offset {} (dirty: {})",
            self.len, self.file_offset, self.dirty
        );
        Ok(())
    }

    /// Length of the mapped extent in bytes, fixed at creation.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Always false for an established region; lengths are positive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Offset into the backing file where the region starts.
    #[must_use]
    pub fn file_offset(&self) -> u64 {
        self.file_offset
    }

    /// Access mode the region was mapped with.
    #[must_use]
    pub fn protection(&self) -> Protection {
        self.protection
    }

    /// Whether the region is still mapped.
    #[must_use]
    pub fn is_mapped(&self) -> bool {
        self.map.is_some()
    }

    /// Whether a write has happened since the last successful flush.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn live(&self) -> Result<&MapVariant> {
        self.map.as_ref().ok_or(RegionError::UnmappedMemory)
    }

    /// Bytes from `offset` to the end of the region, after checking that
    /// `size` bytes are available there.
    fn tail(&self, offset: u64, size: u64) -> Result<&[u8]> {
        let map = self.live()?;
        let (start, _) = slice_range(offset, size, self.len)?;
        Ok(&map.as_slice()[start..])
    }

    fn tail_mut(&mut self, offset: u64, size: u64) -> Result<&mut [u8]> {
        if self.map.is_none() {
            return Err(RegionError::UnmappedMemory);
        }
        if !self.protection.is_writable() {
            return Err(RegionError::InvalidMode(
                "write to a mapping without write protection",
            ));
        }
        let (start, _) = slice_range(offset, size, self.len)?;
        match self.map.as_mut() {
            Some(MapVariant::Rw(m)) => Ok(&mut m[start..]),
            _ => Err(RegionError::InvalidMode("mapping is not writable")),
        }
    }

    /// Copy bytes starting at `offset` into `dest`.
    ///
    /// Copies `min(dest.len(), len - offset)` bytes and returns that count;
    /// bytes of `dest` past the count are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::UnmappedMemory` after unmap.
    /// Returns `RegionError::OutOfBounds` if `offset >= len`.
    pub fn read_at(&self, dest: &mut [u8], offset: u64) -> Result<usize> {
        let src = self.tail(offset, 1)?;
        let n = src.len().min(dest.len());
        dest[..n].copy_from_slice(&src[..n]);
        Ok(n)
    }

    /// Copy `src` into the region at `offset`, clipped at the end of the region.
    ///
    /// Returns the number of bytes written and marks the region dirty.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::UnmappedMemory` after unmap.
    /// Returns `RegionError::InvalidMode` on a read-only mapping.
    /// Returns `RegionError::OutOfBounds` if `offset >= len`.
    /// Returns `RegionError::Io` if the flush policy triggers a failing flush.
    pub fn write_at(&mut self, src: &[u8], offset: u64) -> Result<usize> {
        let dst = self.tail_mut(offset, 1)?;
        let n = dst.len().min(src.len());
        dst[..n].copy_from_slice(&src[..n]);
        self.record_write(n)?;
        Ok(n)
    }

    /// Read a little-endian `u64` from the 8 bytes at `offset`.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::UnmappedMemory` after unmap.
    /// Returns `RegionError::OutOfBounds` if fewer than 8 bytes remain.
    pub fn read_u64_at(&self, offset: u64) -> Result<u64> {
        let src = self.tail(offset, 8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&src[..8]);
        Ok(u64::from_le_bytes(raw))
    }

    /// Write `value` as a little-endian `u64` into the 8 bytes at `offset`.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::UnmappedMemory` after unmap.
    /// Returns `RegionError::InvalidMode` on a read-only mapping.
    /// Returns `RegionError::OutOfBounds` if fewer than 8 bytes remain.
    pub fn write_u64_at(&mut self, value: u64, offset: u64) -> Result<()> {
        let dst = self.tail_mut(offset, 8)?;
        dst[..8].copy_from_slice(&value.to_le_bytes());
        self.record_write(8)
    }

    /// Append text starting at `offset` to `dest`, limited by its spare capacity.
    ///
    /// Copies up to `min(len - offset, dest.capacity() - dest.len())` bytes; `dest`
    /// never reallocates. A UTF-8 sequence cut short by that limit is left out,
    /// so the returned count can be up to 3 bytes smaller than that minimum.
    /// Returns the number of bytes appended.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::UnmappedMemory` after unmap.
    /// Returns `RegionError::OutOfBounds` if `offset >= len`.
    /// Returns `RegionError::InvalidUtf8` if the bytes are not UTF-8.
    pub fn read_str_at(&self, dest: &mut String, offset: u64) -> Result<usize> {
        let src = self.tail(offset, 1)?;
        let room = dest.capacity() - dest.len();
        let src = &src[..src.len().min(room)];
        let text = match std::str::from_utf8(src) {
            Ok(text) => text,
            // truncated trailing sequence
            Err(e) if e.error_len().is_none() => std::str::from_utf8(&src[..e.valid_up_to()])
                .map_err(|e| RegionError::InvalidUtf8 {
                    offset,
                    valid_up_to: e.valid_up_to(),
                })?,
            Err(e) => {
                return Err(RegionError::InvalidUtf8 {
                    offset,
                    valid_up_to: e.valid_up_to(),
                })
            }
        };
        dest.push_str(text);
        Ok(text.len())
    }

    /// Copy the bytes of `src` into the region at `offset`, clipped at the end.
    ///
    /// Returns the number of bytes written and marks the region dirty.
    ///
    /// # Errors
    ///
    /// Same as [`MappedRegion::write_at`].
    pub fn write_str_at(&mut self, src: &str, offset: u64) -> Result<usize> {
        self.write_at(src.as_bytes(), offset)
    }
}
