//! `std::io` adapters so a region can be handed to generic byte consumers.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::ops::{Deref, DerefMut};

use crate::errors::RegionError;
use crate::flush::FlushMode;
use crate::mmap::MappedRegion;

/// A positioned view over a [`MappedRegion`] implementing `Read`, `Seek`
/// and, for mutable borrows, `Write`.
///
/// The cursor sees exactly `len` bytes. Reads and writes past the end return
/// `Ok(0)`; all other access goes through the region's checked accessors.
///
/// # Examples
///
/// ```no_run
/// use std::io::{Read, Seek, SeekFrom};
/// use std::fs::File;
/// use mmap_region::{MappedRegion, Protection};
///
/// let file = File::open("archive.zip")?;
/// let region = MappedRegion::map(&file, 0, 22, Protection::ReadOnly)?;
///
/// let mut cursor = region.reader();
/// cursor.seek(SeekFrom::End(-22))?;
/// let mut signature = [0u8; 4];
/// cursor.read_exact(&mut signature)?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct RegionCursor<R> {
    region: R,
    pos: u64,
}

impl<R: Deref<Target = MappedRegion>> RegionCursor<R> {
    /// Wrap `region` with the position at 0.
    pub fn new(region: R) -> Self {
        Self { region, pos: 0 }
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Borrow the underlying region.
    #[must_use]
    pub fn get_ref(&self) -> &MappedRegion {
        &self.region
    }

    /// Give back the wrapped region.
    pub fn into_inner(self) -> R {
        self.region
    }

    fn at_end(&self, buf_len: usize) -> io::Result<bool> {
        if !self.region.is_mapped() {
            return Err(RegionError::UnmappedMemory.into());
        }
        Ok(buf_len == 0 || self.pos >= self.region.len())
    }
}

impl MappedRegion {
    /// A read-only cursor over this region.
    #[must_use]
    pub fn reader(&self) -> RegionCursor<&Self> {
        RegionCursor::new(self)
    }

    /// A read-write cursor over this region.
    pub fn cursor(&mut self) -> RegionCursor<&mut Self> {
        RegionCursor::new(self)
    }
}

impl<R: Deref<Target = MappedRegion>> Read for RegionCursor<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.at_end(buf.len())? {
            return Ok(0);
        }
        let n = self.region.read_at(buf, self.pos)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<R: DerefMut<Target = MappedRegion>> Write for RegionCursor<R> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.at_end(buf.len())? {
            return Ok(0);
        }
        let n = self.region.write_at(buf, self.pos)?;
        self.pos += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.region.flush(FlushMode::Sync)?;
        Ok(())
    }
}

impl<R: Deref<Target = MappedRegion>> Seek for RegionCursor<R> {
    fn seek(&mut self, style: SeekFrom) -> io::Result<u64> {
        let (base, delta) = match style {
            SeekFrom::Start(n) => {
                self.pos = n;
                return Ok(n);
            }
            SeekFrom::End(n) => (self.region.len(), n),
            SeekFrom::Current(n) => (self.pos, n),
        };
        match base.checked_add_signed(delta) {
            Some(pos) => {
                self.pos = pos;
                Ok(pos)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}
