//! # mmap-region: bounds-checked shared file mappings
//!
//! This crate maps a window of an already-open file into memory and exposes it
//! as a fixed-length byte region. Every access is checked against the mapped
//! extent and the region's liveness, and flushes skip the `msync` call when
//! nothing was written since the previous one.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::fs::OpenOptions;
//! use mmap_region::{FlushMode, MappedRegion, Protection};
//!
//! let file = OpenOptions::new().read(true).write(true).open("data.bin")?;
//! let mut region = MappedRegion::map(&file, 0, 4096, Protection::ReadWrite)?;
//!
//! region.write_at(b"Hello, mmap!", 100)?;
//! region.flush(FlushMode::Sync)?;
//! region.unmap()?;
//! # Ok::<(), mmap_region::RegionError>(())
//! ```
//!
//! ## Modules
//!
//! - [`errors`]: Error types for all region operations
//! - [`utils`]: Page size and bounds helpers
//! - [`mmap`]: Core `MappedRegion` implementation
//! - [`options`]: Builder for establishing mappings
//! - [`flush`]: Flush modes and implicit flush policy
//! - [`cursor`]: `std::io` adapters for generic byte consumers
//!
//! ## Feature Flags
//!
//! - `advise` (default): `MappedRegion::advise`
//! - `locking` (default): `MappedRegion::lock` / `MappedRegion::unlock`
//!
//! ## Platform Support
//!
//! - **Unix**: `msync` with the exact `FlushMode` flags, `madvise`, `mlock` / `munlock`.
//! - **Windows**: flushes go through `FlushViewOfFile`, so `SyncInvalidate`
//!   behaves like `Sync`. `advise` prefetches for `Advice::WillNeed` and
//!   accepts the other hints as no-ops. Locking uses `VirtualLock` /
//!   `VirtualUnlock`.
//! - **Other targets**: flushes go through memmap2; `advise`, `lock` and
//!   `unlock` return `RegionError::Io` with `ErrorKind::Unsupported`, and
//!   `utils::page_size` assumes 4096 bytes.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![deny(missing_docs)]

pub mod cursor;
pub mod errors;
pub mod flush;
pub mod mmap;
pub mod options;
pub mod utils;

#[cfg(feature = "advise")]
pub mod advise;
#[cfg(feature = "locking")]
mod lock;
mod sys;

#[cfg(feature = "advise")]
pub use advise::Advice;
pub use cursor::RegionCursor;
pub use errors::{RegionError, Result};
pub use flush::{FlushMode, FlushPolicy};
pub use mmap::{MappedRegion, Protection};
pub use options::MapOptions;
