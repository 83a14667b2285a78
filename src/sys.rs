//! Platform layer over the OS calls memmap2 does not expose with the flags we need.
//!
//! Every function here operates on the full extent of a mapping. On Unix the
//! base pointer is widened down to its page boundary first, since memmap2 maps
//! unaligned file offsets from the preceding page. Windows goes through the
//! Win32 virtual memory calls; any other target gets memmap2's flush and
//! reports `ErrorKind::Unsupported` for advise and locking.

use std::io;

use memmap2::MmapMut;

#[cfg(feature = "advise")]
use crate::advise::Advice;
use crate::flush::FlushMode;

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        use crate::utils::align_down;

        /// Get the system page size in bytes.
        #[must_use]
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        pub fn page_size() -> usize {
            // SAFETY: sysconf with _SC_PAGESIZE is safe to call.
            let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
            size.max(1) as usize
        }

        fn page_span(ptr: *const u8, len: usize) -> (*mut libc::c_void, usize) {
            let addr = ptr as usize;
            let base = align_down(addr as u64, page_size() as u64) as usize;
            (base as *mut libc::c_void, len + (addr - base))
        }

        fn check(ret: libc::c_int) -> io::Result<()> {
            if ret == 0 {
                Ok(())
            } else {
                Err(io::Error::last_os_error())
            }
        }

        pub(crate) fn flush(map: &MmapMut, mode: FlushMode) -> io::Result<()> {
            let flags = match mode {
                FlushMode::Sync => libc::MS_SYNC,
                FlushMode::Async => libc::MS_ASYNC,
                FlushMode::SyncInvalidate => libc::MS_SYNC | libc::MS_INVALIDATE,
            };
            let (addr, len) = page_span(map.as_ptr(), map.len());
            // SAFETY: the span covers pages owned by `map`, which outlives the call.
            check(unsafe { libc::msync(addr, len, flags) })
        }

        #[cfg(feature = "advise")]
        pub(crate) fn advise(ptr: *const u8, len: usize, advice: Advice) -> io::Result<()> {
            let flag = match advice {
                Advice::Normal => libc::MADV_NORMAL,
                Advice::Random => libc::MADV_RANDOM,
                Advice::Sequential => libc::MADV_SEQUENTIAL,
                Advice::WillNeed => libc::MADV_WILLNEED,
                Advice::DontNeed => libc::MADV_DONTNEED,
            };
            let (addr, len) = page_span(ptr, len);
            // SAFETY: madvise only hints the kernel about pages of a live mapping.
            check(unsafe { libc::madvise(addr, len, flag) })
        }

        #[cfg(feature = "locking")]
        pub(crate) fn lock(ptr: *const u8, len: usize) -> io::Result<()> {
            let (addr, len) = page_span(ptr, len);
            // SAFETY: mlock pins pages of a live mapping without touching their contents.
            check(unsafe { libc::mlock(addr, len) })
        }

        #[cfg(feature = "locking")]
        pub(crate) fn unlock(ptr: *const u8, len: usize) -> io::Result<()> {
            let (addr, len) = page_span(ptr, len);
            // SAFETY: munlock releases pins on pages of a live mapping.
            check(unsafe { libc::munlock(addr, len) })
        }
    } else if #[cfg(windows)] {
        use core::ffi::c_void;

        #[cfg(feature = "locking")]
        /// ERROR_NOT_LOCKED: `VirtualUnlock` on pages that were never locked.
        const ERROR_NOT_LOCKED: i32 = 158;

        #[allow(non_snake_case, dead_code)]
        #[repr(C)]
        struct SYSTEM_INFO {
            wProcessorArchitecture: u16,
            wReserved: u16,
            dwPageSize: u32,
            lpMinimumApplicationAddress: *mut c_void,
            lpMaximumApplicationAddress: *mut c_void,
            dwActiveProcessorMask: usize,
            dwNumberOfProcessors: u32,
            dwProcessorType: u32,
            dwAllocationGranularity: u32,
            wProcessorLevel: u16,
            wProcessorRevision: u16,
        }

        #[cfg(feature = "advise")]
        #[allow(non_snake_case)]
        #[repr(C)]
        struct WIN32_MEMORY_RANGE_ENTRY {
            VirtualAddress: *mut c_void,
            NumberOfBytes: usize,
        }

        extern "system" {
            fn GetSystemInfo(lpSystemInfo: *mut SYSTEM_INFO);
            #[cfg(feature = "advise")]
            fn GetCurrentProcess() -> *mut c_void;
            #[cfg(feature = "advise")]
            fn PrefetchVirtualMemory(
                hProcess: *mut c_void,
                NumberOfEntries: usize,
                VirtualAddresses: *const WIN32_MEMORY_RANGE_ENTRY,
                Flags: u32,
            ) -> i32;
            #[cfg(feature = "locking")]
            fn VirtualLock(lpAddress: *const c_void, dwSize: usize) -> i32;
            #[cfg(feature = "locking")]
            fn VirtualUnlock(lpAddress: *const c_void, dwSize: usize) -> i32;
        }

        #[cfg(any(feature = "advise", feature = "locking"))]
        fn check(ret: i32) -> io::Result<()> {
            if ret == 0 {
                Err(io::Error::last_os_error())
            } else {
                Ok(())
            }
        }

        /// Get the system page size in bytes.
        #[must_use]
        pub fn page_size() -> usize {
            let mut info = std::mem::MaybeUninit::<SYSTEM_INFO>::uninit();
            // SAFETY: GetSystemInfo fills the whole struct and cannot fail.
            let info = unsafe {
                GetSystemInfo(info.as_mut_ptr());
                info.assume_init()
            };
            info.dwPageSize as usize
        }

        /// `FlushViewOfFile` has no invalidate flag; every mode writes the view,
        /// and the synchronous modes also wait on the file handle.
        pub(crate) fn flush(map: &MmapMut, mode: FlushMode) -> io::Result<()> {
            match mode {
                FlushMode::Async => map.flush_async(),
                FlushMode::Sync | FlushMode::SyncInvalidate => map.flush(),
            }
        }

        /// Only `WillNeed` has a counterpart (`PrefetchVirtualMemory`); the
        /// other hints are accepted and ignored.
        #[cfg(feature = "advise")]
        pub(crate) fn advise(ptr: *const u8, len: usize, advice: Advice) -> io::Result<()> {
            if !matches!(advice, Advice::WillNeed) {
                return Ok(());
            }
            let entry = WIN32_MEMORY_RANGE_ENTRY {
                VirtualAddress: ptr as *mut c_void,
                NumberOfBytes: len,
            };
            // SAFETY: the entry describes pages of a live mapping; prefetch only reads them in.
            check(unsafe { PrefetchVirtualMemory(GetCurrentProcess(), 1, &entry, 0) })
        }

        #[cfg(feature = "locking")]
        pub(crate) fn lock(ptr: *const u8, len: usize) -> io::Result<()> {
            // SAFETY: VirtualLock pins pages of a live mapping without touching their contents.
            check(unsafe { VirtualLock(ptr.cast(), len) })
        }

        #[cfg(feature = "locking")]
        pub(crate) fn unlock(ptr: *const u8, len: usize) -> io::Result<()> {
            // SAFETY: VirtualUnlock releases pins on pages of a live mapping.
            match check(unsafe { VirtualUnlock(ptr.cast(), len) }) {
                Err(err) if err.raw_os_error() == Some(ERROR_NOT_LOCKED) => Ok(()),
                other => other,
            }
        }
    } else {
        /// Get the system page size in bytes.
        #[must_use]
        pub fn page_size() -> usize {
            4096
        }

        pub(crate) fn flush(map: &MmapMut, mode: FlushMode) -> io::Result<()> {
            match mode {
                FlushMode::Async => map.flush_async(),
                FlushMode::Sync | FlushMode::SyncInvalidate => map.flush(),
            }
        }

        #[cfg(feature = "advise")]
        pub(crate) fn advise(_ptr: *const u8, _len: usize, _advice: Advice) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Unsupported, "madvise is not available on this platform"))
        }

        #[cfg(feature = "locking")]
        pub(crate) fn lock(_ptr: *const u8, _len: usize) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Unsupported, "mlock is not available on this platform"))
        }

        #[cfg(feature = "locking")]
        pub(crate) fn unlock(_ptr: *const u8, _len: usize) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Unsupported, "munlock is not available on this platform"))
        }
    }
}
