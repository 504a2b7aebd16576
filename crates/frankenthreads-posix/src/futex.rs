//! Futex wait/wake plumbing shared by the mutex and condition-variable
//! adapters.
//!
//! On Linux the wait parks the calling thread in the kernel until the word
//! changes, a wake arrives, or the relative timeout expires. Elsewhere a
//! sleep-poll loop stands in: waiters re-check the word on a millisecond
//! cadence, so wakes need no kernel call at all.

use std::sync::atomic::AtomicU32;

use frankenthreads_core::errno;
use frankenthreads_core::time::Timespec;

/// Block while `*word == expected`, for at most `timeout` (relative) when
/// given.
///
/// Returns 0 when woken or when the word no longer matched on entry is
/// reported by the fallback; otherwise the raw errno from the native call
/// (`EAGAIN` for a stale expectation, `EINTR` for an interrupted sleep,
/// `ETIMEDOUT` on expiry).
#[cfg(target_os = "linux")]
pub(crate) fn wait(word: &AtomicU32, expected: u32, timeout: Option<Timespec>) -> i32 {
    let mut ts: libc::timespec = unsafe { std::mem::zeroed() };
    let ts_ptr = match timeout {
        Some(t) => {
            ts.tv_sec = t.tv_sec as libc::time_t;
            ts.tv_nsec = t.tv_nsec as libc::c_long;
            &ts as *const libc::timespec
        }
        None => std::ptr::null(),
    };

    // SAFETY: Linux futex syscall on a valid, aligned userspace word; the
    // timeout pointer is either null or a live local timespec.
    let rc = unsafe {
        libc::syscall(
            libc::SYS_futex,
            word as *const AtomicU32 as *const u32,
            libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG,
            expected,
            ts_ptr,
        )
    };
    if rc == 0 {
        0
    } else {
        std::io::Error::last_os_error()
            .raw_os_error()
            .unwrap_or(errno::EINVAL)
    }
}

/// Wake up to `count` threads parked on `word`.
#[cfg(target_os = "linux")]
pub(crate) fn wake(word: &AtomicU32, count: i32) {
    // SAFETY: Linux futex syscall on a valid, aligned userspace word.
    let _ = unsafe {
        libc::syscall(
            libc::SYS_futex,
            word as *const AtomicU32 as *const u32,
            libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG,
            count,
        )
    };
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn wait(word: &AtomicU32, expected: u32, timeout: Option<Timespec>) -> i32 {
    use std::sync::atomic::Ordering;
    use std::time::{Duration, Instant};

    let deadline = timeout
        .map(|t| Instant::now() + Duration::new(t.tv_sec.max(0) as u64, t.tv_nsec as u32));
    loop {
        if word.load(Ordering::Acquire) != expected {
            return 0;
        }
        if let Some(d) = deadline
            && Instant::now() >= d
        {
            return errno::ETIMEDOUT;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn wake(_word: &AtomicU32, _count: i32) {
    // Sleep-polling waiters observe the store directly.
}
