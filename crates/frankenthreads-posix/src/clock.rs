//! Clock adapter.
//!
//! Retrieves wall-clock and monotonic time in the normalized timespec
//! representation. On Unix hosts the native clock already counts from the
//! POSIX epoch and the reading passes through unchanged. On Windows hosts
//! the native wall clock reports filetime ticks (100 ns intervals since
//! 1601-01-01); the reading is translated to the POSIX epoch by the pure
//! arithmetic in `frankenthreads_core::time`.

use frankenthreads_core::errno;
use frankenthreads_core::time::{self, CLOCK_REALTIME, Timespec};

/// Reads the selected clock into `tp`.
///
/// Equivalent to C `clock_gettime` for the clocks this layer provides.
/// Returns EINVAL for an unrecognized clock id.
pub fn clock_gettime(clock_id: i32, tp: &mut Timespec) -> i32 {
    if !time::valid_clock_id(clock_id) {
        return errno::EINVAL;
    }
    native_clock_gettime(clock_id, tp)
}

#[cfg(unix)]
fn native_clock_gettime(clock_id: i32, tp: &mut Timespec) -> i32 {
    let native_id = if clock_id == CLOCK_REALTIME {
        libc::CLOCK_REALTIME
    } else {
        libc::CLOCK_MONOTONIC
    };

    let mut ts: libc::timespec = unsafe { std::mem::zeroed() };
    // SAFETY: valid pointer to local timespec storage.
    let rc = unsafe { libc::clock_gettime(native_id, &mut ts) };
    if rc != 0 {
        return errno::EINVAL;
    }

    tp.tv_sec = ts.tv_sec as i64;
    tp.tv_nsec = ts.tv_nsec as i64;
    0
}

#[cfg(windows)]
#[link(name = "kernel32")]
unsafe extern "system" {
    fn GetSystemTimeAsFileTime(system_time_as_file_time: *mut u32);
    fn GetTickCount64() -> u64;
}

#[cfg(windows)]
fn native_clock_gettime(clock_id: i32, tp: &mut Timespec) -> i32 {
    if clock_id == CLOCK_REALTIME {
        // [low, high] halves of the filetime tick count.
        let mut ft = [0u32; 2];
        // SAFETY: valid pointer to two u32 of filetime storage.
        unsafe { GetSystemTimeAsFileTime(ft.as_mut_ptr()) };
        let ticks = (ft[1] as u64) << 32 | ft[0] as u64;
        *tp = time::filetime_to_timespec(ticks);
    } else {
        // SAFETY: no arguments; returns milliseconds since boot.
        let ms = unsafe { GetTickCount64() };
        *tp = time::millis_to_timespec(ms);
    }
    0
}
