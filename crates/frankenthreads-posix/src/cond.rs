//! POSIX condition variable operations.
//!
//! Wraps the native wait/wake primitive behind the pthread condition
//! variable contract. The native state is a single wake-sequence word:
//! waiters snapshot it while still holding the caller's mutex, release the
//! mutex, and park until the sequence moves on. Signal and broadcast bump
//! the sequence and wake one or all parked waiters.
//!
//! Timed waits take an absolute CLOCK_REALTIME deadline; the native wait
//! accepts only a relative duration, so the deadline is converted through
//! `frankenthreads_core::time::relative_timeout_ms` against a fresh clock
//! reading.

use std::sync::atomic::{AtomicU32, Ordering};

use frankenthreads_core::errno;
use frankenthreads_core::time::{CLOCK_REALTIME, Timespec, millis_to_timespec, relative_timeout_ms};

use crate::futex;
use crate::mutex::{PthreadMutex, pthread_mutex_lock, pthread_mutex_unlock};

/// Opaque condition variable handle. Never owned by any thread; a
/// rendezvous point whose correctness depends on callers holding the
/// associated mutex around wait and signal.
#[derive(Debug, Default)]
pub struct PthreadCond {
    seq: AtomicU32,
}

/// Initializes a condition variable.
///
/// Equivalent to C `pthread_cond_init`. Always succeeds.
pub fn pthread_cond_init(cond: &PthreadCond) -> i32 {
    cond.seq.store(0, Ordering::Release);
    0
}

/// Destroys a condition variable.
///
/// The native primitive needs no teardown; the callable exists for
/// interface symmetry and always returns 0.
pub fn pthread_cond_destroy(_cond: &PthreadCond) -> i32 {
    0
}

/// Wakes at least one waiter. Which waiter wakes is the native primitive's
/// choice; no FIFO ordering is guaranteed.
///
/// Equivalent to C `pthread_cond_signal`.
pub fn pthread_cond_signal(cond: &PthreadCond) -> i32 {
    cond.seq.fetch_add(1, Ordering::Release);
    futex::wake(&cond.seq, 1);
    0
}

/// Wakes every current waiter.
///
/// Equivalent to C `pthread_cond_broadcast`.
pub fn pthread_cond_broadcast(cond: &PthreadCond) -> i32 {
    cond.seq.fetch_add(1, Ordering::Release);
    futex::wake(&cond.seq, i32::MAX);
    0
}

/// Shared wait path: snapshot the sequence under the caller's mutex,
/// release it, park, reacquire. `timeout_ms` of `None` waits indefinitely.
fn wait_inner(cond: &PthreadCond, mutex: &PthreadMutex, timeout_ms: Option<u64>) -> i32 {
    let snapshot = cond.seq.load(Ordering::Acquire);

    let rc = pthread_mutex_unlock(mutex);
    if rc != 0 {
        // Caller did not hold the mutex.
        return rc;
    }

    let wait_rc = futex::wait(&cond.seq, snapshot, timeout_ms.map(millis_to_timespec));
    let status = match wait_rc {
        0 => 0,
        // Sequence moved before parking, or the sleep was interrupted.
        // Both surface as a (possibly spurious) wakeup.
        rc if rc == errno::EAGAIN || rc == errno::EINTR => 0,
        rc if rc == errno::ETIMEDOUT => errno::ETIMEDOUT,
        _ => errno::EINVAL,
    };

    let rc = pthread_mutex_lock(mutex);
    if rc != 0 {
        return rc;
    }
    status
}

/// Atomically releases `mutex` and blocks until signaled, then reacquires
/// `mutex` before returning.
///
/// Equivalent to C `pthread_cond_wait`. The caller must hold `mutex`.
/// Spurious wakeups are permitted; callers re-check their predicate.
pub fn pthread_cond_wait(cond: &PthreadCond, mutex: &PthreadMutex) -> i32 {
    wait_inner(cond, mutex, None)
}

/// Like [`pthread_cond_wait`], but gives up once the absolute
/// CLOCK_REALTIME `deadline` passes, returning ETIMEDOUT.
///
/// Equivalent to C `pthread_cond_timedwait`. A deadline already in the past
/// yields a zero-length native wait; the wait is still issued, so the
/// release/reacquire semantics hold. Sub-millisecond deadline precision is
/// truncated; the wait never extends past the requested time.
pub fn pthread_cond_timedwait(cond: &PthreadCond, mutex: &PthreadMutex, deadline: Timespec) -> i32 {
    let mut now = Timespec::default();
    if crate::clock::clock_gettime(CLOCK_REALTIME, &mut now) != 0 {
        return errno::EINVAL;
    }
    wait_inner(cond, mutex, Some(relative_timeout_ms(deadline, now)))
}
