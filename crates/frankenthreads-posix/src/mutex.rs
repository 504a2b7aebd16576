//! POSIX mutex operations.
//!
//! Wraps the native lock primitive behind the pthread mutex contract. The
//! lock state is a single word: 0 unlocked, 1 locked, 2 locked with at
//! least one past or present waiter. Uncontended transitions are a CAS;
//! contended ones park on the futex plumbing.

use std::sync::atomic::{AtomicU32, Ordering};

use frankenthreads_core::errno;

use crate::futex;

const UNLOCKED: u32 = 0;
const LOCKED: u32 = 1;
const CONTENDED: u32 = 2;

/// Opaque mutex handle. The caller owns the storage; the native
/// representation never escapes this module.
#[derive(Debug, Default)]
pub struct PthreadMutex {
    word: AtomicU32,
}

/// Initializes a mutex for use.
///
/// Equivalent to C `pthread_mutex_init`. Always succeeds.
pub fn pthread_mutex_init(mutex: &PthreadMutex) -> i32 {
    mutex.word.store(UNLOCKED, Ordering::Release);
    0
}

/// Releases a mutex's native resources.
///
/// Equivalent to C `pthread_mutex_destroy`. Destroying a mutex that is
/// currently locked is misuse and reports EINVAL.
pub fn pthread_mutex_destroy(mutex: &PthreadMutex) -> i32 {
    if mutex.word.load(Ordering::Acquire) != UNLOCKED {
        return errno::EINVAL;
    }
    0
}

/// Locks a mutex, blocking the calling thread until acquired.
///
/// Equivalent to C `pthread_mutex_lock`. Returns 0 under normal operation.
/// No fairness ordering is guaranteed among blocked callers.
pub fn pthread_mutex_lock(mutex: &PthreadMutex) -> i32 {
    if mutex
        .word
        .compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
        .is_ok()
    {
        return 0;
    }

    loop {
        let observed = mutex.word.load(Ordering::Relaxed);
        if observed == UNLOCKED {
            if mutex
                .word
                .compare_exchange(UNLOCKED, CONTENDED, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                return 0;
            }
            continue;
        }

        if observed == LOCKED {
            let _ = mutex.word.compare_exchange(
                LOCKED,
                CONTENDED,
                Ordering::Acquire,
                Ordering::Relaxed,
            );
        }

        let rc = futex::wait(&mutex.word, CONTENDED, None);
        if rc == 0 || rc == errno::EAGAIN || rc == errno::EINTR {
            continue;
        }
        return rc;
    }
}

/// Attempts to lock a mutex without blocking.
///
/// Equivalent to C `pthread_mutex_trylock`. Returns EBUSY when the mutex is
/// already held.
pub fn pthread_mutex_trylock(mutex: &PthreadMutex) -> i32 {
    if mutex
        .word
        .compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
        .is_ok()
    {
        0
    } else {
        errno::EBUSY
    }
}

/// Unlocks a mutex held by the calling thread.
///
/// Equivalent to C `pthread_mutex_unlock`. Unlocking a mutex that is not
/// locked is misuse and reports EINVAL.
pub fn pthread_mutex_unlock(mutex: &PthreadMutex) -> i32 {
    match mutex.word.swap(UNLOCKED, Ordering::Release) {
        UNLOCKED => errno::EINVAL,
        LOCKED => 0,
        _ => {
            futex::wake(&mutex.word, 1);
            0
        }
    }
}
