//! POSIX thread creation and identity.
//!
//! Starts native threads running a caller-supplied C-ABI start routine.
//! The `{routine, argument}` pair travels in a boxed closure owned by
//! exactly one party at a time: the creating call until the spawn hands it
//! to the new thread, then the trampoline, which releases it after the
//! routine returns. Joinable threads get a non-null `u64` handle backed by
//! a process-wide join table; detached threads get the null handle and run
//! to completion independently.

use std::cell::Cell;
use std::collections::HashMap;
use std::ffi::c_void;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::thread;

use frankenthreads_core::errno;
use frankenthreads_core::pthread::{PTHREAD_CREATE_DETACHED, PthreadAttr, valid_detach_state};

/// Opaque thread handle. 0 is the null handle, issued exactly when the
/// thread was created detached.
pub type PthreadT = u64;

/// Start routine signature shared with C callers.
pub type StartRoutine = unsafe extern "C" fn(*mut c_void) -> *mut c_void;

/// Transient carrier of the start routine and its argument. Moved into the
/// spawned thread's trampoline, which is its sole and final owner.
struct StartClosure {
    start: StartRoutine,
    arg: usize,
}

type JoinTable = HashMap<PthreadT, thread::JoinHandle<usize>>;

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static SELF_ID: Cell<PthreadT> = const { Cell::new(0) };
}

fn join_table() -> &'static Mutex<JoinTable> {
    static TABLE: OnceLock<Mutex<JoinTable>> = OnceLock::new();
    TABLE.get_or_init(|| Mutex::new(HashMap::new()))
}

fn lock_join_table() -> std::sync::MutexGuard<'static, JoinTable> {
    match join_table().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn fresh_thread_id() -> PthreadT {
    NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed)
}

/// Fixed entry point for every created thread: record identity, invoke the
/// start routine, release the closure, and make the routine's result the
/// thread's exit value.
fn trampoline(closure: Box<StartClosure>, id: PthreadT) -> usize {
    SELF_ID.with(|slot| slot.set(id));
    // SAFETY: the create contract supplies a valid start routine; the
    // argument is the caller's opaque pointer, valid for the thread's
    // lifetime.
    let retval = unsafe { (closure.start)(closure.arg as *mut c_void) };
    drop(closure);
    retval as usize
}

/// Creates a native thread running `start(arg)`.
///
/// Equivalent to C `pthread_create`. With attributes requesting
/// PTHREAD_CREATE_DETACHED the native handle is released immediately and
/// `thread_out` is the null handle; otherwise `thread_out` references the
/// running thread and the caller must eventually close it via
/// [`pthread_join`] or [`pthread_detach`]. Attributes carrying an
/// unrecognized detach state (including never-initialized attributes) are
/// misuse: EINVAL. Native spawn failure maps to EAGAIN, ENOMEM, or EINVAL.
///
/// # Safety
///
/// `start` must be a valid C-ABI function and `arg` must remain valid for
/// the lifetime of the new thread.
pub unsafe fn pthread_create(
    thread_out: &mut PthreadT,
    attr: Option<&PthreadAttr>,
    start: StartRoutine,
    arg: *mut c_void,
) -> i32 {
    let detached = match attr {
        None => false,
        Some(a) if valid_detach_state(a.detach_state()) => {
            a.detach_state() == PTHREAD_CREATE_DETACHED
        }
        Some(_) => return errno::EINVAL,
    };

    let id = fresh_thread_id();
    let closure = Box::new(StartClosure {
        start,
        arg: arg as usize,
    });

    match thread::Builder::new().spawn(move || trampoline(closure, id)) {
        Ok(handle) => {
            if detached {
                drop(handle);
                *thread_out = 0;
            } else {
                lock_join_table().insert(id, handle);
                *thread_out = id;
            }
            0
        }
        // The spawn consumed and dropped the closure; map the native error.
        Err(err) => match err.raw_os_error() {
            Some(code) if code == libc::EAGAIN => errno::EAGAIN,
            Some(code) if code == libc::ENOMEM => errno::ENOMEM,
            _ => errno::EINVAL,
        },
    }
}

/// Waits for a joinable thread and surfaces its exit value.
///
/// Returns ESRCH for the null handle, an unknown handle, or a handle that
/// was already joined or detached; EDEADLK when the thread terminated by
/// panic instead of returning.
pub fn pthread_join(thread: PthreadT, retval: Option<&mut *mut c_void>) -> i32 {
    let handle = lock_join_table().remove(&thread);
    let Some(handle) = handle else {
        return errno::ESRCH;
    };

    match handle.join() {
        Ok(rv) => {
            if let Some(out) = retval {
                *out = rv as *mut c_void;
            }
            0
        }
        Err(_) => errno::EDEADLK,
    }
}

/// Releases a joinable thread's handle; the thread runs to completion
/// independently. Returns ESRCH when the handle is not joinable.
pub fn pthread_detach(thread: PthreadT) -> i32 {
    match lock_join_table().remove(&thread) {
        Some(handle) => {
            drop(handle);
            0
        }
        None => errno::ESRCH,
    }
}

/// Identity of the calling thread, consistent with handles issued by
/// [`pthread_create`].
#[must_use]
pub fn pthread_self() -> PthreadT {
    SELF_ID.with(|slot| {
        let existing = slot.get();
        if existing != 0 {
            return existing;
        }
        let id = fresh_thread_id();
        slot.set(id);
        id
    })
}

/// Compares two thread identities. Returns nonzero when equal.
#[must_use]
pub fn pthread_equal(a: PthreadT, b: PthreadT) -> i32 {
    i32::from(a == b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use frankenthreads_core::pthread::{pthread_attr_init, pthread_attr_setdetachstate};
    use std::sync::atomic::AtomicU32;
    use std::time::{Duration, Instant};

    unsafe extern "C" fn echo_start(arg: *mut c_void) -> *mut c_void {
        arg
    }

    unsafe extern "C" fn flag_start(arg: *mut c_void) -> *mut c_void {
        let flag = unsafe { &*(arg as *const AtomicU32) };
        flag.store(42, Ordering::Release);
        std::ptr::null_mut()
    }

    fn wait_for_flag(flag: &AtomicU32, value: u32) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if flag.load(Ordering::Acquire) == value {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        false
    }

    #[test]
    fn create_and_join_returns_routine_value() {
        let sentinel = 0xDEAD_BEEFusize;
        let mut handle: PthreadT = 0;
        let rc =
            unsafe { pthread_create(&mut handle, None, echo_start, sentinel as *mut c_void) };
        assert_eq!(rc, 0);
        assert_ne!(handle, 0, "joinable creation must yield a live handle");

        let mut retval: *mut c_void = std::ptr::null_mut();
        assert_eq!(pthread_join(handle, Some(&mut retval)), 0);
        assert_eq!(retval as usize, sentinel);
    }

    #[test]
    fn detached_create_yields_null_handle_and_still_runs() {
        let flag: &'static AtomicU32 = Box::leak(Box::new(AtomicU32::new(0)));
        let mut attr = PthreadAttr::default();
        pthread_attr_init(&mut attr);
        assert_eq!(
            pthread_attr_setdetachstate(&mut attr, PTHREAD_CREATE_DETACHED),
            0
        );

        let mut handle: PthreadT = 7;
        let rc = unsafe {
            pthread_create(
                &mut handle,
                Some(&attr),
                flag_start,
                flag as *const AtomicU32 as *mut c_void,
            )
        };
        assert_eq!(rc, 0);
        assert_eq!(handle, 0, "detached creation must yield the null handle");
        assert!(wait_for_flag(flag, 42), "detached routine never ran");
    }

    #[test]
    fn uninitialized_attrs_are_rejected() {
        let attr = PthreadAttr::default();
        let mut handle: PthreadT = 0;
        let rc = unsafe {
            pthread_create(&mut handle, Some(&attr), echo_start, std::ptr::null_mut())
        };
        assert_eq!(rc, errno::EINVAL);
    }

    #[test]
    fn join_unknown_handle_is_esrch() {
        assert_eq!(pthread_join(0, None), errno::ESRCH);
        assert_eq!(pthread_join(u64::MAX, None), errno::ESRCH);
    }

    #[test]
    fn detach_then_join_is_esrch() {
        let flag: &'static AtomicU32 = Box::leak(Box::new(AtomicU32::new(0)));
        let mut handle: PthreadT = 0;
        let rc = unsafe {
            pthread_create(
                &mut handle,
                None,
                flag_start,
                flag as *const AtomicU32 as *mut c_void,
            )
        };
        assert_eq!(rc, 0);
        assert_eq!(pthread_detach(handle), 0);
        assert_eq!(pthread_join(handle, None), errno::ESRCH);
        assert!(wait_for_flag(flag, 42));
    }

    #[test]
    fn self_is_stable_and_equal_works() {
        let a = pthread_self();
        let b = pthread_self();
        assert_ne!(a, 0);
        assert_ne!(pthread_equal(a, b), 0);
        assert_eq!(pthread_equal(a, a + 1), 0);
    }
}
