//! Named conformance scenarios.
//!
//! Each scenario exercises one contract of the adapter end to end and
//! reports evidence (the status code it observed, a short detail) or a
//! failure description. Scenarios never assert; the runner turns results
//! into outcomes and log entries.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use frankenthreads_core::errno;
use frankenthreads_core::pthread::{
    PTHREAD_CREATE_DETACHED, PthreadAttr, pthread_attr_destroy, pthread_attr_init,
    pthread_attr_setdetachstate,
};
use frankenthreads_core::time::{
    CLOCK_MONOTONIC, CLOCK_REALTIME, Timespec, millis_to_timespec, timespec_to_millis,
};
use frankenthreads_posix::{
    PthreadCond, PthreadMutex, PthreadT, clock_gettime, pthread_cond_init, pthread_cond_signal,
    pthread_cond_timedwait, pthread_cond_wait, pthread_create, pthread_join, pthread_mutex_destroy,
    pthread_mutex_init, pthread_mutex_lock, pthread_mutex_trylock, pthread_mutex_unlock,
};

/// Evidence gathered by a passing scenario.
#[derive(Debug, Default)]
pub struct ScenarioEvidence {
    /// Status code the scenario observed, when one is part of the contract.
    pub errno: Option<i32>,
    /// Short free-form description of what was observed.
    pub detail: Option<String>,
}

type ScenarioFn = fn() -> Result<ScenarioEvidence, String>;

/// A named conformance scenario.
pub struct Scenario {
    pub name: &'static str,
    pub run: ScenarioFn,
}

/// The full scenario suite, in execution order.
#[must_use]
pub fn all_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "mutex_lock_roundtrip",
            run: mutex_lock_roundtrip,
        },
        Scenario {
            name: "mutex_destroy_while_locked_rejected",
            run: mutex_destroy_while_locked_rejected,
        },
        Scenario {
            name: "attr_lifecycle_matrix",
            run: attr_lifecycle_matrix,
        },
        Scenario {
            name: "cond_signal_handshake",
            run: cond_signal_handshake,
        },
        Scenario {
            name: "timedwait_past_deadline",
            run: timedwait_past_deadline,
        },
        Scenario {
            name: "timedwait_elapses",
            run: timedwait_elapses,
        },
        Scenario {
            name: "timedwait_signaled_in_time",
            run: timedwait_signaled_in_time,
        },
        Scenario {
            name: "thread_joinable_sentinel",
            run: thread_joinable_sentinel,
        },
        Scenario {
            name: "thread_detached_side_effect",
            run: thread_detached_side_effect,
        },
        Scenario {
            name: "clock_monotonic_non_decreasing",
            run: clock_monotonic_non_decreasing,
        },
        Scenario {
            name: "clock_realtime_tracks_wall",
            run: clock_realtime_tracks_wall,
        },
    ]
}

fn check(cond: bool, msg: &str) -> Result<(), String> {
    if cond { Ok(()) } else { Err(msg.to_string()) }
}

fn expect_status(got: i32, want: i32, op: &str) -> Result<(), String> {
    if got == want {
        Ok(())
    } else {
        Err(format!("{op}: expected status {want}, got {got}"))
    }
}

fn realtime_deadline(offset_ms: i64) -> Result<Timespec, String> {
    let mut now = Timespec::default();
    expect_status(clock_gettime(CLOCK_REALTIME, &mut now), 0, "clock_gettime")?;
    Ok(millis_to_timespec(
        (timespec_to_millis(now) + offset_ms).max(0) as u64,
    ))
}

// ---------------------------------------------------------------------------
// Mutex
// ---------------------------------------------------------------------------

fn mutex_lock_roundtrip() -> Result<ScenarioEvidence, String> {
    let mutex = PthreadMutex::default();
    expect_status(pthread_mutex_init(&mutex), 0, "init")?;
    expect_status(pthread_mutex_lock(&mutex), 0, "lock")?;
    expect_status(pthread_mutex_trylock(&mutex), errno::EBUSY, "trylock-held")?;
    expect_status(pthread_mutex_unlock(&mutex), 0, "unlock")?;
    expect_status(pthread_mutex_destroy(&mutex), 0, "destroy")?;
    Ok(ScenarioEvidence {
        errno: Some(errno::EBUSY),
        detail: Some("trylock on a held mutex reported busy".into()),
    })
}

fn mutex_destroy_while_locked_rejected() -> Result<ScenarioEvidence, String> {
    let mutex = PthreadMutex::default();
    expect_status(pthread_mutex_init(&mutex), 0, "init")?;
    expect_status(pthread_mutex_lock(&mutex), 0, "lock")?;
    let rc = pthread_mutex_destroy(&mutex);
    expect_status(rc, errno::EINVAL, "destroy-while-locked")?;
    expect_status(pthread_mutex_unlock(&mutex), 0, "unlock")?;
    expect_status(pthread_mutex_destroy(&mutex), 0, "destroy-after-unlock")?;
    Ok(ScenarioEvidence {
        errno: Some(rc),
        detail: None,
    })
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

fn attr_lifecycle_matrix() -> Result<ScenarioEvidence, String> {
    let mut attr = PthreadAttr::default();
    let mut cases = 0usize;

    // Never-initialized attributes reject every mutation.
    expect_status(
        pthread_attr_setdetachstate(&mut attr, PTHREAD_CREATE_DETACHED),
        errno::EINVAL,
        "setdetachstate-uninitialized",
    )?;
    cases += 1;
    expect_status(
        pthread_attr_destroy(&mut attr),
        errno::EINVAL,
        "destroy-uninitialized",
    )?;
    cases += 1;

    // Initialized: both defined states accepted, everything else rejected.
    expect_status(pthread_attr_init(&mut attr), 0, "init")?;
    cases += 1;
    expect_status(
        pthread_attr_setdetachstate(&mut attr, PTHREAD_CREATE_DETACHED),
        0,
        "setdetachstate-detached",
    )?;
    cases += 1;
    for bad_state in [1, 2, 0x08, -1, i32::MAX] {
        expect_status(
            pthread_attr_setdetachstate(&mut attr, bad_state),
            errno::EINVAL,
            "setdetachstate-invalid",
        )?;
        cases += 1;
    }
    check(
        attr.detach_state() == PTHREAD_CREATE_DETACHED,
        "rejected states must not overwrite the stored detach state",
    )?;

    // Destroy invalidates; a second destroy is misuse; re-init recovers.
    expect_status(pthread_attr_destroy(&mut attr), 0, "destroy")?;
    cases += 1;
    expect_status(
        pthread_attr_destroy(&mut attr),
        errno::EINVAL,
        "double-destroy",
    )?;
    cases += 1;
    expect_status(pthread_attr_init(&mut attr), 0, "reinit")?;
    cases += 1;

    Ok(ScenarioEvidence {
        errno: None,
        detail: Some(format!("{cases} lifecycle transitions verified")),
    })
}

// ---------------------------------------------------------------------------
// Condition variable
// ---------------------------------------------------------------------------

struct Rendezvous {
    mutex: PthreadMutex,
    cond: PthreadCond,
    flag: AtomicBool,
}

impl Rendezvous {
    fn new() -> Result<Arc<Self>, String> {
        let shared = Arc::new(Self {
            mutex: PthreadMutex::default(),
            cond: PthreadCond::default(),
            flag: AtomicBool::new(false),
        });
        expect_status(pthread_mutex_init(&shared.mutex), 0, "mutex_init")?;
        expect_status(pthread_cond_init(&shared.cond), 0, "cond_init")?;
        Ok(shared)
    }
}

fn cond_signal_handshake() -> Result<ScenarioEvidence, String> {
    let shared = Rendezvous::new()?;
    expect_status(pthread_mutex_lock(&shared.mutex), 0, "waiter-lock")?;

    let signaler = Arc::clone(&shared);
    let handle = thread::spawn(move || {
        let mut rc = pthread_mutex_lock(&signaler.mutex);
        if rc == 0 {
            signaler.flag.store(true, Ordering::Release);
            rc = pthread_cond_signal(&signaler.cond);
            let unlock_rc = pthread_mutex_unlock(&signaler.mutex);
            if rc == 0 {
                rc = unlock_rc;
            }
        }
        rc
    });

    while !shared.flag.load(Ordering::Acquire) {
        expect_status(pthread_cond_wait(&shared.cond, &shared.mutex), 0, "wait")?;
    }
    expect_status(pthread_mutex_unlock(&shared.mutex), 0, "waiter-unlock")?;

    let signaler_rc = handle.join().map_err(|_| "signaler panicked".to_string())?;
    expect_status(signaler_rc, 0, "signaler")?;
    Ok(ScenarioEvidence {
        errno: None,
        detail: Some("waiter observed the flag set after wake".into()),
    })
}

fn timedwait_past_deadline() -> Result<ScenarioEvidence, String> {
    let shared = Rendezvous::new()?;
    let deadline = realtime_deadline(-1_000)?;
    expect_status(pthread_mutex_lock(&shared.mutex), 0, "lock")?;

    let started = Instant::now();
    let rc = pthread_cond_timedwait(&shared.cond, &shared.mutex, deadline);
    let elapsed = started.elapsed();

    expect_status(rc, errno::ETIMEDOUT, "timedwait-past-deadline")?;
    expect_status(pthread_mutex_unlock(&shared.mutex), 0, "unlock")?;
    check(
        elapsed < Duration::from_millis(250),
        "past deadline must not block",
    )?;
    Ok(ScenarioEvidence {
        errno: Some(rc),
        detail: Some(format!("returned in {}ms", elapsed.as_millis())),
    })
}

fn timedwait_elapses() -> Result<ScenarioEvidence, String> {
    let shared = Rendezvous::new()?;
    let deadline = realtime_deadline(200)?;
    expect_status(pthread_mutex_lock(&shared.mutex), 0, "lock")?;

    let started = Instant::now();
    let rc = pthread_cond_timedwait(&shared.cond, &shared.mutex, deadline);
    let elapsed = started.elapsed();

    expect_status(rc, errno::ETIMEDOUT, "timedwait-unsignaled")?;
    expect_status(pthread_mutex_unlock(&shared.mutex), 0, "unlock")?;
    check(
        elapsed >= Duration::from_millis(190),
        "wait must not expire before the deadline",
    )?;
    check(
        elapsed < Duration::from_secs(2),
        "wait overshot the deadline",
    )?;
    Ok(ScenarioEvidence {
        errno: Some(rc),
        detail: Some(format!("200ms deadline elapsed in {}ms", elapsed.as_millis())),
    })
}

fn timedwait_signaled_in_time() -> Result<ScenarioEvidence, String> {
    let shared = Rendezvous::new()?;
    let signaler = Arc::clone(&shared);
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        let mut rc = pthread_mutex_lock(&signaler.mutex);
        if rc == 0 {
            signaler.flag.store(true, Ordering::Release);
            rc = pthread_cond_signal(&signaler.cond);
            let unlock_rc = pthread_mutex_unlock(&signaler.mutex);
            if rc == 0 {
                rc = unlock_rc;
            }
        }
        rc
    });

    expect_status(pthread_mutex_lock(&shared.mutex), 0, "lock")?;
    while !shared.flag.load(Ordering::Acquire) {
        let deadline = realtime_deadline(5_000)?;
        let rc = pthread_cond_timedwait(&shared.cond, &shared.mutex, deadline);
        expect_status(rc, 0, "timedwait-before-deadline")?;
    }
    expect_status(pthread_mutex_unlock(&shared.mutex), 0, "unlock")?;

    let signaler_rc = handle.join().map_err(|_| "signaler panicked".to_string())?;
    expect_status(signaler_rc, 0, "signaler")?;
    Ok(ScenarioEvidence {
        errno: Some(0),
        detail: Some("signal arrived before the deadline".into()),
    })
}

// ---------------------------------------------------------------------------
// Threads
// ---------------------------------------------------------------------------

unsafe extern "C" fn echo_routine(arg: *mut std::ffi::c_void) -> *mut std::ffi::c_void {
    arg
}

unsafe extern "C" fn flag_routine(arg: *mut std::ffi::c_void) -> *mut std::ffi::c_void {
    let flag = unsafe { &*(arg as *const AtomicU32) };
    flag.store(1, Ordering::Release);
    std::ptr::null_mut()
}

fn thread_joinable_sentinel() -> Result<ScenarioEvidence, String> {
    let sentinel = 0x5EED_CAFEusize;
    let mut handle: PthreadT = 0;
    // SAFETY: echo_routine is a valid C-ABI function; the argument is a
    // plain integer smuggled through the pointer.
    let rc = unsafe {
        pthread_create(
            &mut handle,
            None,
            echo_routine,
            sentinel as *mut std::ffi::c_void,
        )
    };
    expect_status(rc, 0, "create")?;
    check(handle != 0, "joinable creation must yield a live handle")?;

    let mut retval: *mut std::ffi::c_void = std::ptr::null_mut();
    expect_status(pthread_join(handle, Some(&mut retval)), 0, "join")?;
    check(
        retval as usize == sentinel,
        "joined exit value must be the routine's return",
    )?;
    Ok(ScenarioEvidence {
        errno: None,
        detail: Some("exit value round-tripped through join".into()),
    })
}

fn thread_detached_side_effect() -> Result<ScenarioEvidence, String> {
    let flag: &'static AtomicU32 = Box::leak(Box::new(AtomicU32::new(0)));
    let mut attr = PthreadAttr::default();
    expect_status(pthread_attr_init(&mut attr), 0, "attr_init")?;
    expect_status(
        pthread_attr_setdetachstate(&mut attr, PTHREAD_CREATE_DETACHED),
        0,
        "setdetachstate",
    )?;

    let mut handle: PthreadT = 99;
    // SAFETY: flag_routine is a valid C-ABI function; the flag is leaked and
    // outlives the detached thread.
    let rc = unsafe {
        pthread_create(
            &mut handle,
            Some(&attr),
            flag_routine,
            flag as *const AtomicU32 as *mut std::ffi::c_void,
        )
    };
    expect_status(rc, 0, "create")?;
    check(handle == 0, "detached creation must yield the null handle")?;

    let deadline = Instant::now() + Duration::from_secs(5);
    while flag.load(Ordering::Acquire) == 0 {
        if Instant::now() >= deadline {
            return Err("detached routine never ran".into());
        }
        thread::sleep(Duration::from_millis(1));
    }
    Ok(ScenarioEvidence {
        errno: None,
        detail: Some("detached routine completed independently".into()),
    })
}

// ---------------------------------------------------------------------------
// Clocks
// ---------------------------------------------------------------------------

fn clock_monotonic_non_decreasing() -> Result<ScenarioEvidence, String> {
    let mut prev = Timespec::default();
    expect_status(clock_gettime(CLOCK_MONOTONIC, &mut prev), 0, "clock_gettime")?;
    for _ in 0..50 {
        let mut next = Timespec::default();
        expect_status(clock_gettime(CLOCK_MONOTONIC, &mut next), 0, "clock_gettime")?;
        check(
            (next.tv_sec, next.tv_nsec) >= (prev.tv_sec, prev.tv_nsec),
            "monotonic clock went backwards",
        )?;
        prev = next;
    }
    Ok(ScenarioEvidence {
        errno: None,
        detail: Some("50 sequential readings, none regressed".into()),
    })
}

fn clock_realtime_tracks_wall() -> Result<ScenarioEvidence, String> {
    let mut ts = Timespec::default();
    expect_status(clock_gettime(CLOCK_REALTIME, &mut ts), 0, "clock_gettime")?;
    let system_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|_| "host clock before the epoch".to_string())?
        .as_millis() as i64;

    let delta = (timespec_to_millis(ts) - system_ms).abs();
    check(delta < 2_000, "realtime reading drifted from the wall clock")?;

    let mut bogus = Timespec::default();
    expect_status(
        clock_gettime(7, &mut bogus),
        errno::EINVAL,
        "clock_gettime-unknown-id",
    )?;
    Ok(ScenarioEvidence {
        errno: Some(errno::EINVAL),
        detail: Some(format!("wall-clock delta {delta}ms")),
    })
}
