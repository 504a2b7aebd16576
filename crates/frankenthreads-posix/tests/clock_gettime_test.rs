//! Clock adapter behavior against independent time sources.

use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use frankenthreads_core::time::{CLOCK_MONOTONIC, CLOCK_REALTIME, Timespec, timespec_to_millis};
use frankenthreads_posix::clock_gettime;

fn read(clock_id: i32) -> Timespec {
    let mut ts = Timespec::default();
    assert_eq!(clock_gettime(clock_id, &mut ts), 0);
    ts
}

#[test]
fn realtime_tracks_independent_wall_clock() {
    let ours = read(CLOCK_REALTIME);
    let system = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("host clock before the epoch");

    let delta = (timespec_to_millis(ours) - system.as_millis() as i64).abs();
    assert!(
        delta < 2_000,
        "realtime reading drifted {delta}ms from SystemTime"
    );
}

#[test]
fn realtime_advances_by_elapsed_offset() {
    let before = read(CLOCK_REALTIME);
    thread::sleep(Duration::from_millis(100));
    let after = read(CLOCK_REALTIME);

    let advanced = timespec_to_millis(after) - timespec_to_millis(before);
    assert!(
        (50..5_000).contains(&advanced),
        "realtime advanced {advanced}ms across a 100ms sleep"
    );
}

#[test]
fn monotonic_measures_elapsed_sleep() {
    let before = read(CLOCK_MONOTONIC);
    thread::sleep(Duration::from_millis(100));
    let after = read(CLOCK_MONOTONIC);

    let advanced = timespec_to_millis(after) - timespec_to_millis(before);
    assert!(
        advanced >= 90,
        "monotonic advanced only {advanced}ms across a 100ms sleep"
    );
}
