//! Time arithmetic and clock validation.
//!
//! Implements the pure half of the clock adapter: the normalized timespec
//! representation, clock-id validators, conversion between a filetime-style
//! native time base (100 ns ticks since 1601-01-01) and the POSIX epoch, and
//! the absolute-deadline to relative-timeout conversion used by timed waits.
//! Actual clock reads live in `frankenthreads-posix`.

/// Represents a timespec value (seconds + nanoseconds).
///
/// `tv_nsec` is 0 to 999_999_999 by convention; the range is not enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timespec {
    /// Seconds.
    pub tv_sec: i64,
    /// Nanoseconds.
    pub tv_nsec: i64,
}

/// Clock identifiers for `clock_gettime`.
pub const CLOCK_REALTIME: i32 = 0;
pub const CLOCK_MONOTONIC: i32 = 1;

/// Returns `true` if `clock_id` is a clock this layer provides.
#[inline]
#[must_use]
pub const fn valid_clock_id(clock_id: i32) -> bool {
    matches!(clock_id, CLOCK_REALTIME | CLOCK_MONOTONIC)
}

// ---------------------------------------------------------------------------
// Epoch translation (filetime-style native time base)
// ---------------------------------------------------------------------------

/// 100 ns ticks between 1601-01-01 and 1970-01-01, the distance between the
/// filetime epoch and the POSIX epoch.
pub const FILETIME_UNIX_EPOCH_OFFSET: u64 = 116_444_736_000_000_000;

/// Filetime ticks per second (one tick is 100 ns).
const FILETIME_TICKS_PER_SEC: i64 = 10_000_000;

/// Translate a filetime-style tick count into a POSIX-epoch timespec.
///
/// Pre-1970 instants floor toward negative seconds, keeping `tv_nsec`
/// non-negative.
#[must_use]
pub fn filetime_to_timespec(ticks: u64) -> Timespec {
    let rel = ticks as i64 - FILETIME_UNIX_EPOCH_OFFSET as i64;
    Timespec {
        tv_sec: rel.div_euclid(FILETIME_TICKS_PER_SEC),
        tv_nsec: rel.rem_euclid(FILETIME_TICKS_PER_SEC) * 100,
    }
}

// ---------------------------------------------------------------------------
// Deadline arithmetic
// ---------------------------------------------------------------------------

/// Whole milliseconds in `ts`, truncating sub-millisecond precision toward
/// zero.
#[must_use]
pub fn timespec_to_millis(ts: Timespec) -> i64 {
    ts.tv_sec
        .saturating_mul(1_000)
        .saturating_add(ts.tv_nsec / 1_000_000)
}

/// Millisecond count expanded back into a timespec, for native wait calls
/// that take a relative timespec.
#[must_use]
pub fn millis_to_timespec(ms: u64) -> Timespec {
    Timespec {
        tv_sec: (ms / 1_000) as i64,
        tv_nsec: (ms % 1_000) as i64 * 1_000_000,
    }
}

/// Convert an absolute deadline into the relative millisecond budget for a
/// native wait primitive, measured against `now`.
///
/// A deadline at or before `now` yields 0; the caller still issues the
/// native wait so the release/reacquire semantics of a timed wait hold.
/// Both sides truncate fractional milliseconds toward zero, so the wait
/// never extends past the caller's requested deadline.
#[must_use]
pub fn relative_timeout_ms(deadline: Timespec, now: Timespec) -> u64 {
    let target_ms = timespec_to_millis(deadline);
    let now_ms = timespec_to_millis(now);
    if target_ms <= now_ms {
        0
    } else {
        (target_ms - now_ms) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_clock_id() {
        assert!(valid_clock_id(CLOCK_REALTIME));
        assert!(valid_clock_id(CLOCK_MONOTONIC));
        assert!(!valid_clock_id(-1));
        assert!(!valid_clock_id(2));
        assert!(!valid_clock_id(99));
    }

    #[test]
    fn filetime_epoch_origin_maps_to_unix_zero() {
        let ts = filetime_to_timespec(FILETIME_UNIX_EPOCH_OFFSET);
        assert_eq!(ts, Timespec::default());
    }

    #[test]
    fn filetime_single_tick_is_100ns() {
        let ts = filetime_to_timespec(FILETIME_UNIX_EPOCH_OFFSET + 1);
        assert_eq!(ts.tv_sec, 0);
        assert_eq!(ts.tv_nsec, 100);
    }

    #[test]
    fn filetime_whole_second() {
        let ts = filetime_to_timespec(FILETIME_UNIX_EPOCH_OFFSET + 10_000_000);
        assert_eq!(ts.tv_sec, 1);
        assert_eq!(ts.tv_nsec, 0);
    }

    #[test]
    fn filetime_known_timestamp() {
        // 2024-01-01 00:00:00 UTC = 1704067200 seconds after the epoch
        let ticks = FILETIME_UNIX_EPOCH_OFFSET + 1_704_067_200 * 10_000_000;
        let ts = filetime_to_timespec(ticks);
        assert_eq!(ts.tv_sec, 1_704_067_200);
        assert_eq!(ts.tv_nsec, 0);
    }

    #[test]
    fn filetime_pre_epoch_floors() {
        // One tick before the Unix epoch: 1969-12-31 23:59:59.9999999
        let ts = filetime_to_timespec(FILETIME_UNIX_EPOCH_OFFSET - 1);
        assert_eq!(ts.tv_sec, -1);
        assert_eq!(ts.tv_nsec, 999_999_900);
    }

    #[test]
    fn millis_truncate_toward_zero() {
        let ts = Timespec {
            tv_sec: 1,
            tv_nsec: 999_999,
        };
        assert_eq!(timespec_to_millis(ts), 1_000);

        let ts = Timespec {
            tv_sec: 1,
            tv_nsec: 1_000_000,
        };
        assert_eq!(timespec_to_millis(ts), 1_001);
    }

    #[test]
    fn millis_roundtrip_through_timespec() {
        let ts = millis_to_timespec(1_234);
        assert_eq!(ts.tv_sec, 1);
        assert_eq!(ts.tv_nsec, 234_000_000);
        assert_eq!(timespec_to_millis(ts), 1_234);
    }

    #[test]
    fn past_deadline_yields_zero_budget() {
        let now = Timespec {
            tv_sec: 100,
            tv_nsec: 0,
        };
        let deadline = Timespec {
            tv_sec: 99,
            tv_nsec: 999_000_000,
        };
        assert_eq!(relative_timeout_ms(deadline, now), 0);
        assert_eq!(relative_timeout_ms(now, now), 0);
    }

    #[test]
    fn future_deadline_budget_in_millis() {
        let now = Timespec {
            tv_sec: 100,
            tv_nsec: 0,
        };
        let deadline = Timespec {
            tv_sec: 102,
            tv_nsec: 500_000_000,
        };
        assert_eq!(relative_timeout_ms(deadline, now), 2_500);
    }

    #[test]
    fn sub_millisecond_deadline_precision_is_truncated() {
        // Deadline half a millisecond out truncates to a zero-length wait;
        // the wait must never be rounded past the requested time.
        let now = Timespec {
            tv_sec: 100,
            tv_nsec: 0,
        };
        let deadline = Timespec {
            tv_sec: 100,
            tv_nsec: 500_000,
        };
        assert_eq!(relative_timeout_ms(deadline, now), 0);
    }

    #[test]
    fn extreme_deadline_saturates_instead_of_wrapping() {
        let now = Timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        let deadline = Timespec {
            tv_sec: i64::MAX,
            tv_nsec: 999_999_999,
        };
        assert_eq!(relative_timeout_ms(deadline, now) as i64, i64::MAX);
    }
}
