//! Thread creation attributes.
//!
//! A small value object carrying the requested detach state plus stack and
//! priority fields that are accepted but not applied. Uninitialized or
//! destroyed attributes hold a sentinel detach state and are rejected by
//! every consumer.

use crate::errno;

/// Created thread is joinable; its handle must eventually be closed.
pub const PTHREAD_CREATE_JOINABLE: i32 = 0;
/// Created thread runs independently; creation returns a null handle.
pub const PTHREAD_CREATE_DETACHED: i32 = 0x04;
/// Sentinel stored by `pthread_attr_destroy`; also the uninitialized state.
pub const DETACH_STATE_INVALID: i32 = -1;

/// Returns true if `state` is a recognized detach state.
#[must_use]
pub const fn valid_detach_state(state: i32) -> bool {
    matches!(state, PTHREAD_CREATE_JOINABLE | PTHREAD_CREATE_DETACHED)
}

/// Thread creation attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PthreadAttr {
    detach_state: i32,
    /// Requested stack size in bytes; carried but not applied.
    pub stack_size: usize,
    /// Requested scheduling priority; carried but not applied.
    pub sched_priority: i32,
}

impl Default for PthreadAttr {
    fn default() -> Self {
        Self {
            detach_state: DETACH_STATE_INVALID,
            stack_size: 0,
            sched_priority: 0,
        }
    }
}

impl PthreadAttr {
    /// Current detach state (the sentinel when not initialized).
    #[must_use]
    pub fn detach_state(&self) -> i32 {
        self.detach_state
    }

    /// True once `pthread_attr_init` ran and `pthread_attr_destroy` has not.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        valid_detach_state(self.detach_state)
    }
}

/// Initializes attributes to the defaults (JOINABLE detach state).
///
/// Equivalent to C `pthread_attr_init`. Returns 0.
pub fn pthread_attr_init(attr: &mut PthreadAttr) -> i32 {
    attr.detach_state = PTHREAD_CREATE_JOINABLE;
    0
}

/// Stores a detach state into initialized attributes.
///
/// Equivalent to C `pthread_attr_setdetachstate`. Returns EINVAL for an
/// unrecognized state or for attributes that were never initialized or were
/// already destroyed.
pub fn pthread_attr_setdetachstate(attr: &mut PthreadAttr, state: i32) -> i32 {
    if !valid_detach_state(state) || !attr.is_initialized() {
        return errno::EINVAL;
    }
    attr.detach_state = state;
    0
}

/// Marks attributes invalid.
///
/// Equivalent to C `pthread_attr_destroy`. Returns EINVAL when the
/// attributes are not currently initialized.
pub fn pthread_attr_destroy(attr: &mut PthreadAttr) -> i32 {
    if !attr.is_initialized() {
        return errno::EINVAL;
    }
    attr.detach_state = DETACH_STATE_INVALID;
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detach_state_constants() {
        assert_eq!(PTHREAD_CREATE_JOINABLE, 0);
        assert_eq!(PTHREAD_CREATE_DETACHED, 0x04);
        assert_eq!(DETACH_STATE_INVALID, -1);
    }

    #[test]
    fn valid_detach_state_check() {
        assert!(valid_detach_state(PTHREAD_CREATE_JOINABLE));
        assert!(valid_detach_state(PTHREAD_CREATE_DETACHED));
        assert!(!valid_detach_state(1));
        assert!(!valid_detach_state(-1));
        assert!(!valid_detach_state(i32::MAX));
    }

    #[test]
    fn init_sets_joinable() {
        let mut attr = PthreadAttr::default();
        assert!(!attr.is_initialized());
        assert_eq!(pthread_attr_init(&mut attr), 0);
        assert_eq!(attr.detach_state(), PTHREAD_CREATE_JOINABLE);
    }

    #[test]
    fn setdetachstate_accepts_defined_values_only() {
        let mut attr = PthreadAttr::default();
        pthread_attr_init(&mut attr);

        assert_eq!(
            pthread_attr_setdetachstate(&mut attr, PTHREAD_CREATE_DETACHED),
            0
        );
        assert_eq!(attr.detach_state(), PTHREAD_CREATE_DETACHED);

        assert_eq!(pthread_attr_setdetachstate(&mut attr, 7), errno::EINVAL);
        assert_eq!(attr.detach_state(), PTHREAD_CREATE_DETACHED);
    }

    #[test]
    fn setdetachstate_rejects_uninitialized_attrs() {
        let mut attr = PthreadAttr::default();
        assert_eq!(
            pthread_attr_setdetachstate(&mut attr, PTHREAD_CREATE_JOINABLE),
            errno::EINVAL
        );
    }

    #[test]
    fn destroy_invalidates_and_double_destroy_fails() {
        let mut attr = PthreadAttr::default();
        pthread_attr_init(&mut attr);

        assert_eq!(pthread_attr_destroy(&mut attr), 0);
        assert!(!attr.is_initialized());
        assert_eq!(attr.detach_state(), DETACH_STATE_INVALID);
        assert_eq!(pthread_attr_destroy(&mut attr), errno::EINVAL);
    }

    #[test]
    fn destroyed_attrs_can_be_reinitialized() {
        let mut attr = PthreadAttr::default();
        pthread_attr_init(&mut attr);
        pthread_attr_destroy(&mut attr);

        assert_eq!(pthread_attr_init(&mut attr), 0);
        assert!(attr.is_initialized());
    }
}
