//! Error number definitions.
//!
//! POSIX-style status codes returned by the compatibility surface. Every
//! operation reports failure synchronously through its return value, so no
//! thread-local errno channel is kept.

/// Operation not permitted.
pub const EPERM: i32 = 1;
/// No such process (unknown thread handle).
pub const ESRCH: i32 = 3;
/// Interrupted native call.
pub const EINTR: i32 = 4;
/// Resource temporarily unavailable.
pub const EAGAIN: i32 = 11;
/// Out of memory.
pub const ENOMEM: i32 = 12;
/// Device or resource busy.
pub const EBUSY: i32 = 16;
/// Invalid argument.
pub const EINVAL: i32 = 22;
/// Resource deadlock would occur.
pub const EDEADLK: i32 = 35;
/// Connection timed out; also the timed-wait expiry status.
pub const ETIMEDOUT: i32 = 110;
