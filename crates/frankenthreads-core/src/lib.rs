//! # frankenthreads-core
//!
//! Pure, safe logic for the frankenthreads POSIX compatibility layer.
//!
//! This crate holds everything that can be expressed without touching the
//! native platform: errno-style status constants, timespec arithmetic
//! (including the absolute-deadline to relative-timeout conversion and
//! filetime epoch translation), and the thread-attribute value object with
//! its validators. Native primitives live in `frankenthreads-posix`.

pub mod errno;
pub mod pthread;
pub mod time;
