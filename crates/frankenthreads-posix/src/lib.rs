//! # frankenthreads-posix
//!
//! The adapter half of the frankenthreads compatibility layer: the POSIX
//! mutex, condition-variable, thread-creation, and clock contract mapped
//! onto the host's native primitives.
//!
//! # Architecture
//!
//! ```text
//! caller -> POSIX surface (this crate) -> native primitive (futex / spawn / clock)
//!                 |
//!                 +-> pure arithmetic and validators (frankenthreads-core)
//! ```
//!
//! Every operation returns an errno-style `i32` status (0 on success). The
//! layer performs no logging and no retries; each native failure is mapped
//! to a status code and surfaced to the immediate caller.

mod futex;

pub mod clock;
pub mod cond;
pub mod mutex;
pub mod thread;

pub use clock::clock_gettime;
pub use cond::{
    PthreadCond, pthread_cond_broadcast, pthread_cond_destroy, pthread_cond_init,
    pthread_cond_signal, pthread_cond_timedwait, pthread_cond_wait,
};
pub use mutex::{
    PthreadMutex, pthread_mutex_destroy, pthread_mutex_init, pthread_mutex_lock,
    pthread_mutex_trylock, pthread_mutex_unlock,
};
pub use thread::{
    PthreadT, StartRoutine, pthread_create, pthread_detach, pthread_equal, pthread_join,
    pthread_self,
};
