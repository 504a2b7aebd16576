//! POSIX thread surface, pure half.
//!
//! Holds the thread-attribute value object and its validators. The adapter
//! operations that touch native primitives (mutex, condition variable,
//! creation, clocks) live in `frankenthreads-posix`.

pub mod attr;

pub use attr::{
    DETACH_STATE_INVALID, PTHREAD_CREATE_DETACHED, PTHREAD_CREATE_JOINABLE, PthreadAttr,
    pthread_attr_destroy, pthread_attr_init, pthread_attr_setdetachstate, valid_detach_state,
};
