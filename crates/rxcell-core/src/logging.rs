#![forbid(unsafe_code)]

//! Logging shims.
//!
//! With the `tracing` feature enabled the macros below are tracing's own. Without it
//! they expand to nothing, so the propagation paths carry no logging cost and the
//! crate emits no output at all.
//!
//! Only pass expressions that are cheap and side-effect free: when the feature is off
//! the arguments are never evaluated.

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
macro_rules! noop_trace {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! noop_debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use noop_debug as debug;
#[cfg(not(feature = "tracing"))]
pub(crate) use noop_trace as trace;
