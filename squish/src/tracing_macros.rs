//! Logging shims for codec internals.
//!
//! Per-call events (top-level serialize and deserialize, union alternatives
//! falling through) go to `trace!`; rare ones (reconfiguration, the nesting
//! limit) go to `debug!`. Both reach `tracing` only under `cfg(test)` or the
//! `tracing` feature and expand to nothing otherwise.

#[cfg(any(test, feature = "tracing"))]
macro_rules! trace {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*);
    };
}

#[cfg(not(any(test, feature = "tracing")))]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

#[cfg(any(test, feature = "tracing"))]
macro_rules! debug {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*);
    };
}

#[cfg(not(any(test, feature = "tracing")))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}
