//! Logging shims.
//!
//! With `feature = "tracing"` these forward to `tracing` under the `virtual_window` target;
//! without it they expand to an empty block, so call sites never need their own `cfg`.

macro_rules! vtrace {
    ($($tt:tt)*) => {{
        #[cfg(feature = "tracing")]
        tracing::trace!(target: "virtual_window", $($tt)*);
    }};
}

macro_rules! vdebug {
    ($($tt:tt)*) => {{
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "virtual_window", $($tt)*);
    }};
}

macro_rules! vwarn {
    ($($tt:tt)*) => {{
        #[cfg(feature = "tracing")]
        tracing::warn!(target: "virtual_window", $($tt)*);
    }};
}
