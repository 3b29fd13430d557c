//! Macros for generating log messages. Every level macro accepts an optional leading threshold and forwards to
//! `log_event!`, which initializes the logger and emits the `tracing` event.

#[doc(hidden)]
#[macro_export]
macro_rules! log_event {
    (critical, $threshold:expr, $($arg:tt)+) => {
        {
            $crate::log::init_logger();
            tracing::event!(
                tracing::Level::ERROR,
                critical = true,
                threshold = $threshold,
                message = format_args!($($arg)+)
            );
        }
    };
    ($level:ident, $threshold:expr, $($arg:tt)+) => {
        {
            $crate::log::init_logger();
            tracing::event!(
                tracing::Level::$level,
                threshold = $threshold,
                message = format_args!($($arg)+)
            );
        }
    };
}

#[macro_export]
macro_rules! critical {
    ($threshold:literal, $($arg:tt)+) => { $crate::log_event!(critical, $threshold, $($arg)+) };
    ($($arg:tt)+) => { $crate::log_event!(critical, 0, $($arg)+) };
}

#[macro_export]
macro_rules! error {
    ($threshold:literal, $($arg:tt)+) => { $crate::log_event!(ERROR, $threshold, $($arg)+) };
    ($($arg:tt)+) => { $crate::log_event!(ERROR, 0, $($arg)+) };
}

#[macro_export]
macro_rules! warning {
    ($threshold:literal, $($arg:tt)+) => { $crate::log_event!(WARN, $threshold, $($arg)+) };
    ($($arg:tt)+) => { $crate::log_event!(WARN, 0, $($arg)+) };
}

#[macro_export]
macro_rules! info {
    ($threshold:literal, $($arg:tt)+) => { $crate::log_event!(INFO, $threshold, $($arg)+) };
    ($($arg:tt)+) => { $crate::log_event!(INFO, 0, $($arg)+) };
}

#[macro_export]
macro_rules! debug {
    ($threshold:literal, $($arg:tt)+) => { $crate::log_event!(DEBUG, $threshold, $($arg)+) };
    ($($arg:tt)+) => { $crate::log_event!(DEBUG, 0, $($arg)+) };
}

#[macro_export]
macro_rules! trace {
    ($threshold:literal, $($arg:tt)+) => { $crate::log_event!(TRACE, $threshold, $($arg)+) };
    ($($arg:tt)+) => { $crate::log_event!(TRACE, 0, $($arg)+) };
}


// The following makes the macros importable directly from the `log` module.
pub use {critical, error, warning, info, debug, trace};
