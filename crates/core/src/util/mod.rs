pub mod arena;

/// A macro to unwrap an option to its `Some` value, and panic if `None`. This
/// is the same as [Option::unwrap], except that it accepts a format string
/// and format arguments, allowing for more flexibility in error messages.
///
/// The network uses this for graph invariants: a missing link or a stale
/// handle inside a mutating operation is an internal bug, not a recoverable
/// error.
#[macro_export]
macro_rules! unwrap {
    ($opt:expr, $fmt:expr, $($arg:tt)*) => {
        match $opt {
            Some(v) => v,
            None => panic!($fmt, $($arg)*),
        }
    };
}

/// A macro to measure the evaluation time of an expression. Wraps an
/// expression, logs the elapsed time at the given level (default debug), and
/// evaluates to the value of the expression.
#[macro_export]
macro_rules! timed {
    ($label:expr, $ex:expr) => {
        $crate::timed!($label, log::Level::Debug, $ex)
    };
    ($label:expr, $log_level:expr, $ex:expr) => {{
        let now = std::time::Instant::now();
        let value = $ex;
        let elapsed = now.elapsed();
        log::log!($log_level, "{} took {} ms", $label, elapsed.as_millis());
        value
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_unwrap_some() {
        let value: Option<u32> = Some(3);
        assert_eq!(unwrap!(value, "missing {}", "value"), 3);
    }

    #[test]
    #[should_panic(expected = "missing value 7")]
    fn test_unwrap_none() {
        let value: Option<u32> = None;
        unwrap!(value, "missing value {}", 7);
    }

    #[test]
    fn test_timed_passes_value_through() {
        assert_eq!(timed!("addition", 2 + 2), 4);
    }
}
