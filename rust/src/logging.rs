//! Logging macros for the placement engine with verbosity level control.
//!
//! Events go through `tracing`, so the host application decides where they
//! end up. Verbosity levels:
//! - 0: SILENT (only warnings and errors)
//! - 1: CHANGES (placements, evictions, phase boundaries)
//! - 2: CHECKS (rejected candidates, skipped records)
//! - 3: DEBUG (full algorithm internals, rankings)

/// Verbosity level constants.
pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at CHANGES level (verbosity >= 1).
///
/// Used for: committed placements, evictions, phase summaries.
#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHANGES {
            ::tracing::info!($($arg)*);
        }
    };
}

/// Log at CHECKS level (verbosity >= 2).
///
/// Used for: candidate rejections, ignored availability records.
#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHECKS {
            ::tracing::debug!($($arg)*);
        }
    };
}

/// Log at DEBUG level (verbosity >= 3).
///
/// Used for: slot and teacher rankings, per-iteration repair details.
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            ::tracing::trace!($($arg)*);
        }
    };
}

/// Install a fmt subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs anything.
#[cfg(test)]
pub(crate) fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("trace"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_constants() {
        assert_eq!(VERBOSITY_SILENT, 0);
        assert_eq!(VERBOSITY_CHANGES, 1);
        assert_eq!(VERBOSITY_CHECKS, 2);
        assert_eq!(VERBOSITY_DEBUG, 3);
    }

    #[test]
    fn test_log_macros_emit_through_tracing() {
        init_test();
        let verbosity = VERBOSITY_DEBUG;
        log_changes!(verbosity, "placed block {}", 1);
        log_checks!(verbosity, "rejected block {}", 2);
        log_debug!(verbosity, "ranking {:?}", [3, 4]);

        let silent = VERBOSITY_SILENT;
        log_changes!(silent, "never shown {}", 5);
    }
}
