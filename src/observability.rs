//! Structured diagnostics for the pipeline.
//!
//! The orchestrator reports phase timings and row counts through the
//! `log_metric!` macro so a run can be reconstructed from the debug log. The
//! macro body is wrapped in `#[cfg(debug_assertions)]`, so release builds
//! compile it out entirely.

/// Logs a structured key-value metric line at debug level, only in debug builds.
///
/// # Example
/// ```
/// use tidegauge::log_metric;
/// let rows = 42;
/// log_metric!("event" = "gap_fill", "rows" = &rows);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+

            log::debug!("TIDEGAUGE_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}
