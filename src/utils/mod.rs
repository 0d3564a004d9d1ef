use std::time::Instant;
use tracing::{debug, info};

/// Wall-clock timer behind the `execution_time` field. Logs its lifetime
/// on drop so every lookup leaves a duration trace even on error paths.
pub struct Stopwatch {
    label: String,
    start: Instant,
}

impl Stopwatch {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        debug!("⏱  Starting: {}", label);
        Self {
            label,
            start: Instant::now(),
        }
    }

    /// Elapsed wall-clock seconds, rounded to two decimal places.
    pub fn elapsed_secs(&self) -> f64 {
        round2(self.start.elapsed().as_secs_f64())
    }
}

impl Drop for Stopwatch {
    fn drop(&mut self) {
        info!(
            "⏱  Finished: {} (took {:.2?})",
            self.label,
            self.start.elapsed()
        );
    }
}

/// Round a duration-style float to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
