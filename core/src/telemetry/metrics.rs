use std::sync::Mutex;

/// Counts completed, degraded, and short-circuited computations.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub processed: usize,
    pub insufficient: usize,
    pub errors: usize,
}

#[derive(Default)]
struct Metrics {
    processed: usize,
    insufficient: usize,
    errors: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_processed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.processed += 1;
        }
    }

    pub fn record_insufficient(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.insufficient += 1;
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.errors += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            MetricsSnapshot {
                processed: metrics.processed,
                insufficient: metrics.insufficient,
                errors: metrics.errors,
            }
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_counts_each_outcome() {
        let recorder = MetricsRecorder::new();
        recorder.record_processed();
        recorder.record_processed();
        recorder.record_insufficient();
        recorder.record_error();
        assert_eq!(
            recorder.snapshot(),
            MetricsSnapshot {
                processed: 2,
                insufficient: 1,
                errors: 1
            }
        );
    }
}
