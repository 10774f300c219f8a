use std::sync::Mutex;

pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

/// Counters collected over one analysis run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub processed: usize,
    pub filtered: usize,
    pub rejected: usize,
    pub rows: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_processed(&self, rows: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.processed += 1;
            metrics.rows += rows;
        }
    }

    pub fn record_filtered(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.filtered += 1;
        }
    }

    pub fn record_rejected(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.rejected += 1;
        }
    }

    pub fn snapshot(&self) -> Metrics {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
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
    fn counters_accumulate() {
        let recorder = MetricsRecorder::new();
        recorder.record_processed(3);
        recorder.record_processed(0);
        recorder.record_filtered();
        recorder.record_rejected();
        assert_eq!(
            recorder.snapshot(),
            Metrics {
                processed: 2,
                filtered: 1,
                rejected: 1,
                rows: 3
            }
        );
    }
}
