use std::sync::Mutex;

/// Per-file tally for one multi-file load batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

pub struct BatchRecorder {
    inner: Mutex<BatchSummary>,
}

impl BatchRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(BatchSummary::default()),
        }
    }

    pub fn record_converted(&self) {
        if let Ok(mut summary) = self.inner.lock() {
            summary.converted += 1;
        }
    }

    pub fn record_skipped(&self) {
        if let Ok(mut summary) = self.inner.lock() {
            summary.skipped += 1;
        }
    }

    pub fn record_failed(&self, message: &str) {
        if let Ok(mut summary) = self.inner.lock() {
            summary.failed += 1;
            summary.errors.push(message.to_string());
        }
    }

    pub fn snapshot(&self) -> BatchSummary {
        if let Ok(summary) = self.inner.lock() {
            summary.clone()
        } else {
            BatchSummary::default()
        }
    }
}

impl Default for BatchRecorder {
    fn default() -> Self {
        Self::new()
    }
}
