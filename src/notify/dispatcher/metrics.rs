// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for dispatch calls and individual deliveries.
#[derive(Debug, Default)]
pub struct DispatchMetrics {
	attempts: AtomicU64,
	debounced: AtomicU64,
	skipped: AtomicU64,
	completed: AtomicU64,
	delivered: AtomicU64,
	failed: AtomicU64,
}
impl DispatchMetrics {
	/// Returns the total number of dispatch calls.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of dispatch calls suppressed by the debounce gate.
	pub fn debounced(&self) -> u64 {
		self.debounced.load(Ordering::Relaxed)
	}

	/// Returns the number of dispatch calls that ended without a delivery attempt.
	pub fn skipped(&self) -> u64 {
		self.skipped.load(Ordering::Relaxed)
	}

	/// Returns the number of dispatch calls that fanned out.
	pub fn completed(&self) -> u64 {
		self.completed.load(Ordering::Relaxed)
	}

	/// Returns the number of successful deliveries across all dispatches.
	pub fn delivered(&self) -> u64 {
		self.delivered.load(Ordering::Relaxed)
	}

	/// Returns the number of failed deliveries across all dispatches.
	pub fn failed(&self) -> u64 {
		self.failed.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_debounced(&self) {
		self.debounced.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_skipped(&self) {
		self.skipped.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_completed(&self, delivered: usize, failed: usize) {
		self.completed.fetch_add(1, Ordering::Relaxed);
		self.delivered.fetch_add(delivered as u64, Ordering::Relaxed);
		self.failed.fetch_add(failed as u64, Ordering::Relaxed);
	}
}
