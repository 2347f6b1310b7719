// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for transport activity.
#[derive(Debug, Default)]
pub struct TransportMetrics {
	requests: AtomicU64,
	exchanges: AtomicU64,
	exchange_failures: AtomicU64,
	retries: AtomicU64,
}
impl TransportMetrics {
	/// Returns the number of requests handed to the transport.
	pub fn requests(&self) -> u64 {
		self.requests.load(Ordering::Relaxed)
	}

	/// Returns the number of token exchanges started (successful or not).
	pub fn exchanges(&self) -> u64 {
		self.exchanges.load(Ordering::Relaxed)
	}

	/// Returns the number of token exchanges that failed.
	pub fn exchange_failures(&self) -> u64 {
		self.exchange_failures.load(Ordering::Relaxed)
	}

	/// Returns the number of requests resent after a `401 Unauthorized`.
	pub fn retries(&self) -> u64 {
		self.retries.load(Ordering::Relaxed)
	}

	pub(crate) fn record_request(&self) {
		self.requests.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_exchange(&self) {
		self.exchanges.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_exchange_failure(&self) {
		self.exchange_failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_retry(&self) {
		self.retries.fetch_add(1, Ordering::Relaxed);
	}
}
