//! Time sources for the simulation loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Millisecond time source used to drive ticks.
pub trait Clock {
	/// Milliseconds since the clock started.
	fn now_ms(&self) -> u64;

	/// Waits until `duration` has passed on this clock.
	fn wait(&self, duration: Duration);
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
	start: Instant,
}

impl SystemClock {
	/// Starts a clock at zero.
	pub fn new() -> Self {
		Self {
			start: Instant::now(),
		}
	}
}

impl Default for SystemClock {
	fn default() -> Self {
		Self::new()
	}
}

impl Clock for SystemClock {
	fn now_ms(&self) -> u64 {
		u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
	}

	fn wait(&self, duration: Duration) {
		if !duration.is_zero() {
			std::thread::sleep(duration);
		}
	}
}

/// Clock that only moves when told to; waiting advances it instantly.
///
/// Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
	now: Arc<AtomicU64>,
}

impl ManualClock {
	/// Creates a clock at `start_ms`.
	pub fn new(start_ms: u64) -> Self {
		Self {
			now: Arc::new(AtomicU64::new(start_ms)),
		}
	}

	/// Moves the clock forward.
	pub fn advance(&self, ms: u64) {
		self.now.fetch_add(ms, Ordering::Relaxed);
	}

	/// Sets the current time.
	pub fn set(&self, ms: u64) {
		self.now.store(ms, Ordering::Relaxed);
	}
}

impl Clock for ManualClock {
	fn now_ms(&self) -> u64 {
		self.now.load(Ordering::Relaxed)
	}

	fn wait(&self, duration: Duration) {
		self.advance(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX));
	}
}
