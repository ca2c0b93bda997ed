//! Per-auction debounce gate.
//!
//! The gate is a sliding window: every evaluation advances the auction's last-attempt instant,
//! including evaluations that end up suppressed, so a burst of events keeps extending the
//! cooldown. An evaluation observed earlier than the recorded instant is suppressed and leaves
//! it untouched. [`DebounceRegistry`] keeps that state in-process; deployments running several
//! instances either accept a per-instance window or implement [`DebounceGate`] over a shared
//! expiring key store.

// self
use crate::{_prelude::*, market::AuctionId, store::StoreError};

/// Boxed future returned by [`DebounceGate::evaluate`].
pub type GateFuture<'a> =
	Pin<Box<dyn Future<Output = Result<GateDecision, StoreError>> + 'a + Send>>;

/// Strategy deciding whether an auction's notification fan-out may run now.
pub trait DebounceGate
where
	Self: Send + Sync,
{
	/// Evaluates the gate for `auction` at `now` and records the attempt.
	fn evaluate<'a>(
		&'a self,
		auction: &'a AuctionId,
		now: OffsetDateTime,
		window: Duration,
	) -> GateFuture<'a>;
}

/// Result emitted by a [`DebounceGate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
	/// No attempt inside the window; the dispatch may proceed.
	Proceed,
	/// An attempt happened inside the window; skip the fan-out.
	Suppress,
}
impl GateDecision {
	/// Returns `true` for [`GateDecision::Proceed`].
	pub const fn is_proceed(self) -> bool {
		matches!(self, GateDecision::Proceed)
	}
}

/// In-process map from auction to last dispatch attempt.
///
/// Entries live for the registry's lifetime unless pruned with
/// [`DebounceRegistry::prune_older_than`].
#[derive(Debug, Default)]
pub struct DebounceRegistry {
	last_attempt: Mutex<HashMap<AuctionId, OffsetDateTime>>,
}
impl DebounceRegistry {
	/// Returns `true` when `auction` had no attempt within `window` before `now`.
	///
	/// The read and the refresh of the last-attempt instant happen under one lock. The recorded
	/// instant never moves backwards: a job observed earlier than the latest attempt is
	/// suppressed and leaves the latest attempt in place.
	pub fn should_dispatch(
		&self,
		auction: &AuctionId,
		now: OffsetDateTime,
		window: Duration,
	) -> bool {
		let mut guard = self.last_attempt.lock();
		let previous = guard.get(auction).copied();

		match previous {
			Some(last) => {
				if now > last {
					guard.insert(auction.clone(), now);
				}

				now - last >= window
			},
			None => {
				guard.insert(auction.clone(), now);

				true
			},
		}
	}

	/// Returns the last recorded attempt for `auction`.
	pub fn last_attempt(&self, auction: &AuctionId) -> Option<OffsetDateTime> {
		self.last_attempt.lock().get(auction).copied()
	}

	/// Drops entries whose last attempt is older than `cutoff`, returning how many were removed.
	pub fn prune_older_than(&self, cutoff: OffsetDateTime) -> usize {
		let mut guard = self.last_attempt.lock();
		let before = guard.len();

		guard.retain(|_, last| *last >= cutoff);

		before - guard.len()
	}

	/// Number of tracked auctions.
	pub fn len(&self) -> usize {
		self.last_attempt.lock().len()
	}

	/// Returns `true` when no auction is tracked.
	pub fn is_empty(&self) -> bool {
		self.last_attempt.lock().is_empty()
	}
}
impl DebounceGate for DebounceRegistry {
	fn evaluate<'a>(
		&'a self,
		auction: &'a AuctionId,
		now: OffsetDateTime,
		window: Duration,
	) -> GateFuture<'a> {
		Box::pin(async move {
			Ok(if self.should_dispatch(auction, now, window) {
				GateDecision::Proceed
			} else {
				GateDecision::Suppress
			})
		})
	}
}
