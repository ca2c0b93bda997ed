//! Debounced, partial-failure tolerant notification fan-out.
//!
//! [`NotificationDispatcher::dispatch`] consults the debounce gate, resolves the recipient set
//! (candidates minus the acting user, filtered by preference), then starts every delivery
//! before awaiting any of them. Each attempt settles independently: an error, a `false`
//! return, or a panic in one delivery is recorded in the [`DispatchReport`] and never cancels
//! or delays the others. Nothing here returns an error to the caller.

mod metrics;

pub use metrics::DispatchMetrics;

// std
use std::{any::Any, panic::AssertUnwindSafe};
// crates.io
use futures::{FutureExt, future};
// self
use crate::{
	_prelude::*,
	market::{AuctionId, UserId},
	notify::{
		DebounceGate, DeliveryCapability, DeliveryError, DispatchConfig, GateDecision,
		NotificationCategory, NotificationJob, PreferenceLookup,
	},
	obs::{self, OpKind, OpOutcome, OpSpan},
	store::StoreError,
};

/// Terminal state of a dispatch call.
#[derive(Clone, Debug, PartialEq)]
pub enum DispatchOutcome {
	/// The auction was dispatched within the window; nothing was sent.
	Debounced,
	/// No delivery was attempted.
	Skipped(SkipReason),
	/// Every delivery attempt settled.
	Completed(DispatchReport),
}
impl DispatchOutcome {
	/// Returns `true` for [`DispatchOutcome::Debounced`].
	pub fn is_debounced(&self) -> bool {
		matches!(self, DispatchOutcome::Debounced)
	}

	/// Returns `true` for [`DispatchOutcome::Skipped`].
	pub fn is_skipped(&self) -> bool {
		matches!(self, DispatchOutcome::Skipped(_))
	}

	/// Returns the aggregate for completed dispatches.
	pub fn report(&self) -> Option<&DispatchReport> {
		match self {
			DispatchOutcome::Completed(report) => Some(report),
			_ => None,
		}
	}
}

/// Why a dispatch ended without delivery attempts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
	/// Nobody remained after exclusion and preference filtering.
	NoEligibleRecipients,
	/// The debounce gate or preference backend failed.
	StorageUnavailable(StoreError),
}
impl Display for SkipReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			SkipReason::NoEligibleRecipients => f.write_str("no eligible recipients"),
			SkipReason::StorageUnavailable(e) => write!(f, "storage unavailable: {e}"),
		}
	}
}

/// Aggregate of one fan-out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
	/// Deliveries that succeeded.
	pub success_count: usize,
	/// Deliveries that failed; always `failures.len()`.
	pub failure_count: usize,
	/// Every failed delivery, in recipient order.
	pub failures: Vec<DeliveryFailure>,
}

/// A recipient whose delivery failed, with the cause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryFailure {
	/// Recipient that was not notified.
	pub recipient: UserId,
	/// Failure cause.
	pub error: DeliveryError,
}

/// Coordinates the debounce gate, preference lookup, and delivery capability.
///
/// Collaborators are injected so the gate's scope (per process, or shared across instances) is
/// decided by whoever constructs the dispatcher.
#[derive(Clone)]
pub struct NotificationDispatcher {
	gate: Arc<dyn DebounceGate>,
	preferences: Arc<dyn PreferenceLookup>,
	delivery: Arc<dyn DeliveryCapability>,
	config: DispatchConfig,
	metrics: Arc<DispatchMetrics>,
}
impl NotificationDispatcher {
	/// Creates a dispatcher with the default [`DispatchConfig`].
	pub fn new(
		gate: Arc<dyn DebounceGate>,
		preferences: Arc<dyn PreferenceLookup>,
		delivery: Arc<dyn DeliveryCapability>,
	) -> Self {
		Self {
			gate,
			preferences,
			delivery,
			config: Default::default(),
			metrics: Default::default(),
		}
	}

	/// Replaces the dispatcher configuration.
	pub fn with_config(mut self, config: DispatchConfig) -> Self {
		self.config = config;

		self
	}

	/// Returns the active configuration.
	pub fn config(&self) -> &DispatchConfig {
		&self.config
	}

	/// Returns the counters shared by every clone of this dispatcher.
	pub fn metrics(&self) -> &DispatchMetrics {
		&self.metrics
	}

	/// Resolves the recipients for `candidates` using the configured preference lookup.
	pub async fn resolve_recipients(
		&self,
		candidates: &[UserId],
		excluded: &UserId,
		category: NotificationCategory,
	) -> Result<Vec<UserId>, StoreError> {
		resolve_recipients(
			candidates,
			excluded,
			self.preferences.as_ref(),
			category,
			self.config.dedupe_candidates,
		)
		.await
	}

	/// Runs the debounce gate, resolves recipients, and fans the job out.
	pub async fn dispatch(&self, job: NotificationJob) -> DispatchOutcome {
		const KIND: OpKind = OpKind::Dispatch;

		let span = OpSpan::new(KIND, "dispatch");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);
		self.metrics.record_attempt();

		let outcome = span.instrument(self.run(job)).await;

		match &outcome {
			DispatchOutcome::Completed(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			_ => obs::record_op_outcome(KIND, OpOutcome::Fallback),
		}

		outcome
	}

	async fn run(&self, job: NotificationJob) -> DispatchOutcome {
		let window = job.window.unwrap_or_else(|| self.config.window());

		match self.gate.evaluate(&job.auction, job.observed_at, window).await {
			Ok(GateDecision::Proceed) => (),
			Ok(GateDecision::Suppress) => {
				self.metrics.record_debounced();
				obs::log_dispatch_debounced(&job.auction);

				return DispatchOutcome::Debounced;
			},
			Err(e) => return self.skip(&job.auction, SkipReason::StorageUnavailable(e)),
		}

		let recipients =
			match self.resolve_recipients(&job.candidates, &job.excluded, job.category).await {
				Ok(recipients) if recipients.is_empty() =>
					return self.skip(&job.auction, SkipReason::NoEligibleRecipients),
				Ok(recipients) => recipients,
				Err(e) => return self.skip(&job.auction, SkipReason::StorageUnavailable(e)),
			};
		let report = self.fan_out(&job, recipients).await;

		self.metrics.record_completed(report.success_count, report.failure_count);

		DispatchOutcome::Completed(report)
	}

	async fn fan_out(&self, job: &NotificationJob, recipients: Vec<UserId>) -> DispatchReport {
		let attempts = recipients.into_iter().map(|recipient| {
			let envelope = job.payload.render_for(&job.auction, &recipient);
			let send = async move { self.delivery.send(envelope).await };

			AssertUnwindSafe(send).catch_unwind().map(move |settled| (recipient, settle(settled)))
		});
		let mut report = DispatchReport::default();

		for (recipient, result) in future::join_all(attempts).await {
			obs::record_delivery(result.is_ok());

			match result {
				Ok(()) => report.success_count += 1,
				Err(error) => {
					obs::log_delivery_failure(&job.auction, &recipient, &error);
					report.failures.push(DeliveryFailure { recipient, error });
				},
			}
		}

		report.failure_count = report.failures.len();

		report
	}

	fn skip(&self, auction: &AuctionId, reason: SkipReason) -> DispatchOutcome {
		self.metrics.record_skipped();
		obs::log_dispatch_skipped(auction, &reason);

		DispatchOutcome::Skipped(reason)
	}
}
impl Debug for NotificationDispatcher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("NotificationDispatcher")
			.field("config", &self.config)
			.field("metrics", &self.metrics)
			.finish()
	}
}

/// Removes `excluded` from `candidates` and keeps the users who enabled `category`.
///
/// Candidate order is preserved. With `dedupe` set, repeated ids are collapsed to their first
/// occurrence. `lookup` is not called when no candidate remains.
pub async fn resolve_recipients(
	candidates: &[UserId],
	excluded: &UserId,
	lookup: &dyn PreferenceLookup,
	category: NotificationCategory,
	dedupe: bool,
) -> Result<Vec<UserId>, StoreError> {
	let mut seen = HashSet::new();
	let remaining = candidates
		.iter()
		.filter(|candidate| *candidate != excluded)
		.filter(|candidate| !dedupe || seen.insert(*candidate))
		.cloned()
		.collect::<Vec<_>>();

	if remaining.is_empty() {
		return Ok(remaining);
	}

	let enabled = lookup.find(&remaining, category).await?;

	Ok(remaining.into_iter().filter(|user| enabled.contains(user)).collect())
}

fn settle(
	settled: std::thread::Result<Result<bool, DeliveryError>>,
) -> Result<(), DeliveryError> {
	match settled {
		Ok(Ok(true)) => Ok(()),
		Ok(Ok(false)) => Err(DeliveryError::Rejected),
		Ok(Err(e)) => Err(e),
		Err(payload) => Err(DeliveryError::Panicked { message: panic_message(payload.as_ref()) }),
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	payload
		.downcast_ref::<&str>()
		.map(|message| (*message).to_owned())
		.or_else(|| payload.downcast_ref::<String>().cloned())
		.unwrap_or_else(|| "non-string panic payload".into())
}
