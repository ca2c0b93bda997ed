//! Optional observability helpers for commission and dispatch operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to run every public operation inside a `bidwire.op` span
//!   with the `op` and `stage` fields, and to log fee fallbacks, skipped dispatches, and
//!   per-recipient delivery failures.
//! - Enable `metrics` to increment the `bidwire_op_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`, and `bidwire_delivery_total` for
//!   every delivery attempt, labeled by `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Fetching or seeding the commission policy.
	EnsureDefaultPolicy,
	/// Administrative policy update.
	UpdatePolicy,
	/// Fee derivation.
	ComputeFee,
	/// Notification fan-out.
	Dispatch,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::EnsureDefaultPolicy => "ensure_default_policy",
			OpKind::UpdatePolicy => "update_policy",
			OpKind::ComputeFee => "compute_fee",
			OpKind::Dispatch => "dispatch",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to a public operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Completion through a documented fallback (default fee, skipped or debounced dispatch).
	Fallback,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Fallback => "fallback",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
