// self
use crate::obs::{OpKind, OpOutcome};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_op_outcome(kind: OpKind, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"bidwire_op_total",
			"op" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a single delivery attempt via the global metrics recorder (when enabled).
pub fn record_delivery(delivered: bool) {
	#[cfg(feature = "metrics")]
	{
		let outcome = if delivered { "delivered" } else { "failed" };

		metrics::counter!("bidwire_delivery_total", "outcome" => outcome).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = delivered;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_global_recorder() {
		record_op_outcome(OpKind::Dispatch, OpOutcome::Fallback);
		record_delivery(false);
	}
}
