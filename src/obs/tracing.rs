// self
use crate::{
	_prelude::*,
	market::{AuctionId, UserId},
	obs::OpKind,
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOp<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOp<F> = F;

/// A span builder used by public operations.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Creates a new span tagged with the provided operation kind + stage.
	pub fn new(kind: OpKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("bidwire.op", op = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOp<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs that a fee was quoted from the hard-coded default instead of the stored policy.
pub fn log_fee_fallback(final_price: f64, reason: &dyn Display) {
	#[cfg(feature = "tracing")]
	tracing::warn!(final_price, %reason, "commission policy unavailable; using default fee");
	#[cfg(not(feature = "tracing"))]
	let _ = (final_price, reason);
}

/// Logs a dispatch suppressed by the debounce window.
pub fn log_dispatch_debounced(auction: &AuctionId) {
	#[cfg(feature = "tracing")]
	tracing::debug!(auction = %auction, "notification dispatch debounced");
	#[cfg(not(feature = "tracing"))]
	let _ = auction;
}

/// Logs a dispatch that ended without any delivery attempt.
pub fn log_dispatch_skipped(auction: &AuctionId, reason: &dyn Display) {
	#[cfg(feature = "tracing")]
	tracing::warn!(auction = %auction, %reason, "notification dispatch skipped");
	#[cfg(not(feature = "tracing"))]
	let _ = (auction, reason);
}

/// Logs a single recipient's delivery failure.
pub fn log_delivery_failure(auction: &AuctionId, recipient: &UserId, error: &dyn Display) {
	#[cfg(feature = "tracing")]
	tracing::warn!(
		auction = %auction,
		recipient = %recipient,
		%error,
		"notification delivery failed"
	);
	#[cfg(not(feature = "tracing"))]
	let _ = (auction, recipient, error);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = OpSpan::new(OpKind::Dispatch, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}

	#[test]
	fn log_helpers_accept_display_values() {
		let auction = AuctionId::new("lot-1").expect("Auction fixture should be valid.");
		let recipient = UserId::new("bidder-1").expect("User fixture should be valid.");

		log_fee_fallback(10., &"store offline");
		log_dispatch_debounced(&auction);
		log_dispatch_skipped(&auction, &"no eligible recipients");
		log_delivery_failure(&auction, &recipient, &"smtp timeout");
	}
}
