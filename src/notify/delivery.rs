//! Delivery capability contract (email, push, or any other transport) and its error type.

// self
use crate::{
	_prelude::*,
	market::{AuctionId, UserId},
	notify::AuctionEvent,
};

/// Boxed future returned by [`DeliveryCapability::send`].
pub type DeliveryFuture<'a> =
	Pin<Box<dyn Future<Output = Result<bool, DeliveryError>> + 'a + Send>>;

/// Transport that hands one rendered notification to one recipient.
///
/// `Ok(false)` means the transport declined the message without raising; the dispatcher
/// records it as [`DeliveryError::Rejected`].
pub trait DeliveryCapability
where
	Self: Send + Sync,
{
	/// Sends `envelope` to its recipient.
	fn send(&self, envelope: Envelope) -> DeliveryFuture<'_>;
}

/// Recipient-specific rendering of a notification payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
	/// User the message is addressed to.
	pub recipient: UserId,
	/// Auction the message is about.
	pub auction: AuctionId,
	/// Subject line.
	pub subject: String,
	/// Structured event data for the transport's template.
	pub event: AuctionEvent,
}

/// Per-recipient delivery failure.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum DeliveryError {
	/// Transport raised an error.
	#[error("Delivery failed: {message}.")]
	Failed {
		/// Transport-supplied description.
		message: String,
	},
	/// Transport reported the message as not delivered.
	#[error("Delivery was rejected by the transport.")]
	Rejected,
	/// Delivery future panicked.
	#[error("Delivery panicked: {message}.")]
	Panicked {
		/// Panic payload, when it was a string.
		message: String,
	},
}
impl DeliveryError {
	/// Wraps a transport failure description.
	pub fn failed(message: impl Into<String>) -> Self {
		Self::Failed { message: message.into() }
	}
}
