//! Notification jobs, event payloads, and dispatcher configuration.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	market::{AuctionId, UserId},
	notify::{Envelope, NotificationCategory},
};

/// Auction lifecycle change that triggers a notification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuctionEvent {
	/// A new bid moved the current price.
	BidPlaced {
		/// New current price.
		amount: f64,
	},
	/// The auction closed; `final_price` is absent when nobody bid.
	AuctionEnded {
		/// Closing price, if any.
		final_price: Option<f64>,
	},
	/// The recipient won the auction.
	AuctionWon {
		/// Winning price.
		final_price: f64,
	},
}
impl AuctionEvent {
	/// Preference flag that governs this event by default.
	pub const fn category(&self) -> NotificationCategory {
		match self {
			AuctionEvent::BidPlaced { .. } => NotificationCategory::Outbid,
			AuctionEvent::AuctionEnded { .. } => NotificationCategory::AuctionEnded,
			AuctionEvent::AuctionWon { .. } => NotificationCategory::AuctionWon,
		}
	}

	fn subject(&self, title: &str) -> String {
		match self {
			AuctionEvent::BidPlaced { amount } => format!("New bid of {amount:.2} on \"{title}\""),
			AuctionEvent::AuctionEnded { .. } => format!("Auction \"{title}\" has ended"),
			AuctionEvent::AuctionWon { .. } => format!("You won \"{title}\""),
		}
	}
}

/// Event data shared by every recipient of a job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
	/// Listing title shown to recipients.
	pub auction_title: String,
	/// What happened.
	pub event: AuctionEvent,
}
impl NotificationPayload {
	/// Creates a payload for the provided listing title and event.
	pub fn new(auction_title: impl Into<String>, event: AuctionEvent) -> Self {
		Self { auction_title: auction_title.into(), event }
	}

	/// Renders the envelope handed to the delivery capability for `recipient`.
	pub fn render_for(&self, auction: &AuctionId, recipient: &UserId) -> Envelope {
		Envelope {
			recipient: recipient.clone(),
			auction: auction.clone(),
			subject: self.event.subject(&self.auction_title),
			event: self.event.clone(),
		}
	}
}

/// One dispatch request: who caused the event, who might care, and what to tell them.
#[derive(Clone, Debug)]
pub struct NotificationJob {
	/// Auction the event belongs to; also the debounce key.
	pub auction: AuctionId,
	/// Actor who caused the event; never notified about their own action.
	pub excluded: UserId,
	/// Previously interested users, in the order they should be notified.
	pub candidates: Vec<UserId>,
	/// Event data rendered for each recipient.
	pub payload: NotificationPayload,
	/// Preference flag used to filter candidates.
	pub category: NotificationCategory,
	/// Debounce window; `None` falls back to the dispatcher's configured window.
	pub window: Option<Duration>,
	/// Instant treated as "now" by the debounce gate.
	pub observed_at: OffsetDateTime,
}
impl NotificationJob {
	/// Debounce window applied when neither the job nor the dispatcher configuration sets one.
	pub const DEFAULT_WINDOW: Duration = Duration::milliseconds(DispatchConfig::DEFAULT_WINDOW_MS);

	/// Creates a job whose category follows the payload's event.
	pub fn new(
		auction: AuctionId,
		excluded: UserId,
		candidates: impl IntoIterator<Item = UserId>,
		payload: NotificationPayload,
	) -> Self {
		Self {
			auction,
			excluded,
			candidates: candidates.into_iter().collect(),
			category: payload.event.category(),
			payload,
			window: None,
			observed_at: OffsetDateTime::now_utc(),
		}
	}

	/// Overrides the debounce window; negative windows are clamped to zero.
	pub fn with_window(mut self, window: Duration) -> Self {
		self.window = Some(if window.is_negative() { Duration::ZERO } else { window });

		self
	}

	/// Overrides the preference flag used to filter candidates.
	pub fn with_category(mut self, category: NotificationCategory) -> Self {
		self.category = category;

		self
	}

	/// Overrides the instant used by the debounce gate.
	pub fn with_observed_at(mut self, instant: OffsetDateTime) -> Self {
		self.observed_at = instant;

		self
	}
}

/// Dispatcher settings, loadable from JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
	/// Default debounce window in milliseconds for jobs that do not set one.
	pub window_ms: i64,
	/// Collapse repeated candidate ids before the preference lookup.
	pub dedupe_candidates: bool,
}
impl DispatchConfig {
	/// Debounce window used when neither the job nor the configuration overrides it.
	pub const DEFAULT_WINDOW_MS: i64 = 5_000;

	/// Parses and validates a JSON configuration document.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		let mut deserializer = serde_json::Deserializer::from_str(raw);
		let config: Self = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| ConfigError::InvalidDispatchConfig { source })?;

		if config.window_ms < 0 {
			return Err(ConfigError::NegativeWindow);
		}

		Ok(config)
	}

	/// Configured window as a [`Duration`].
	pub fn window(&self) -> Duration {
		Duration::milliseconds(self.window_ms.max(0))
	}
}
impl Default for DispatchConfig {
	fn default() -> Self {
		Self { window_ms: Self::DEFAULT_WINDOW_MS, dedupe_candidates: true }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn user(id: &str) -> UserId {
		UserId::new(id).expect("User fixture should be valid.")
	}

	#[test]
	fn job_category_follows_event_unless_overridden() {
		let auction = AuctionId::new("lot-9").expect("Auction fixture should be valid.");
		let event = AuctionEvent::AuctionEnded { final_price: None };
		let payload = NotificationPayload::new("Vintage camera", event);
		let job = NotificationJob::new(auction, user("seller"), [user("bidder")], payload);

		assert_eq!(job.category, NotificationCategory::AuctionEnded);

		let job = job.with_category(NotificationCategory::Outbid);

		assert_eq!(job.category, NotificationCategory::Outbid);
	}

	#[test]
	fn negative_window_is_clamped() {
		let auction = AuctionId::new("lot-9").expect("Auction fixture should be valid.");
		let payload = NotificationPayload::new("Lamp", AuctionEvent::BidPlaced { amount: 10. });
		let job = NotificationJob::new(auction, user("a"), Vec::new(), payload)
			.with_window(Duration::seconds(-3));

		assert_eq!(job.window, Some(Duration::ZERO));
	}

	#[test]
	fn render_for_targets_recipient() {
		let auction = AuctionId::new("lot-5").expect("Auction fixture should be valid.");
		let payload =
			NotificationPayload::new("Oak desk", AuctionEvent::BidPlaced { amount: 120. });
		let envelope = payload.render_for(&auction, &user("bob"));

		assert_eq!(envelope.recipient, user("bob"));
		assert_eq!(envelope.auction, auction);
		assert_eq!(envelope.subject, "New bid of 120.00 on \"Oak desk\"");
	}

	#[test]
	fn config_defaults_and_path_errors() {
		let config =
			DispatchConfig::from_json_str("{}").expect("Empty config should use defaults.");

		assert_eq!(config, DispatchConfig::default());
		assert_eq!(config.window(), NotificationJob::DEFAULT_WINDOW);

		let err = DispatchConfig::from_json_str("{\"window_ms\":\"soon\"}")
			.expect_err("String window should be rejected.");

		match err {
			ConfigError::InvalidDispatchConfig { source } =>
				assert_eq!(source.path().to_string(), "window_ms"),
			other => panic!("Unexpected config error: {other:?}"),
		}

		assert!(matches!(
			DispatchConfig::from_json_str("{\"window_ms\":-1}"),
			Err(ConfigError::NegativeWindow)
		));
	}
}
