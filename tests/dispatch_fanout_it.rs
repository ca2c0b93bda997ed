#![cfg(feature = "test")]

// std
use std::sync::atomic::{AtomicUsize, Ordering};
// crates.io
use time::macros;
// self
use bidwire::{
	_preludet::*,
	market::{AuctionId, UserId},
	notify::{
		AuctionEvent, DebounceRegistry, DeliveryCapability, DeliveryFuture, DispatchConfig,
		DispatchOutcome, Envelope, MemoryPreferences, NotificationCategory,
		NotificationDispatcher, NotificationJob, NotificationPayload, SkipReason,
	},
};

const T0: OffsetDateTime = macros::datetime!(2025-11-10 12:00 UTC);

/// Tracks how many deliveries are in flight at once.
#[derive(Default)]
struct SlowTransport {
	in_flight: AtomicUsize,
	peak: AtomicUsize,
}
impl DeliveryCapability for SlowTransport {
	fn send(&self, _envelope: Envelope) -> DeliveryFuture<'_> {
		Box::pin(async move {
			let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;

			self.peak.fetch_max(now, Ordering::SeqCst);
			tokio::time::sleep(std::time::Duration::from_millis(50)).await;
			self.in_flight.fetch_sub(1, Ordering::SeqCst);

			Ok(true)
		})
	}
}

fn bid_job(auction: &AuctionId, actor: &UserId, candidates: &[&UserId]) -> NotificationJob {
	let payload =
		NotificationPayload::new("Brass telescope", AuctionEvent::BidPlaced { amount: 80. });

	NotificationJob::new(
		auction.clone(),
		actor.clone(),
		candidates.iter().map(|user| (*user).clone()),
		payload,
	)
}

fn outbid_subscribers(users: &[&UserId]) -> MemoryPreferences {
	opted_in(users, NotificationCategory::Outbid)
}

#[tokio::test]
async fn second_event_within_window_is_debounced() {
	let (alice, bob) = (user("alice"), user("bob"));
	let lot = auction("lot-1");
	let (dispatcher, delivery) =
		build_test_dispatcher(outbid_subscribers(&[&alice, &bob]), RecordingDelivery::default());
	let first = dispatcher.dispatch(bid_job(&lot, &alice, &[&bob]).with_observed_at(T0)).await;

	assert_eq!(first.report().map(|report| report.success_count), Some(1));

	let second = dispatcher
		.dispatch(
			bid_job(&lot, &bob, &[&alice]).with_observed_at(T0 + Duration::milliseconds(4_999)),
		)
		.await;

	assert_eq!(second, DispatchOutcome::Debounced);
	assert_eq!(delivery.recipients(), vec![bob]);
}

#[tokio::test]
async fn event_after_window_is_dispatched() {
	let (alice, bob) = (user("alice"), user("bob"));
	let lot = auction("lot-2");
	let (dispatcher, delivery) =
		build_test_dispatcher(outbid_subscribers(&[&alice, &bob]), RecordingDelivery::default());

	dispatcher.dispatch(bid_job(&lot, &alice, &[&bob]).with_observed_at(T0)).await;

	let later = dispatcher
		.dispatch(bid_job(&lot, &bob, &[&alice]).with_observed_at(T0 + Duration::seconds(6)))
		.await;

	assert_eq!(later.report().map(|report| report.success_count), Some(1));
	assert_eq!(delivery.recipients(), vec![bob, alice]);
}

#[tokio::test]
async fn job_built_early_but_dispatched_late_keeps_the_window() {
	let (alice, bob, carol) = (user("alice"), user("bob"), user("carol"));
	let lot = auction("lot-9");
	let (dispatcher, delivery) = build_test_dispatcher(
		outbid_subscribers(&[&alice, &bob, &carol]),
		RecordingDelivery::default(),
	);
	let early = bid_job(&lot, &alice, &[&bob]).with_observed_at(T0);
	let late = bid_job(&lot, &bob, &[&carol]).with_observed_at(T0 + Duration::seconds(1));

	assert!(dispatcher.dispatch(late).await.report().is_some());
	assert!(dispatcher.dispatch(early).await.is_debounced());

	let retry = dispatcher
		.dispatch(bid_job(&lot, &carol, &[&alice]).with_observed_at(T0 + Duration::seconds(5)))
		.await;

	assert!(retry.is_debounced(), "only four seconds passed since the delivered dispatch");
	assert_eq!(delivery.recipients(), vec![carol]);
}

#[tokio::test]
async fn debounce_is_tracked_per_auction() {
	let (alice, bob) = (user("alice"), user("bob"));
	let (dispatcher, delivery) =
		build_test_dispatcher(outbid_subscribers(&[&alice, &bob]), RecordingDelivery::default());

	dispatcher.dispatch(bid_job(&auction("lot-a"), &alice, &[&bob]).with_observed_at(T0)).await;

	let other = dispatcher
		.dispatch(bid_job(&auction("lot-b"), &alice, &[&bob]).with_observed_at(T0))
		.await;

	assert!(other.report().is_some(), "another auction must not share the window");
	assert_eq!(delivery.sent().len(), 2);
}

#[tokio::test]
async fn acting_user_is_never_notified() {
	let (alice, bob, carol) = (user("alice"), user("bob"), user("carol"));
	let (dispatcher, delivery) = build_test_dispatcher(
		outbid_subscribers(&[&alice, &bob, &carol]),
		RecordingDelivery::default(),
	);
	let outcome = dispatcher
		.dispatch(bid_job(&auction("lot-3"), &alice, &[&alice, &bob, &carol, &alice]))
		.await;

	assert_eq!(outcome.report().map(|report| report.success_count), Some(2));
	assert!(!delivery.recipients().contains(&alice));
}

#[tokio::test]
async fn opted_out_candidates_are_filtered() {
	let (alice, bob, carol) = (user("alice"), user("bob"), user("carol"));
	let preferences = outbid_subscribers(&[&bob]);

	preferences.opt_in(carol.clone(), NotificationCategory::AuctionWon);

	let (dispatcher, delivery) = build_test_dispatcher(preferences, RecordingDelivery::default());

	dispatcher.dispatch(bid_job(&auction("lot-4"), &alice, &[&bob, &carol])).await;

	assert_eq!(delivery.recipients(), vec![bob]);
}

#[tokio::test]
async fn one_failure_does_not_block_the_rest() {
	let actor = user("seller");
	let bidders = (0..5).map(|i| user(&format!("bidder-{i}"))).collect::<Vec<_>>();
	let refs = bidders.iter().collect::<Vec<_>>();
	let (dispatcher, delivery) = build_test_dispatcher(
		outbid_subscribers(&refs),
		RecordingDelivery::default().failing_for(&bidders[2]),
	);
	let outcome = dispatcher.dispatch(bid_job(&auction("lot-5"), &actor, &refs)).await;
	let report = outcome.report().expect("Fan-out with recipients should complete.");

	assert_eq!(report.success_count, 4);
	assert_eq!(report.failure_count, 1);
	assert_eq!(report.failures[0].recipient, bidders[2]);
	assert_eq!(delivery.recipients().len(), 5, "every recipient must be attempted");
	assert_eq!(dispatcher.metrics().delivered(), 4);
	assert_eq!(dispatcher.metrics().failed(), 1);
}

#[tokio::test]
async fn empty_recipient_set_skips_without_sending() {
	let (alice, bob) = (user("alice"), user("bob"));
	let (dispatcher, delivery) =
		build_test_dispatcher(MemoryPreferences::default(), RecordingDelivery::default());
	let outcome = dispatcher.dispatch(bid_job(&auction("lot-6"), &alice, &[&bob])).await;

	assert_eq!(outcome, DispatchOutcome::Skipped(SkipReason::NoEligibleRecipients));
	assert!(delivery.sent().is_empty());
	assert_eq!(dispatcher.metrics().skipped(), 1);
}

#[tokio::test]
async fn deliveries_run_concurrently() {
	let actor = user("seller");
	let bidders = (0..6).map(|i| user(&format!("bidder-{i}"))).collect::<Vec<_>>();
	let refs = bidders.iter().collect::<Vec<_>>();
	let transport = Arc::new(SlowTransport::default());
	let dispatcher = NotificationDispatcher::new(
		Arc::new(DebounceRegistry::default()),
		Arc::new(outbid_subscribers(&refs)),
		transport.clone(),
	);
	let outcome = dispatcher.dispatch(bid_job(&auction("lot-7"), &actor, &refs)).await;

	assert_eq!(outcome.report().map(|report| report.success_count), Some(6));
	assert_eq!(
		transport.peak.load(Ordering::SeqCst),
		6,
		"every delivery should start before any settles"
	);
	assert_eq!(transport.in_flight.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn configured_window_applies_to_jobs_without_override() {
	let (alice, bob) = (user("alice"), user("bob"));
	let lot = auction("lot-8");
	let config = DispatchConfig::from_json_str(r#"{"window_ms":1000}"#)
		.expect("Dispatch configuration fixture should parse.");
	let (dispatcher, delivery) =
		build_test_dispatcher(outbid_subscribers(&[&alice, &bob]), RecordingDelivery::default());
	let dispatcher = dispatcher.with_config(config);

	dispatcher.dispatch(bid_job(&lot, &alice, &[&bob]).with_observed_at(T0)).await;

	let outcome = dispatcher
		.dispatch(bid_job(&lot, &bob, &[&alice]).with_observed_at(T0 + Duration::seconds(2)))
		.await;

	assert!(!outcome.is_debounced());
	assert_eq!(delivery.sent().len(), 2);
}
