//! Commission policy store and debounced bidder-notification fan-out for online auction
//! marketplaces.
//!
//! [`commission::CommissionPolicyStore`] owns the singleton pricing record and the fee function.
//! [`notify::NotificationDispatcher`] fans auction events out to interested bidders, tolerating
//! per-recipient delivery failures.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod commission;
pub mod error;
pub mod market;
pub mod notify;
pub mod obs;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and test doubles for unit and integration tests; enabled via
	//! `cfg(test)` or the `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		commission::CommissionPolicyStore,
		market::{AuctionId, UserId},
		notify::{
			DebounceRegistry, DeliveryCapability, DeliveryError, DeliveryFuture, Envelope,
			MemoryPreferences, NotificationCategory, NotificationDispatcher,
		},
		store::{MemoryStore, PolicyRecordStore},
	};

	/// Delivery double that records every envelope and fails for configured recipients.
	#[derive(Debug, Default)]
	pub struct RecordingDelivery {
		sent: Mutex<Vec<Envelope>>,
		failing: HashSet<UserId>,
		rejecting: HashSet<UserId>,
	}
	impl RecordingDelivery {
		/// Makes every send to `recipient` raise a delivery error.
		pub fn failing_for(mut self, recipient: &UserId) -> Self {
			self.failing.insert(recipient.clone());

			self
		}

		/// Makes every send to `recipient` report `false`.
		pub fn rejecting_for(mut self, recipient: &UserId) -> Self {
			self.rejecting.insert(recipient.clone());

			self
		}

		/// Returns every envelope handed to the capability, in call order.
		pub fn sent(&self) -> Vec<Envelope> {
			self.sent.lock().clone()
		}

		/// Returns the recipients of every recorded envelope, in call order.
		pub fn recipients(&self) -> Vec<UserId> {
			self.sent.lock().iter().map(|envelope| envelope.recipient.clone()).collect()
		}
	}
	impl DeliveryCapability for RecordingDelivery {
		fn send(&self, envelope: Envelope) -> DeliveryFuture<'_> {
			Box::pin(async move {
				let recipient = envelope.recipient.clone();

				self.sent.lock().push(envelope);

				if self.failing.contains(&recipient) {
					return Err(DeliveryError::failed(format!("mailbox for {recipient} is full")));
				}

				Ok(!self.rejecting.contains(&recipient))
			})
		}
	}

	/// Parses a user identifier fixture.
	pub fn user(id: &str) -> UserId {
		UserId::new(id).expect("User fixture should be a valid identifier.")
	}

	/// Parses an auction identifier fixture.
	pub fn auction(id: &str) -> AuctionId {
		AuctionId::new(id).expect("Auction fixture should be a valid identifier.")
	}

	/// Builds a preference table where every listed user opted in to `category`.
	pub fn opted_in(users: &[&UserId], category: NotificationCategory) -> MemoryPreferences {
		let preferences = MemoryPreferences::default();

		for user in users {
			preferences.opt_in((*user).clone(), category);
		}

		preferences
	}

	/// Constructs a dispatcher over a fresh debounce registry, the given preferences, and the
	/// recording delivery double.
	pub fn build_test_dispatcher(
		preferences: MemoryPreferences,
		delivery: RecordingDelivery,
	) -> (NotificationDispatcher, Arc<RecordingDelivery>) {
		let delivery = Arc::new(delivery);
		let dispatcher = NotificationDispatcher::new(
			Arc::new(DebounceRegistry::default()),
			Arc::new(preferences),
			delivery.clone(),
		);

		(dispatcher, delivery)
	}

	/// Constructs a commission policy service backed by a fresh in-memory store.
	pub fn build_test_commission() -> (CommissionPolicyStore, Arc<MemoryStore>) {
		let backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn PolicyRecordStore> = backend.clone();

		(CommissionPolicyStore::new(store), backend)
	}
}

mod _prelude {
	pub use std::{
		collections::{HashMap, HashSet},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};

	pub use crate::error::{Error, Result};
}
