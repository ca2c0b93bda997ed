//! Notification preference flags and the lookup contract used to filter recipients.

// self
use crate::{_prelude::*, market::UserId, store::StoreError};

/// Boxed future returned by [`PreferenceLookup::find`].
pub type PreferenceFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HashSet<UserId>, StoreError>> + 'a + Send>>;

/// Opt-in flag a user sets per kind of auction notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
	/// Someone placed a higher bid on an auction the user bid on.
	Outbid,
	/// An auction the user bid on has closed.
	AuctionEnded,
	/// The user won an auction.
	AuctionWon,
}
impl NotificationCategory {
	/// Returns a stable label suitable for storage keys and log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			NotificationCategory::Outbid => "outbid",
			NotificationCategory::AuctionEnded => "auction_ended",
			NotificationCategory::AuctionWon => "auction_won",
		}
	}
}
impl Display for NotificationCategory {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Source of per-user notification preferences.
pub trait PreferenceLookup
where
	Self: Send + Sync,
{
	/// Returns the subset of `users` whose `category` flag is enabled.
	fn find<'a>(
		&'a self,
		users: &'a [UserId],
		category: NotificationCategory,
	) -> PreferenceFuture<'a>;
}

/// In-process preference table for single-node deployments and tests.
///
/// Users without an entry are treated as opted out.
#[derive(Debug, Default)]
pub struct MemoryPreferences(RwLock<HashMap<UserId, HashSet<NotificationCategory>>>);
impl MemoryPreferences {
	/// Enables `category` for `user`.
	pub fn opt_in(&self, user: UserId, category: NotificationCategory) {
		self.0.write().entry(user).or_default().insert(category);
	}

	/// Disables `category` for `user`.
	pub fn opt_out(&self, user: &UserId, category: NotificationCategory) {
		if let Some(flags) = self.0.write().get_mut(user) {
			flags.remove(&category);
		}
	}

	/// Returns `true` when `user` opted in to `category`.
	pub fn is_enabled(&self, user: &UserId, category: NotificationCategory) -> bool {
		self.0.read().get(user).is_some_and(|flags| flags.contains(&category))
	}
}
impl PreferenceLookup for MemoryPreferences {
	fn find<'a>(
		&'a self,
		users: &'a [UserId],
		category: NotificationCategory,
	) -> PreferenceFuture<'a> {
		Box::pin(async move {
			let table = self.0.read();

			Ok(users
				.iter()
				.filter(|user| table.get(*user).is_some_and(|flags| flags.contains(&category)))
				.cloned()
				.collect())
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn user(id: &str) -> UserId {
		UserId::new(id).expect("User fixture should be valid.")
	}

	#[tokio::test]
	async fn find_returns_opted_in_subset() {
		let preferences = MemoryPreferences::default();

		preferences.opt_in(user("alice"), NotificationCategory::Outbid);
		preferences.opt_in(user("bob"), NotificationCategory::AuctionEnded);

		let found = preferences
			.find(&[user("alice"), user("bob"), user("carol")], NotificationCategory::Outbid)
			.await
			.expect("In-memory preference lookup should not fail.");

		assert_eq!(found, HashSet::from([user("alice")]));
	}

	#[test]
	fn opt_out_clears_single_flag() {
		let preferences = MemoryPreferences::default();
		let alice = user("alice");

		preferences.opt_in(alice.clone(), NotificationCategory::Outbid);
		preferences.opt_in(alice.clone(), NotificationCategory::AuctionWon);
		preferences.opt_out(&alice, NotificationCategory::Outbid);

		assert!(!preferences.is_enabled(&alice, NotificationCategory::Outbid));
		assert!(preferences.is_enabled(&alice, NotificationCategory::AuctionWon));
	}

	#[test]
	fn category_labels_match_serde() {
		let payload = serde_json::to_string(&NotificationCategory::AuctionEnded)
			.expect("Category should serialize to JSON.");

		assert_eq!(payload, format!("\"{}\"", NotificationCategory::AuctionEnded));
	}
}
