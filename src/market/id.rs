//! Marketplace keys for auctions and users.
//!
//! Both are opaque keys minted by the surrounding marketplace (database ids, slugs, or UUIDs).
//! [`MarketId`] keeps them apart at the type level and restricts them to URL- and log-safe ASCII
//! so they can be embedded in notification links and structured log fields unescaped.

// std
use std::{borrow::Borrow, hash::Hash, marker::PhantomData};
// crates.io
use serde::{Deserializer, Serializer, de::Error as _};
// self
use crate::_prelude::*;

/// Maximum length of a marketplace key.
pub const MARKET_ID_MAX_LEN: usize = 128;

/// Kind of entity a [`MarketId`] refers to.
pub trait IdScope
where
	Self: 'static + Clone + Eq + Hash,
{
	/// Label used in validation errors and `Debug` output.
	const LABEL: &'static str;
}

/// Marker for auction listing keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuctionScope {}
impl IdScope for AuctionScope {
	const LABEL: &'static str = "Auction";
}

/// Marker for marketplace user keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UserScope {}
impl IdScope for UserScope {
	const LABEL: &'static str = "User";
}

/// Unique identifier for an auction listing.
pub type AuctionId = MarketId<AuctionScope>;
/// Unique identifier for a marketplace user (bidder, seller, or administrator).
pub type UserId = MarketId<UserScope>;

/// Validated key scoped to one kind of marketplace entity.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MarketId<K>
where
	K: IdScope,
{
	value: String,
	scope: PhantomData<K>,
}
impl<K> MarketId<K>
where
	K: IdScope,
{
	/// Validates and wraps `value`.
	pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
		let value = value.into();

		check_key(K::LABEL, &value)?;

		Ok(Self { value, scope: PhantomData })
	}

	/// Returns the key as a string slice.
	pub fn as_str(&self) -> &str {
		&self.value
	}
}
impl<K> AsRef<str> for MarketId<K>
where
	K: IdScope,
{
	fn as_ref(&self) -> &str {
		&self.value
	}
}
impl<K> Borrow<str> for MarketId<K>
where
	K: IdScope,
{
	fn borrow(&self) -> &str {
		&self.value
	}
}
impl<K> TryFrom<String> for MarketId<K>
where
	K: IdScope,
{
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl<K> From<MarketId<K>> for String
where
	K: IdScope,
{
	fn from(id: MarketId<K>) -> Self {
		id.value
	}
}
impl<K> Debug for MarketId<K>
where
	K: IdScope,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}({})", K::LABEL, self.value)
	}
}
impl<K> Display for MarketId<K>
where
	K: IdScope,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.value)
	}
}
impl<K> Serialize for MarketId<K>
where
	K: IdScope,
{
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.value)
	}
}
impl<'de, K> Deserialize<'de> for MarketId<K>
where
	K: IdScope,
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		Self::new(String::deserialize(deserializer)?).map_err(D::Error::custom)
	}
}

/// Error returned when a marketplace key is rejected.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// The key was empty.
	#[error("{kind} key cannot be empty.")]
	Empty {
		/// Entity label (auction, user).
		kind: &'static str,
	},
	/// The key contains a character outside `[A-Za-z0-9._:-]`.
	#[error("{kind} key contains unsupported character {found:?}.")]
	UnsupportedCharacter {
		/// Entity label (auction, user).
		kind: &'static str,
		/// First offending character.
		found: char,
	},
	/// The key is longer than [`MARKET_ID_MAX_LEN`].
	#[error("{kind} key exceeds {max} characters.")]
	TooLong {
		/// Entity label (auction, user).
		kind: &'static str,
		/// Maximum permitted length.
		max: usize,
	},
}

fn check_key(kind: &'static str, key: &str) -> Result<(), IdentifierError> {
	if key.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if let Some(found) = key.chars().find(|c| !is_key_char(*c)) {
		return Err(IdentifierError::UnsupportedCharacter { kind, found });
	}
	// Every accepted character is ASCII, so bytes and characters coincide.
	if key.len() > MARKET_ID_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: MARKET_ID_MAX_LEN });
	}

	Ok(())
}

fn is_key_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':')
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn keys_reject_whitespace_and_markup() {
		assert_eq!(
			UserId::new(" bidder-1"),
			Err(IdentifierError::UnsupportedCharacter { kind: "User", found: ' ' })
		);
		assert_eq!(
			AuctionId::new("lot<42>"),
			Err(IdentifierError::UnsupportedCharacter { kind: "Auction", found: '<' })
		);
		assert_eq!(AuctionId::new(""), Err(IdentifierError::Empty { kind: "Auction" }));

		let user = UserId::new("bidder-1").expect("User fixture should be considered valid.");

		assert_eq!(user.as_str(), "bidder-1");
		assert_eq!(format!("{user:?}"), "User(bidder-1)");
	}

	#[test]
	fn uuid_and_namespaced_keys_are_accepted() {
		AuctionId::new("6f1c2a3e-9b7d-4e0a-8c55-2d4b1f0e9a77")
			.expect("UUID auction key should be accepted.");
		UserId::new("tenant:eu.user_42").expect("Namespaced user key should be accepted.");
	}

	#[test]
	fn serde_enforces_validation() {
		let auction: AuctionId =
			serde_json::from_str("\"lot-42\"").expect("Auction key should deserialize.");

		assert_eq!(auction.as_ref(), "lot-42");
		assert_eq!(
			serde_json::to_string(&auction).expect("Auction key should serialize."),
			"\"lot-42\""
		);
		assert!(serde_json::from_str::<AuctionId>("\"lot 42\"").is_err());
	}

	#[test]
	fn length_limit_is_inclusive() {
		UserId::new("u".repeat(MARKET_ID_MAX_LEN)).expect("Exact length should succeed.");

		assert_eq!(
			UserId::new("u".repeat(MARKET_ID_MAX_LEN + 1)),
			Err(IdentifierError::TooLong { kind: "User", max: MARKET_ID_MAX_LEN })
		);
	}

	#[test]
	fn borrow_supports_lookup_by_str() {
		let recipients: HashSet<UserId> = HashSet::from_iter([
			UserId::new("bidder-7").expect("User used for lookup should be valid."),
		]);

		assert!(recipients.contains("bidder-7"));
	}
}
