//! Commission policy record, administrative update requests, and fee quotes.

// self
use crate::{_prelude::*, error::ValidationError, market::UserId};

/// How a commission is derived from a sale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommissionKind {
	/// Flat amount charged regardless of the sale price.
	Fixed,
	/// Share of the sale price, expressed in percent.
	Percentage,
}
impl CommissionKind {
	/// Returns the stable label used by the administrative surface and serialized records.
	pub const fn as_str(self) -> &'static str {
		match self {
			CommissionKind::Fixed => "fixed",
			CommissionKind::Percentage => "percentage",
		}
	}
}
impl Display for CommissionKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for CommissionKind {
	type Err = ValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"fixed" => Ok(Self::Fixed),
			"percentage" => Ok(Self::Percentage),
			other => Err(ValidationError::UnknownKind { kind: other.to_owned() }),
		}
	}
}

/// The marketplace-wide commission policy; at most one record exists per deployment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommissionPolicy {
	/// Fee derivation mode.
	pub kind: CommissionKind,
	/// Flat amount for [`CommissionKind::Fixed`], percent in `[0, 100]` otherwise.
	pub value: f64,
	/// Free-text note shown to administrators.
	pub description: String,
	/// Administrator who last changed the policy; `None` for the seeded default.
	pub updated_by: Option<UserId>,
	/// Instant the record was first persisted.
	pub created_at: OffsetDateTime,
	/// Instant of the most recent change.
	pub updated_at: OffsetDateTime,
}
impl CommissionPolicy {
	/// Kind used when no policy has been configured.
	pub const DEFAULT_KIND: CommissionKind = CommissionKind::Percentage;
	/// Value used when no policy has been configured.
	pub const DEFAULT_VALUE: f64 = 5.;
	/// Description stamped on new records unless the administrator supplies one.
	pub const DEFAULT_DESCRIPTION: &'static str = "Platform commission";

	/// Builds the default 5% policy stamped at `now`.
	pub fn default_at(now: OffsetDateTime) -> Self {
		Self {
			kind: Self::DEFAULT_KIND,
			value: Self::DEFAULT_VALUE,
			description: Self::DEFAULT_DESCRIPTION.into(),
			updated_by: None,
			created_at: now,
			updated_at: now,
		}
	}

	/// Applies an already validated change, keeping `created_at` intact.
	pub fn apply(&mut self, change: &ValidatedUpdate, now: OffsetDateTime) {
		self.kind = change.kind;
		self.value = change.value;

		if let Some(description) = &change.description {
			self.description = description.clone();
		}

		self.updated_by = Some(change.acting_user.clone());
		self.updated_at = now;
	}

	/// Derives the commission owed on `final_price` under this policy.
	///
	/// Fixed fees ignore the price; percentage fees are rounded to two decimal places.
	pub fn quote(&self, final_price: f64) -> FeeQuote {
		let amount = match self.kind {
			CommissionKind::Fixed => self.value,
			CommissionKind::Percentage => round_cents(final_price * self.value / 100.),
		};

		FeeQuote { kind: self.kind, value: self.value, amount, fallback: false }
	}
}

/// Fee derived from a sale price.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeeQuote {
	/// Kind of the policy that produced the quote.
	pub kind: CommissionKind,
	/// Policy value that produced the quote.
	pub value: f64,
	/// Commission owed.
	pub amount: f64,
	/// `true` when no stored policy was available and the hard-coded default was used.
	#[serde(default)]
	pub fallback: bool,
}
impl FeeQuote {
	/// Hard-coded 5% quote used when the policy record cannot be read.
	///
	/// Unlike [`CommissionPolicy::quote`] the amount is not rounded.
	pub fn fallback(final_price: f64) -> Self {
		let value = CommissionPolicy::DEFAULT_VALUE;

		Self {
			kind: CommissionPolicy::DEFAULT_KIND,
			value,
			amount: final_price * value / 100.,
			fallback: true,
		}
	}
}

/// Raw administrative request to change the commission policy.
#[derive(Clone, Debug, PartialEq)]
pub struct PolicyUpdate {
	/// Requested kind label (`fixed` or `percentage`).
	pub kind: String,
	/// Requested value; `None` when the form field was left empty.
	pub value: Option<f64>,
	/// Replacement description, if any.
	pub description: Option<String>,
	/// Administrator performing the change.
	pub acting_user: UserId,
}
impl PolicyUpdate {
	/// Creates a request for the provided kind label, value, and acting administrator.
	pub fn new(kind: impl Into<String>, value: Option<f64>, acting_user: UserId) -> Self {
		Self { kind: kind.into(), value, description: None, acting_user }
	}

	/// Replaces the description alongside the kind/value change.
	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());

		self
	}

	/// Checks the request against the policy constraints.
	pub fn validate(&self) -> Result<ValidatedUpdate, ValidationError> {
		let kind = self.kind.parse::<CommissionKind>()?;
		let value = self.value.ok_or(ValidationError::MissingValue)?;

		if !value.is_finite() {
			return Err(ValidationError::NonFiniteValue);
		}
		if value < 0. {
			return Err(ValidationError::NegativeValue { value });
		}
		if kind == CommissionKind::Percentage && value > 100. {
			return Err(ValidationError::PercentageOutOfRange { value });
		}

		Ok(ValidatedUpdate {
			kind,
			value,
			description: self.description.clone(),
			acting_user: self.acting_user.clone(),
		})
	}
}

/// Policy change that passed [`PolicyUpdate::validate`].
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedUpdate {
	/// Parsed kind.
	pub kind: CommissionKind,
	/// Checked value.
	pub value: f64,
	/// Replacement description, if any.
	pub description: Option<String>,
	/// Administrator performing the change.
	pub acting_user: UserId,
}
impl ValidatedUpdate {
	/// Builds the first policy record from this change.
	pub fn into_policy(self, now: OffsetDateTime) -> CommissionPolicy {
		CommissionPolicy {
			kind: self.kind,
			value: self.value,
			description: self
				.description
				.unwrap_or_else(|| CommissionPolicy::DEFAULT_DESCRIPTION.into()),
			updated_by: Some(self.acting_user),
			created_at: now,
			updated_at: now,
		}
	}
}

fn round_cents(amount: f64) -> f64 {
	(amount * 100.).round() / 100.
}
