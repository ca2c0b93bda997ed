//! Commission policy service: singleton initialization, validated updates, and fee quotes.
//!
//! [`CommissionPolicyStore`] never checks for an existing record and then writes; creation
//! always goes through [`PolicyRecordStore::insert_if_absent`], and losing that race falls back
//! to re-reading the winner's record. [`CommissionPolicyStore::compute_fee`] swallows every
//! lookup failure and quotes the hard-coded 5% default instead.

// std
use std::panic::AssertUnwindSafe;
// crates.io
use futures::FutureExt;
// self
use crate::{
	_prelude::*,
	market::{CommissionPolicy, FeeQuote, PolicyUpdate, UserId, ValidatedUpdate},
	obs::{self, OpKind, OpOutcome, OpSpan},
	store::{InsertOutcome, PolicyRecordStore, StoreError},
};

/// Owns access to the singleton commission policy record.
#[derive(Clone)]
pub struct CommissionPolicyStore {
	store: Arc<dyn PolicyRecordStore>,
}
impl CommissionPolicyStore {
	/// Creates a service over the provided backend.
	pub fn new(store: Arc<dyn PolicyRecordStore>) -> Self {
		Self { store }
	}

	/// Returns the policy record, seeding the 5% default when none exists.
	///
	/// Concurrent callers racing on an empty store all return the single record that won the
	/// insert.
	pub async fn get_or_create_default(&self) -> Result<CommissionPolicy> {
		const KIND: OpKind = OpKind::EnsureDefaultPolicy;

		let span = OpSpan::new(KIND, "get_or_create_default");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async {
				if let Some(existing) = self.store.find_one().await? {
					return Ok(existing);
				}

				let seeded = CommissionPolicy::default_at(OffsetDateTime::now_utc());

				match self.store.insert_if_absent(seeded.clone()).await? {
					InsertOutcome::Inserted => Ok(seeded),
					InsertOutcome::AlreadyExists => self.refetch().await,
				}
			})
			.await;

		record_result(KIND, &result);

		result
	}

	/// Validates and applies an administrative change given as raw form values.
	pub async fn update(
		&self,
		kind: &str,
		value: Option<f64>,
		acting_user: &UserId,
	) -> Result<CommissionPolicy> {
		self.update_with(PolicyUpdate::new(kind, value, acting_user.clone())).await
	}

	/// Validates and applies `request`, mutating the existing record or creating the first one.
	///
	/// Validation runs before any storage access; a rejected request leaves the record untouched.
	pub async fn update_with(&self, request: PolicyUpdate) -> Result<CommissionPolicy> {
		const KIND: OpKind = OpKind::UpdatePolicy;

		let span = OpSpan::new(KIND, "update_with");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async {
				let change = request.validate()?;
				let now = OffsetDateTime::now_utc();

				if let Some(updated) = self.apply_to_existing(&change, now).await? {
					return Ok(updated);
				}

				let first = change.clone().into_policy(now);

				match self.store.insert_if_absent(first.clone()).await? {
					InsertOutcome::Inserted => Ok(first),
					// Another caller created the record in between; update theirs instead.
					InsertOutcome::AlreadyExists => self
						.apply_to_existing(&change, now)
						.await?
						.ok_or_else(|| Error::from(vanished())),
				}
			})
			.await;

		record_result(KIND, &result);

		result
	}

	/// Quotes the commission owed on `final_price`.
	///
	/// Never fails: a missing record, a storage error, or a panicking backend all yield
	/// [`FeeQuote::fallback`], whose amount is intentionally left unrounded.
	pub async fn compute_fee(&self, final_price: f64) -> FeeQuote {
		const KIND: OpKind = OpKind::ComputeFee;

		let span = OpSpan::new(KIND, "compute_fee");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let quote = span
			.instrument(async {
				let lookup = async { self.store.find_one().await };

				match AssertUnwindSafe(lookup).catch_unwind().await {
					Ok(Ok(Some(policy))) => policy.quote(final_price),
					Ok(Ok(None)) => {
						obs::log_fee_fallback(final_price, &"no commission policy configured");

						FeeQuote::fallback(final_price)
					},
					Ok(Err(e)) => {
						obs::log_fee_fallback(final_price, &e);

						FeeQuote::fallback(final_price)
					},
					Err(_) => {
						obs::log_fee_fallback(final_price, &"policy lookup panicked");

						FeeQuote::fallback(final_price)
					},
				}
			})
			.await;

		obs::record_op_outcome(
			KIND,
			if quote.fallback { OpOutcome::Fallback } else { OpOutcome::Success },
		);

		quote
	}

	async fn apply_to_existing(
		&self,
		change: &ValidatedUpdate,
		now: OffsetDateTime,
	) -> Result<Option<CommissionPolicy>, StoreError> {
		let Some(mut current) = self.store.find_one().await? else {
			return Ok(None);
		};

		current.apply(change, now);

		self.store.update(current).await
	}

	async fn refetch(&self) -> Result<CommissionPolicy> {
		self.store.find_one().await?.ok_or_else(vanished).map_err(Error::from)
	}
}
impl Debug for CommissionPolicyStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("CommissionPolicyStore(..)")
	}
}

fn vanished() -> StoreError {
	StoreError::Backend { message: "Policy record reported as existing could not be read".into() }
}

fn record_result<T>(kind: OpKind, result: &Result<T>) {
	match result {
		Ok(_) => obs::record_op_outcome(kind, OpOutcome::Success),
		Err(_) => obs::record_op_outcome(kind, OpOutcome::Failure),
	}
}
