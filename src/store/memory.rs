//! Thread-safe in-memory [`PolicyRecordStore`] implementation for single-process deployments
//! and tests.

// self
use crate::{
	_prelude::*,
	market::CommissionPolicy,
	store::{InsertOutcome, PolicyRecordStore, StoreFuture},
};

type PolicySlot = Arc<RwLock<Option<CommissionPolicy>>>;

/// Storage backend that keeps the policy record in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(PolicySlot);
impl MemoryStore {
	fn insert_now(slot: PolicySlot, policy: CommissionPolicy) -> InsertOutcome {
		let mut guard = slot.write();

		if guard.is_some() {
			return InsertOutcome::AlreadyExists;
		}

		*guard = Some(policy);

		InsertOutcome::Inserted
	}

	fn update_now(slot: PolicySlot, policy: CommissionPolicy) -> Option<CommissionPolicy> {
		let mut guard = slot.write();

		match guard.as_mut() {
			Some(existing) => {
				*existing = policy;

				Some(existing.clone())
			},
			None => None,
		}
	}
}
impl PolicyRecordStore for MemoryStore {
	fn find_one(&self) -> StoreFuture<'_, Option<CommissionPolicy>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().clone()) })
	}

	fn insert_if_absent(&self, policy: CommissionPolicy) -> StoreFuture<'_, InsertOutcome> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(Self::insert_now(slot, policy)) })
	}

	fn update(&self, policy: CommissionPolicy) -> StoreFuture<'_, Option<CommissionPolicy>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(Self::update_now(slot, policy)) })
	}
}
