//! Storage contracts and built-in backends for the singleton commission policy record.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, market::CommissionPolicy};

/// Boxed future returned by [`PolicyRecordStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for the commission policy record.
///
/// Backends hold at most one record. [`PolicyRecordStore::insert_if_absent`] must decide
/// "absent" and write the record as one atomic step (a uniqueness constraint, conditional put,
/// or a write lock spanning both), so concurrent first-run initialization cannot produce two
/// records.
pub trait PolicyRecordStore
where
	Self: Send + Sync,
{
	/// Fetches the policy record, if one exists.
	fn find_one(&self) -> StoreFuture<'_, Option<CommissionPolicy>>;

	/// Persists `policy` only when no record exists yet.
	fn insert_if_absent(&self, policy: CommissionPolicy) -> StoreFuture<'_, InsertOutcome>;

	/// Replaces the existing record, returning the stored value, or `None` when there is no
	/// record to replace.
	fn update(&self, policy: CommissionPolicy) -> StoreFuture<'_, Option<CommissionPolicy>>;
}

/// Result of an insert-if-absent attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsertOutcome {
	/// No record existed and the provided policy was stored.
	Inserted,
	/// A record already existed; nothing was written.
	AlreadyExists,
}

/// Error type produced by [`PolicyRecordStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
