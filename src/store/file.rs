//! Simple file-backed [`PolicyRecordStore`] for lightweight single-node deployments.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	market::CommissionPolicy,
	store::{InsertOutcome, PolicyRecordStore, StoreError, StoreFuture},
};

/// Persists the policy record to a JSON file after each mutation.
///
/// Writes go through the in-process lock, so the insert-if-absent guarantee holds for every
/// handle cloned from the same [`FileStore::open`] call, not for separate processes sharing
/// the file.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<Option<CommissionPolicy>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading an existing record.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Returns the snapshot location.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<Option<CommissionPolicy>, StoreError> {
		if !path.exists() {
			return Ok(None);
		}

		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(None);
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &Option<CommissionPolicy>) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(contents).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize policy snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl PolicyRecordStore for FileStore {
	fn find_one(&self) -> StoreFuture<'_, Option<CommissionPolicy>> {
		Box::pin(async move { Ok(self.inner.read().clone()) })
	}

	fn insert_if_absent(&self, policy: CommissionPolicy) -> StoreFuture<'_, InsertOutcome> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			if guard.is_some() {
				return Ok(InsertOutcome::AlreadyExists);
			}

			let staged = Some(policy);

			// Only publish the record once it reached disk.
			self.persist_locked(&staged)?;
			*guard = staged;

			Ok(InsertOutcome::Inserted)
		})
	}

	fn update(&self, policy: CommissionPolicy) -> StoreFuture<'_, Option<CommissionPolicy>> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			if guard.is_none() {
				return Ok(None);
			}

			let staged = Some(policy);

			self.persist_locked(&staged)?;
			*guard = staged;

			Ok(guard.clone())
		})
	}
}
