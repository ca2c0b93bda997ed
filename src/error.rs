//! Crate-level error types shared by the commission store, policy backends, and dispatcher.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical error exposed by public APIs.
///
/// Per-recipient delivery failures are deliberately absent: they are isolated inside a dispatch
/// and reported through [`crate::notify::DispatchReport`].
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure (policy record or preference backend unavailable).
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Administrative input was rejected.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Identifier could not be parsed.
	#[error(transparent)]
	Identifier(#[from] crate::market::IdentifierError),
}

/// Reasons a commission policy update is rejected.
///
/// Messages are written for the administrative surface and may be shown verbatim.
#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum ValidationError {
	/// Commission kind is neither `fixed` nor `percentage`.
	#[error("Commission type `{kind}` is not supported; expected `fixed` or `percentage`.")]
	UnknownKind {
		/// Label supplied by the caller.
		kind: String,
	},
	/// No commission value was supplied.
	#[error("Commission value is required.")]
	MissingValue,
	/// Commission value is NaN or infinite.
	#[error("Commission value must be a finite number.")]
	NonFiniteValue,
	/// Commission value is below zero.
	#[error("Commission value cannot be negative (got {value}).")]
	NegativeValue {
		/// Rejected value.
		value: f64,
	},
	/// Percentage commission exceeds 100.
	#[error("Commission percentage cannot exceed 100 (got {value}).")]
	PercentageOutOfRange {
		/// Rejected value.
		value: f64,
	},
}

/// Configuration failures raised while loading dispatcher settings.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Dispatch configuration JSON could not be parsed.
	#[error("Dispatch configuration is invalid.")]
	InvalidDispatchConfig {
		/// Structured parsing failure including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Debounce window is negative.
	#[error("Debounce window must not be negative.")]
	NegativeWindow,
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn store_error_converts_into_crate_error_with_source() {
		let store_error = StoreError::Backend { message: "database unreachable".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("database unreachable"));

		let source = StdError::source(&error)
			.expect("Crate error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn validation_messages_are_admin_readable() {
		let error: Error = ValidationError::PercentageOutOfRange { value: 150. }.into();

		assert_eq!(error.to_string(), "Commission percentage cannot exceed 100 (got 150).");
		assert_eq!(
			ValidationError::UnknownKind { kind: "other".into() }.to_string(),
			"Commission type `other` is not supported; expected `fixed` or `percentage`."
		);
	}
}
