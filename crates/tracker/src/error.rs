//! Error types for tracking transactions.

use tether_primitives::MalformedBatch;
use thiserror::Error;

/// Boxed error returned by opaque operations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the edit-application facade and transactions.
#[derive(Debug, Error)]
pub enum TrackError {
	/// The host refused to apply the edit batch.
	#[error("host rejected edits for {uri} at version {version}")]
	EditConflict {
		/// Target document.
		uri: String,
		/// Document version when the batch was refused.
		version: u64,
	},
	/// A change event for the document violated the non-overlap invariant
	/// while the transaction's ranges were registered.
	#[error("malformed change batch for {uri}: {source}")]
	MalformedBatch {
		/// Document the batch was reported for.
		uri: String,
		/// The violation.
		source: MalformedBatch,
	},
	/// The opaque operation failed.
	#[error("operation failed: {0}")]
	Operation(#[source] BoxError),
	/// The transaction was assembled incorrectly.
	#[error("invalid transaction: {0}")]
	InvalidTransaction(&'static str),
}
