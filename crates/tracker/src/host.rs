//! Host editor abstraction.
//!
//! The tracker never owns document text. It observes a host through these
//! traits: documents answer coordinate queries, editors apply edits, and an
//! event source reports every applied batch to subscribed listeners.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tether_primitives::{CharIdx, CharLen, ContentChange, Edit, Position, Selection, TextRange};

/// A live view of one open document.
///
/// Every query reflects the document's current version. Out-of-range
/// positions clamp to the document: a line past the end maps to the end of the
/// document, a character past the end of its line maps to the end of that line
/// (line terminator excluded).
pub trait TextDocument: Send + Sync {
	/// Stable identifier of the document.
	fn uri(&self) -> &str;

	/// Monotonically increasing version, bumped once per applied batch.
	fn version(&self) -> u64;

	/// Full document text.
	fn text(&self) -> String;

	/// Document length in characters.
	fn len_chars(&self) -> CharLen;

	/// Text covered by `range`.
	fn text_in(&self, range: TextRange) -> String;

	/// Character offset of `pos`.
	fn offset_at(&self, pos: Position) -> CharIdx;

	/// Position of the character offset `offset`.
	fn position_at(&self, offset: CharIdx) -> Position;
}

/// An editor bound to one document.
#[async_trait]
pub trait EditableEditor: Send + Sync {
	/// The document this editor edits.
	fn document(&self) -> Arc<dyn TextDocument>;

	/// Current selections, primary first.
	fn selections(&self) -> Vec<Selection>;

	/// Replaces the editor's selections.
	async fn set_selections(&self, selections: Vec<Selection>);

	/// Applies `edits` as one atomic batch.
	///
	/// Returns `false` if the host refused the batch, in which case the
	/// document is unchanged. The host must deliver the resulting
	/// [`DocumentChangeEvent`] to its listeners before this future resolves.
	async fn apply_edits(&self, edits: &[Edit]) -> bool;
}

/// One applied batch, as reported by the host.
///
/// `changes` are in pre-edit offsets of the previous version, in whatever order
/// the host chose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChangeEvent {
	/// Document the batch was applied to.
	pub uri: String,
	/// Version after the batch.
	pub version: u64,
	/// The batch itself.
	pub changes: Vec<ContentChange>,
}

/// Receives change events synchronously from a [`ChangeEventSource`].
pub trait ChangeListener: Send + Sync {
	/// Called once per applied batch.
	fn on_did_change(&self, event: &DocumentChangeEvent);
}

/// A host that publishes [`DocumentChangeEvent`]s.
pub trait ChangeEventSource {
	/// Registers `listener` until the returned [`Subscription`] is dropped.
	fn subscribe(&self, listener: Arc<dyn ChangeListener>) -> Subscription;
}

/// Keeps a listener subscribed; unsubscribes on drop.
pub struct Subscription {
	cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
	/// Creates a subscription that runs `cancel` once when released.
	pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
		Self {
			cancel: Some(Box::new(cancel)),
		}
	}

	fn release(&mut self) {
		if let Some(cancel) = self.cancel.take() {
			cancel();
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.release();
	}
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription").field("active", &self.cancel.is_some()).finish()
	}
}
