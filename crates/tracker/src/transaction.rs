//! Multi-group tracking transactions.

use std::future::Future;
use std::sync::Arc;

use tether_primitives::{Edit, RangeExpansionBehavior, Selection};

use crate::error::{BoxError, TrackError};
use crate::host::EditableEditor;
use crate::operation::{self, Operation};
use crate::registry::RangeRegistry;
use crate::track::{RangeGroup, perform_edits_and_track, run_and_track};

#[cfg(test)]
mod tests;

/// Index of a group within a [`RangeTransaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(usize);

impl GroupId {
	/// Position of the group in registration order.
	pub fn index(self) -> usize {
		self.0
	}
}

/// Rebased groups returned by [`RangeTransaction::run`], in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackedGroups {
	groups: Vec<Vec<Selection>>,
}

impl TrackedGroups {
	/// Selections of one group.
	pub fn get(&self, id: GroupId) -> Option<&[Selection]> {
		self.groups.get(id.0).map(Vec::as_slice)
	}

	/// Number of groups.
	pub fn len(&self) -> usize {
		self.groups.len()
	}

	/// True when the transaction tracked no groups.
	pub fn is_empty(&self) -> bool {
		self.groups.is_empty()
	}

	/// All groups in registration order.
	pub fn into_vec(self) -> Vec<Vec<Selection>> {
		self.groups
	}
}

/// Builds one edit application that tracks several groups at once.
///
/// Supply either [`edits`](Self::edits) or an [`operation`](Self::operation).
/// Unless editor selections are preserved, the editor's selections are
/// tracked as an extra `ClosedClosed` group and written back afterwards.
pub struct RangeTransaction<'a> {
	registry: &'a Arc<RangeRegistry>,
	editor: &'a dyn EditableEditor,
	groups: Vec<RangeGroup>,
	edits: Option<Vec<Edit>>,
	operation: Option<Operation<'a>>,
	preserve_editor_selections: bool,
}

impl<'a> RangeTransaction<'a> {
	/// Starts a transaction against `editor`.
	pub fn new(registry: &'a Arc<RangeRegistry>, editor: &'a dyn EditableEditor) -> Self {
		Self {
			registry,
			editor,
			groups: Vec::new(),
			edits: None,
			operation: None,
			preserve_editor_selections: registry.config().preserve_editor_selections,
		}
	}

	/// Tracks `selections` with `behavior`.
	pub fn track(&mut self, selections: Vec<Selection>, behavior: RangeExpansionBehavior) -> GroupId {
		self.add_group(RangeGroup::new(selections, behavior))
	}

	/// Tracks `selections` with the registry's configured default behavior.
	pub fn track_default(&mut self, selections: Vec<Selection>) -> GroupId {
		let behavior = self.registry.config().default_behavior;
		self.track(selections, behavior)
	}

	/// Tracks a prepared group.
	pub fn add_group(&mut self, group: RangeGroup) -> GroupId {
		self.groups.push(group);
		GroupId(self.groups.len() - 1)
	}

	/// Sets the edits to apply.
	pub fn edits(&mut self, edits: Vec<Edit>) -> &mut Self {
		self.edits = Some(edits);
		self
	}

	/// Sets an opaque operation to run instead of edits.
	pub fn operation<F, E>(&mut self, operation: F) -> &mut Self
	where
		F: Future<Output = Result<(), E>> + Send + 'a,
		E: Into<BoxError>,
	{
		self.operation = Some(operation::boxed(operation));
		self
	}

	/// Leaves the editor's selections untouched when set.
	pub fn preserve_editor_selections(&mut self, preserve: bool) -> &mut Self {
		self.preserve_editor_selections = preserve;
		self
	}

	/// Runs the transaction.
	///
	/// # Errors
	///
	/// [`TrackError::InvalidTransaction`] if both edits and an operation were
	/// supplied, otherwise whatever the underlying facade call reports.
	pub async fn run(self) -> Result<TrackedGroups, TrackError> {
		let Self {
			registry,
			editor,
			mut groups,
			edits,
			operation,
			preserve_editor_selections,
		} = self;

		let action = match (edits, operation) {
			(Some(_), Some(_)) => return Err(TrackError::InvalidTransaction("edits and operation are mutually exclusive")),
			(None, None) => {
				return Ok(TrackedGroups {
					groups: groups.into_iter().map(|group| group.selections).collect(),
				});
			}
			(Some(edits), None) => Action::Edits(edits),
			(None, Some(operation)) => Action::Operation(operation),
		};

		let tracks_editor = !preserve_editor_selections;
		if tracks_editor {
			groups.push(RangeGroup::closed(editor.selections()));
		}

		let mut results = match action {
			Action::Edits(edits) => perform_edits_and_track(registry, editor, &edits, &groups).await?,
			Action::Operation(operation) => {
				let document = editor.document();
				run_and_track(registry, document.as_ref(), operation, &groups).await?
			}
		};

		if tracks_editor && let Some(selections) = results.pop() {
			editor.set_selections(selections).await;
		}

		Ok(TrackedGroups { groups: results })
	}
}

enum Action<'a> {
	Edits(Vec<Edit>),
	Operation(Operation<'a>),
}
