//! Edit-application facade.
//!
//! Snapshot selections into tracked ranges, let the host change the document,
//! then read the rebased selections back. Registrations are scoped to the
//! call and released on every exit path, including cancellation.

use std::future::Future;
use std::sync::Arc;

use tether_primitives::{Edit, RangeExpansionBehavior, ReplaceMarker, Selection, TextRange, TrackedRange};

use crate::error::{BoxError, TrackError};
use crate::host::{EditableEditor, TextDocument};
use crate::registry::{RangeList, RangeRegistry, ReplaceMarkerList};

/// Selections tracked together under one expansion behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeGroup {
	/// Selections in the document's current coordinates.
	pub selections: Vec<Selection>,
	/// Expansion behavior applied to every selection in the group.
	pub behavior: RangeExpansionBehavior,
}

impl RangeGroup {
	/// Creates a group with an explicit behavior.
	pub fn new(selections: Vec<Selection>, behavior: RangeExpansionBehavior) -> Self {
		Self { selections, behavior }
	}

	/// Creates a `ClosedClosed` group.
	pub fn closed(selections: Vec<Selection>) -> Self {
		Self::new(selections, RangeExpansionBehavior::ClosedClosed)
	}
}

impl From<Vec<TextRange>> for RangeGroup {
	fn from(ranges: Vec<TextRange>) -> Self {
		Self::closed(ranges.into_iter().map(Selection::from).collect())
	}
}

impl From<Vec<Selection>> for RangeGroup {
	fn from(selections: Vec<Selection>) -> Self {
		Self::closed(selections)
	}
}

/// Applies `edits` through `editor` and returns `groups` rebased past them.
///
/// The result has one entry per group, each with as many selections as the
/// group had, in order and with their directions kept.
///
/// # Errors
///
/// [`TrackError::EditConflict`] if the host refused the batch, and
/// [`TrackError::MalformedBatch`] if a change event seen during the call was
/// malformed.
pub async fn perform_edits_and_track(
	registry: &Arc<RangeRegistry>,
	editor: &dyn EditableEditor,
	edits: &[Edit],
	groups: &[RangeGroup],
) -> Result<Vec<Vec<Selection>>, TrackError> {
	let document = editor.document();
	let snapshot = GroupSnapshot::capture(document.as_ref(), groups);
	let _registration = registry.register_range_list(document.uri(), &snapshot.list);

	if !perform_document_edits(registry, editor, edits).await? {
		let version = document.version();
		tracing::debug!(uri = %document.uri(), version, edits = edits.len(), "track.apply_rejected");
		return Err(TrackError::EditConflict {
			uri: document.uri().to_owned(),
			version,
		});
	}

	snapshot.read_back(document.as_ref())
}

/// Awaits `operation` and returns `groups` rebased past whatever it changed.
///
/// With no change events for `document` the groups come back unchanged.
///
/// # Errors
///
/// [`TrackError::Operation`] if the operation failed, and
/// [`TrackError::MalformedBatch`] if a change event seen meanwhile was
/// malformed.
pub async fn run_and_track<F, E>(
	registry: &Arc<RangeRegistry>,
	document: &dyn TextDocument,
	operation: F,
	groups: &[RangeGroup],
) -> Result<Vec<Vec<Selection>>, TrackError>
where
	F: Future<Output = Result<(), E>> + Send,
	E: Into<BoxError>,
{
	let snapshot = GroupSnapshot::capture(document, groups);
	let _registration = registry.register_range_list(document.uri(), &snapshot.list);

	operation.await.map_err(|error| TrackError::Operation(error.into()))?;

	snapshot.read_back(document)
}

/// Applies `edits`, registering the `Replace`-mode ones as replace markers for
/// the duration of the call.
///
/// Returns whether the host applied the batch.
pub async fn perform_document_edits(registry: &Arc<RangeRegistry>, editor: &dyn EditableEditor, edits: &[Edit]) -> Result<bool, TrackError> {
	let document = editor.document();
	let markers = ReplaceMarkerList::new();
	for edit in edits.iter().filter(|edit| edit.is_replace()) {
		markers.push(ReplaceMarker::new(
			document.offset_at(edit.range.start),
			document.offset_at(edit.range.end),
			edit.text.as_str(),
		));
	}
	let _registration = (!markers.is_empty()).then(|| registry.register_replace_markers(document.uri(), &markers));

	Ok(editor.apply_edits(edits).await)
}

/// Flattened tracked ranges for a list of groups.
struct GroupSnapshot {
	list: RangeList,
	sizes: Vec<usize>,
}

impl GroupSnapshot {
	fn capture(document: &dyn TextDocument, groups: &[RangeGroup]) -> Self {
		let list = RangeList::new();
		list.extend(groups.iter().flat_map(|group| {
			group.selections.iter().map(|selection| {
				TrackedRange::from_anchor_active(document.offset_at(selection.anchor), document.offset_at(selection.active), group.behavior)
			})
		}));
		Self {
			list,
			sizes: groups.iter().map(|group| group.selections.len()).collect(),
		}
	}

	fn read_back(&self, document: &dyn TextDocument) -> Result<Vec<Vec<Selection>>, TrackError> {
		if let Some(source) = self.list.error() {
			return Err(TrackError::MalformedBatch {
				uri: document.uri().to_owned(),
				source,
			});
		}

		let ranges = self.list.snapshot();
		let mut ranges = ranges.iter();
		let groups: Vec<Vec<Selection>> = self
			.sizes
			.iter()
			.map(|&size| {
				ranges
					.by_ref()
					.take(size)
					.map(|range| {
						let (anchor, active) = range.anchor_active();
						Selection::new(document.position_at(anchor), document.position_at(active))
					})
					.collect()
			})
			.collect();

		tracing::trace!(uri = %document.uri(), version = document.version(), groups = groups.len(), ranges = self.sizes.iter().sum::<usize>(), "track.complete");
		Ok(groups)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use tether_primitives::Position;

	use super::*;
	use crate::memory::MemoryWorkspace;

	fn pos(line: u32, character: u32) -> Position {
		Position::new(line, character)
	}

	#[test]
	fn test_snapshot_round_trips_groups_without_changes() {
		let ws = MemoryWorkspace::new();
		let doc = ws.open("memory:///snap.txt", "one\ntwo\nthree");
		let groups = vec![
			RangeGroup::closed(vec![Selection::new(pos(1, 3), pos(0, 1))]),
			RangeGroup::closed(Vec::new()),
			RangeGroup::new(vec![Selection::point(pos(2, 5)), Selection::new(pos(0, 0), pos(2, 1))], RangeExpansionBehavior::OpenOpen),
		];

		let snapshot = GroupSnapshot::capture(&doc, &groups);
		assert_eq!(snapshot.sizes, vec![1, 0, 2]);
		let back = snapshot.read_back(&doc).unwrap();
		let expected: Vec<Vec<Selection>> = groups.into_iter().map(|g| g.selections).collect();
		assert_eq!(back, expected);
	}

	#[test]
	fn test_group_from_text_ranges_is_closed_and_forward() {
		let group = RangeGroup::from(vec![TextRange::new(pos(0, 4), pos(0, 2))]);
		assert_eq!(group.behavior, RangeExpansionBehavior::ClosedClosed);
		assert_eq!(group.selections, vec![Selection::new(pos(0, 2), pos(0, 4))]);
	}
}
