use pretty_assertions::assert_eq;
use tether_primitives::{Position, TextRange};

use super::*;
use crate::config::TrackerConfig;
use crate::host::TextDocument;
use crate::memory::{MemoryEditor, MemoryWorkspace};

const URI: &str = "memory:///transaction.txt";

fn pos(line: u32, character: u32) -> Position {
	Position::new(line, character)
}

fn sel(a: u32, b: u32) -> Selection {
	Selection::new(pos(0, a), pos(0, b))
}

fn setup(text: &str, config: TrackerConfig) -> (MemoryWorkspace, Arc<RangeRegistry>, MemoryEditor) {
	let ws = MemoryWorkspace::new();
	let doc = ws.open(URI, text);
	let registry = RangeRegistry::with_config(&ws, config);
	let editor = MemoryEditor::new(&ws, doc);
	(ws, registry, editor)
}

#[tokio::test]
async fn test_groups_come_back_in_registration_order() {
	let (_ws, registry, editor) = setup("hello world", TrackerConfig::default());
	let mut tx = RangeTransaction::new(&registry, &editor);
	let closed = tx.track(vec![sel(0, 5), sel(6, 11)], RangeExpansionBehavior::ClosedClosed);
	let open = tx.track(vec![sel(5, 5)], RangeExpansionBehavior::OpenOpen);
	tx.edits(vec![Edit::insert(pos(0, 5), ",")]);

	let out = tx.run().await.unwrap();
	assert_eq!(out.len(), 2);
	assert_eq!(out.get(closed).unwrap(), &[sel(0, 5), sel(7, 12)][..]);
	assert_eq!(out.get(open).unwrap(), &[sel(6, 6)][..]);
}

#[tokio::test]
async fn test_editor_selections_written_back() {
	let (_ws, registry, editor) = setup("abc", TrackerConfig::default());
	let editor = editor.with_selections(vec![sel(3, 1)]);

	let mut tx = RangeTransaction::new(&registry, &editor);
	tx.edits(vec![Edit::insert(pos(0, 0), "xx")]);
	let out = tx.run().await.unwrap();

	assert!(out.is_empty());
	assert_eq!(editor.selections(), vec![sel(5, 3)]);
}

#[tokio::test]
async fn test_preserved_editor_selections_untouched() {
	let config = TrackerConfig {
		preserve_editor_selections: true,
		..TrackerConfig::default()
	};
	let (_ws, registry, editor) = setup("abc", config);
	let editor = editor.with_selections(vec![sel(1, 2)]);

	let mut tx = RangeTransaction::new(&registry, &editor);
	tx.edits(vec![Edit::insert(pos(0, 0), "xx")]);
	tx.run().await.unwrap();
	assert_eq!(editor.selections(), vec![sel(1, 2)]);

	let mut tx = RangeTransaction::new(&registry, &editor);
	tx.preserve_editor_selections(false).edits(vec![Edit::insert(pos(0, 0), "y")]);
	tx.run().await.unwrap();
	assert_eq!(editor.selections(), vec![sel(2, 3)]);
}

#[tokio::test]
async fn test_default_behavior_from_config() {
	let config = TrackerConfig {
		default_behavior: RangeExpansionBehavior::ClosedOpen,
		..TrackerConfig::default()
	};
	let (_ws, registry, editor) = setup("abc", config);
	let mut tx = RangeTransaction::new(&registry, &editor);
	let group = tx.track_default(vec![sel(0, 1)]);
	tx.edits(vec![Edit::insert(pos(0, 1), "XY")]);

	let out = tx.run().await.unwrap();
	assert_eq!(out.get(group).unwrap(), &[sel(0, 3)][..]);
}

#[tokio::test]
async fn test_edits_and_operation_are_exclusive() {
	let (ws, registry, editor) = setup("abc", TrackerConfig::default());
	let mut tx = RangeTransaction::new(&registry, &editor);
	tx.track(vec![sel(0, 1)], RangeExpansionBehavior::ClosedClosed);
	tx.edits(vec![Edit::insert(pos(0, 0), "x")]);
	tx.operation(async { Ok::<(), BoxError>(()) });

	let err = tx.run().await.unwrap_err();
	assert!(matches!(err, TrackError::InvalidTransaction(_)));
	assert_eq!(ws.document(URI).unwrap().version(), 0);
}

#[tokio::test]
async fn test_empty_transaction_is_noop() {
	let (ws, registry, editor) = setup("abc", TrackerConfig::default());
	let editor = editor.with_selections(vec![sel(0, 0)]);
	let mut tx = RangeTransaction::new(&registry, &editor);
	let group = tx.add_group(RangeGroup::from(vec![TextRange::new(pos(0, 1), pos(0, 2))]));

	let out = tx.run().await.unwrap();
	assert_eq!(out.get(group).unwrap(), &[sel(1, 2)][..]);
	assert_eq!(registry.live_list_count(URI), 0);
	assert_eq!(ws.document(URI).unwrap().version(), 0);
}

#[tokio::test]
async fn test_operation_changes_are_tracked() {
	let (ws, registry, editor) = setup("hello", TrackerConfig::default());
	let mut tx = RangeTransaction::new(&registry, &editor);
	let group = tx.track(vec![sel(0, 5)], RangeExpansionBehavior::ClosedClosed);
	let host = ws.clone();
	tx.operation(async move {
		if host.apply(URI, &[Edit::insert(pos(0, 0), "> ")]) {
			Ok(())
		} else {
			Err(BoxError::from("apply failed"))
		}
	});

	let out = tx.run().await.unwrap();
	assert_eq!(out.get(group).unwrap(), &[sel(2, 7)][..]);
	assert_eq!(out.into_vec(), vec![vec![sel(2, 7)]]);
}

#[tokio::test]
async fn test_failed_operation_reports_source() {
	let (_ws, registry, editor) = setup("hello", TrackerConfig::default());
	let mut tx = RangeTransaction::new(&registry, &editor);
	tx.operation(async { Err::<(), _>(std::io::Error::other("boom")) });

	let err = tx.run().await.unwrap_err();
	match err {
		TrackError::Operation(source) => assert_eq!(source.to_string(), "boom"),
		other => panic!("expected operation error, got {other:?}"),
	}
	assert_eq!(registry.live_list_count(URI), 0);
}
