use pretty_assertions::assert_eq;
use tether_primitives::{Edit, Position, RangeExpansionBehavior};

use super::*;
use crate::memory::MemoryWorkspace;

const URI: &str = "memory:///registry.txt";

fn offsets(list: &RangeList) -> Vec<(usize, usize)> {
	list.snapshot().iter().map(|r| (r.start, r.end)).collect()
}

fn insert(ws: &MemoryWorkspace, character: u32, text: &str) {
	assert!(ws.apply(URI, &[Edit::insert(Position::new(0, character), text)]));
}

#[test]
fn test_registration_guard_deregisters_on_drop() {
	let ws = MemoryWorkspace::new();
	let registry = RangeRegistry::new(&ws);
	let list = RangeList::new();

	let first = registry.register_range_list(URI, &list);
	let mut second = registry.register_range_list(URI, &list);
	assert_eq!(registry.live_list_count(URI), 2);

	second.deregister();
	second.deregister();
	assert!(!second.is_active());
	assert_eq!(registry.live_list_count(URI), 1);

	drop(first);
	assert_eq!(registry.live_list_count(URI), 0);
	assert_eq!(registry.document_count(), 0);
}

#[test]
fn test_one_event_rebases_every_list() {
	let ws = MemoryWorkspace::new();
	ws.open(URI, "hello world");
	let registry = RangeRegistry::new(&ws);

	let words = RangeList::from_ranges(vec![TrackedRange::closed(0, 5), TrackedRange::closed(6, 11)]);
	let cursor = RangeList::from_ranges(vec![TrackedRange::point(11, RangeExpansionBehavior::OpenOpen)]);
	let _words = registry.register_range_list(URI, &words);
	let _cursor = registry.register_range_list(URI, &cursor);

	insert(&ws, 0, ">> ");

	assert_eq!(offsets(&words), vec![(3, 8), (9, 14)]);
	assert_eq!(offsets(&cursor), vec![(14, 14)]);
}

#[test]
fn test_same_list_registered_twice_is_rebased_once() {
	let ws = MemoryWorkspace::new();
	ws.open(URI, "abc");
	let registry = RangeRegistry::new(&ws);
	let list = RangeList::from_ranges(vec![TrackedRange::closed(1, 2)]);
	let _a = registry.register_range_list(URI, &list);
	let _b = registry.register_range_list(URI, &list);

	insert(&ws, 0, "x");
	assert_eq!(offsets(&list), vec![(2, 3)]);
}

#[test]
fn test_ranges_appended_after_registration_are_rebased() {
	let ws = MemoryWorkspace::new();
	ws.open(URI, "abc");
	let registry = RangeRegistry::new(&ws);
	let list = RangeList::new();
	let _registration = registry.register_range_list(URI, &list);

	list.push(TrackedRange::closed(2, 3));
	insert(&ws, 0, "zz");
	assert_eq!(offsets(&list), vec![(4, 5)]);
}

#[test]
fn test_other_documents_are_ignored() {
	let ws = MemoryWorkspace::new();
	ws.open(URI, "abc");
	ws.open("memory:///other.txt", "abc");
	let registry = RangeRegistry::new(&ws);
	let list = RangeList::from_ranges(vec![TrackedRange::closed(1, 2)]);
	let _registration = registry.register_range_list(URI, &list);

	assert!(ws.apply("memory:///other.txt", &[Edit::insert(Position::new(0, 0), "x")]));
	assert_eq!(offsets(&list), vec![(1, 2)]);
}

#[test]
fn test_replace_marker_pins_empty_point() {
	let ws = MemoryWorkspace::new();
	ws.open(URI, "abc");
	let registry = RangeRegistry::new(&ws);

	let plain = RangeList::from_ranges(vec![TrackedRange::point(1, RangeExpansionBehavior::OpenOpen)]);
	let _plain = registry.register_range_list(URI, &plain);
	insert(&ws, 1, "XY");
	assert_eq!(offsets(&plain), vec![(3, 3)]);

	let pinned = RangeList::from_ranges(vec![TrackedRange::point(1, RangeExpansionBehavior::OpenOpen)]);
	let markers = ReplaceMarkerList::new();
	markers.push(ReplaceMarker::new(1, 1, "XY"));
	let _pinned = registry.register_range_list(URI, &pinned);
	let _markers = registry.register_replace_markers(URI, &markers);
	assert_eq!(registry.live_marker_count(URI), 1);

	insert(&ws, 1, "XY");
	assert_eq!(offsets(&pinned), vec![(1, 1)]);
}

#[test]
fn test_malformed_batch_leaves_offsets_and_records_error() {
	let ws = MemoryWorkspace::new();
	ws.open(URI, "hello world");
	let registry = RangeRegistry::new(&ws);
	let list = RangeList::from_ranges(vec![TrackedRange::closed(6, 11)]);
	let _registration = registry.register_range_list(URI, &list);

	ws.apply_raw(URI, vec![ContentChange::deletion(0, 5), ContentChange::deletion(3, 8)]);
	ws.apply_raw(URI, vec![ContentChange::new(4, 2, "")]);

	assert_eq!(offsets(&list), vec![(6, 11)]);
	assert!(matches!(list.error(), Some(MalformedBatch::Overlapping { first: 0, second: 1, .. })));
}

#[test]
fn test_list_keeps_offsets_after_deregistration() {
	let ws = MemoryWorkspace::new();
	ws.open(URI, "abc");
	let registry = RangeRegistry::new(&ws);
	let list = RangeList::from_ranges(vec![TrackedRange::closed(0, 3)]);
	let registration = registry.register_range_list(URI, &list);

	insert(&ws, 0, "__");
	drop(registration);
	insert(&ws, 0, "__");

	assert_eq!(offsets(&list), vec![(2, 5)]);
}

/// Drops a held registration when the next change event arrives.
struct DeregisterOnChange(Mutex<Option<Registration>>);

impl ChangeListener for DeregisterOnChange {
	fn on_did_change(&self, _event: &DocumentChangeEvent) {
		drop(self.0.lock().take());
	}
}

#[test]
fn test_registration_dropped_during_event_still_rebased() {
	let ws = MemoryWorkspace::new();
	ws.open(URI, "abc");
	let registry = RangeRegistry::new(&ws);
	let list = RangeList::from_ranges(vec![TrackedRange::closed(1, 2)]);
	let registration = registry.register_range_list(URI, &list);
	let _subscription = ws.subscribe(Arc::new(DeregisterOnChange(Mutex::new(Some(registration)))));

	insert(&ws, 0, "x");

	assert_eq!(offsets(&list), vec![(2, 3)]);
	assert_eq!(registry.live_list_count(URI), 0);
}

#[test]
fn test_dispose_releases_subscription() {
	let ws = MemoryWorkspace::new();
	ws.open(URI, "abc");
	let registry = RangeRegistry::new(&ws);
	assert_eq!(ws.listener_count(), 1);

	let list = RangeList::from_ranges(vec![TrackedRange::closed(1, 2)]);
	let _registration = registry.register_range_list(URI, &list);
	registry.dispose();
	assert!(!registry.is_subscribed());
	assert_eq!(ws.listener_count(), 0);

	insert(&ws, 0, "x");
	assert_eq!(offsets(&list), vec![(1, 2)]);
}

#[test]
fn test_dropping_registry_unsubscribes() {
	let ws = MemoryWorkspace::new();
	let registry = RangeRegistry::new(&ws);
	assert_eq!(ws.listener_count(), 1);
	drop(registry);
	assert_eq!(ws.listener_count(), 0);
}

#[test]
fn test_registration_outliving_registry_is_inert() {
	let ws = MemoryWorkspace::new();
	let registry = RangeRegistry::new(&ws);
	let mut registration = registry.register_range_list(URI, &RangeList::new());
	drop(registry);
	registration.deregister();
	assert!(!registration.is_active());
}

#[test]
fn test_handle_change_without_event_source() {
	let ws = MemoryWorkspace::new();
	let registry = RangeRegistry::new(&ws);
	registry.dispose();
	let list = RangeList::from_ranges(vec![TrackedRange::closed(4, 6)]);
	let _registration = registry.register_range_list(URI, &list);

	registry.handle_change(&DocumentChangeEvent {
		uri: URI.to_owned(),
		version: 7,
		changes: vec![ContentChange::new(0, 2, "abcd")],
	});
	assert_eq!(offsets(&list), vec![(6, 8)]);
}
