//! Per-document registry of live range lists and replace markers.
//!
//! A [`RangeRegistry`] subscribes once to the host's change events. Each event
//! is tagged against the document's replace markers, validated into an
//! [`EditBatch`], and applied to every live [`RangeList`] of the document in a
//! single rebasing pass.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tether_primitives::{ContentChange, EditBatch, MalformedBatch, ReplaceMarker, TrackedRange, rebase_in_place};

use crate::config::TrackerConfig;
use crate::host::{ChangeEventSource, ChangeListener, DocumentChangeEvent, Subscription};

#[cfg(test)]
mod tests;

/// A shared, appendable list of tracked ranges.
///
/// Clones share the same list. Ranges appended after registration are rebased
/// by later change events like any other.
#[derive(Debug, Clone, Default)]
pub struct RangeList {
	inner: Arc<Mutex<RangeListState>>,
}

#[derive(Debug, Default)]
struct RangeListState {
	ranges: Vec<TrackedRange>,
	error: Option<MalformedBatch>,
}

impl RangeList {
	/// Creates an empty list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a list holding `ranges`.
	pub fn from_ranges(ranges: Vec<TrackedRange>) -> Self {
		Self {
			inner: Arc::new(Mutex::new(RangeListState { ranges, error: None })),
		}
	}

	/// Appends a range.
	pub fn push(&self, range: TrackedRange) {
		self.inner.lock().ranges.push(range);
	}

	/// Appends several ranges.
	pub fn extend(&self, ranges: impl IntoIterator<Item = TrackedRange>) {
		self.inner.lock().ranges.extend(ranges);
	}

	/// Copies out the current ranges.
	pub fn snapshot(&self) -> Vec<TrackedRange> {
		self.inner.lock().ranges.clone()
	}

	/// Number of ranges.
	pub fn len(&self) -> usize {
		self.inner.lock().ranges.len()
	}

	/// True when the list holds no ranges.
	pub fn is_empty(&self) -> bool {
		self.inner.lock().ranges.is_empty()
	}

	/// First malformed batch observed while registered, if any.
	///
	/// Offsets are left untouched by a malformed batch, so a list with an
	/// error no longer reflects the document.
	pub fn error(&self) -> Option<MalformedBatch> {
		self.inner.lock().error.clone()
	}

	fn record_error(&self, error: &MalformedBatch) {
		let mut state = self.inner.lock();
		if state.error.is_none() {
			state.error = Some(error.clone());
		}
	}

	fn same_list(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

/// A shared, appendable list of replace markers.
#[derive(Debug, Clone, Default)]
pub struct ReplaceMarkerList {
	inner: Arc<Mutex<Vec<ReplaceMarker>>>,
}

impl ReplaceMarkerList {
	/// Creates an empty list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a marker.
	pub fn push(&self, marker: ReplaceMarker) {
		self.inner.lock().push(marker);
	}

	/// Copies out the current markers.
	pub fn snapshot(&self) -> Vec<ReplaceMarker> {
		self.inner.lock().clone()
	}

	/// Number of markers.
	pub fn len(&self) -> usize {
		self.inner.lock().len()
	}

	/// True when the list holds no markers.
	pub fn is_empty(&self) -> bool {
		self.inner.lock().is_empty()
	}
}

type RegistrationId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegistrationKind {
	RangeList,
	ReplaceMarkers,
}

#[derive(Debug, Default)]
struct DocumentEntry {
	lists: Vec<(RegistrationId, RangeList)>,
	markers: Vec<(RegistrationId, ReplaceMarkerList)>,
}

impl DocumentEntry {
	fn is_empty(&self) -> bool {
		self.lists.is_empty() && self.markers.is_empty()
	}
}

/// Scoped registration of a range list or marker list.
///
/// Dropping the guard, or calling [`Registration::deregister`], removes exactly
/// this registration. The list handle itself keeps its final offsets.
#[must_use = "dropping a Registration deregisters it immediately"]
#[derive(Debug)]
pub struct Registration {
	registry: Weak<RangeRegistry>,
	uri: String,
	id: RegistrationId,
	kind: RegistrationKind,
	active: bool,
}

impl Registration {
	/// Removes the registration. Calling this more than once is harmless.
	pub fn deregister(&mut self) {
		if !std::mem::take(&mut self.active) {
			return;
		}
		if let Some(registry) = self.registry.upgrade() {
			registry.remove(&self.uri, self.id, self.kind);
		}
	}

	/// Returns true until the registration is removed.
	pub fn is_active(&self) -> bool {
		self.active
	}
}

impl Drop for Registration {
	fn drop(&mut self) {
		self.deregister();
	}
}

/// Owns every live range list and replace marker list, keyed by document.
pub struct RangeRegistry {
	config: TrackerConfig,
	documents: Mutex<FxHashMap<String, DocumentEntry>>,
	next_id: AtomicU64,
	subscription: Mutex<Option<Subscription>>,
}

impl RangeRegistry {
	/// Creates a registry subscribed to `source` with default configuration.
	pub fn new(source: &dyn ChangeEventSource) -> Arc<Self> {
		Self::with_config(source, TrackerConfig::default())
	}

	/// Creates a registry subscribed to `source`.
	pub fn with_config(source: &dyn ChangeEventSource, config: TrackerConfig) -> Arc<Self> {
		Arc::new_cyclic(|weak: &Weak<Self>| {
			let listener = Arc::new(RegistryListener { registry: weak.clone() });
			Self {
				config,
				documents: Mutex::new(FxHashMap::default()),
				next_id: AtomicU64::new(1),
				subscription: Mutex::new(Some(source.subscribe(listener))),
			}
		})
	}

	/// Configuration this registry was created with.
	pub fn config(&self) -> &TrackerConfig {
		&self.config
	}

	/// Releases the change-event subscription. Later events are not observed.
	pub fn dispose(&self) {
		let subscription = self.subscription.lock().take();
		drop(subscription);
	}

	/// Returns true while the registry is subscribed to its event source.
	pub fn is_subscribed(&self) -> bool {
		self.subscription.lock().is_some()
	}

	/// Registers `list` for rebasing against changes to `uri`.
	pub fn register_range_list(self: &Arc<Self>, uri: impl Into<String>, list: &RangeList) -> Registration {
		let uri = uri.into();
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		self.documents.lock().entry(uri.clone()).or_default().lists.push((id, list.clone()));
		tracing::trace!(uri = %uri, id, ranges = list.len(), kind = "range_list", "range_registry.register");
		self.registration(uri, id, RegistrationKind::RangeList)
	}

	/// Registers `markers` for tagging changes to `uri`.
	pub fn register_replace_markers(self: &Arc<Self>, uri: impl Into<String>, markers: &ReplaceMarkerList) -> Registration {
		let uri = uri.into();
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		self.documents.lock().entry(uri.clone()).or_default().markers.push((id, markers.clone()));
		tracing::trace!(uri = %uri, id, markers = markers.len(), kind = "replace_markers", "range_registry.register");
		self.registration(uri, id, RegistrationKind::ReplaceMarkers)
	}

	/// Number of range lists registered for `uri`.
	pub fn live_list_count(&self, uri: &str) -> usize {
		self.documents.lock().get(uri).map_or(0, |entry| entry.lists.len())
	}

	/// Number of replace marker lists registered for `uri`.
	pub fn live_marker_count(&self, uri: &str) -> usize {
		self.documents.lock().get(uri).map_or(0, |entry| entry.markers.len())
	}

	/// Number of documents with at least one registration.
	pub fn document_count(&self) -> usize {
		self.documents.lock().len()
	}

	/// Rebases every live list of the event's document.
	///
	/// Called by the registry's own subscription; exposed for hosts that
	/// deliver events without a [`ChangeEventSource`].
	pub fn handle_change(&self, event: &DocumentChangeEvent) {
		let (lists, markers) = {
			let documents = self.documents.lock();
			let Some(entry) = documents.get(&event.uri) else {
				return;
			};
			if entry.lists.is_empty() {
				return;
			}
			let mut lists: Vec<RangeList> = Vec::with_capacity(entry.lists.len());
			for (_, list) in &entry.lists {
				if !lists.iter().any(|seen| seen.same_list(list)) {
					lists.push(list.clone());
				}
			}
			let markers: Vec<ReplaceMarkerList> = entry.markers.iter().map(|(_, m)| m.clone()).collect();
			(lists, markers)
		};

		let markers: Vec<ReplaceMarker> = markers.iter().flat_map(ReplaceMarkerList::snapshot).collect();
		let changes: Vec<ContentChange> = event
			.changes
			.iter()
			.cloned()
			.map(|mut change| {
				if markers.iter().any(|marker| marker.matches(&change)) {
					change.mark_replace();
				}
				change
			})
			.collect();

		let batch = match EditBatch::new(changes) {
			Ok(batch) => batch,
			Err(error) => {
				tracing::error!(uri = %event.uri, version = event.version, lists = lists.len(), error = %error, "range_registry.malformed_batch");
				for list in &lists {
					list.record_error(&error);
				}
				return;
			}
		};

		let mut guards: Vec<_> = lists.iter().map(|list| list.inner.lock()).collect();
		let rebased = rebase_in_place(&batch, guards.iter_mut().flat_map(|state| state.ranges.iter_mut()));
		drop(guards);

		if self.config.log_changes {
			tracing::debug!(
				uri = %event.uri,
				version = event.version,
				changes = ?batch.changes(),
				lists = lists.len(),
				ranges = rebased,
				"range_registry.change"
			);
		} else {
			tracing::debug!(
				uri = %event.uri,
				version = event.version,
				changes = batch.len(),
				lists = lists.len(),
				ranges = rebased,
				"range_registry.change"
			);
		}
	}

	fn registration(self: &Arc<Self>, uri: String, id: RegistrationId, kind: RegistrationKind) -> Registration {
		Registration {
			registry: Arc::downgrade(self),
			uri,
			id,
			kind,
			active: true,
		}
	}

	fn remove(&self, uri: &str, id: RegistrationId, kind: RegistrationKind) {
		let mut documents = self.documents.lock();
		let Some(entry) = documents.get_mut(uri) else {
			return;
		};
		match kind {
			RegistrationKind::RangeList => entry.lists.retain(|(entry_id, _)| *entry_id != id),
			RegistrationKind::ReplaceMarkers => entry.markers.retain(|(entry_id, _)| *entry_id != id),
		}
		if entry.is_empty() {
			documents.remove(uri);
		}
		tracing::trace!(uri, id, kind = ?kind, "range_registry.deregister");
	}
}

impl std::fmt::Debug for RangeRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RangeRegistry")
			.field("config", &self.config)
			.field("documents", &self.document_count())
			.field("subscribed", &self.is_subscribed())
			.finish()
	}
}

/// Forwards events to a registry without keeping it alive.
struct RegistryListener {
	registry: Weak<RangeRegistry>,
}

impl ChangeListener for RegistryListener {
	fn on_did_change(&self, event: &DocumentChangeEvent) {
		if let Some(registry) = self.registry.upgrade() {
			registry.handle_change(event);
		}
	}
}
