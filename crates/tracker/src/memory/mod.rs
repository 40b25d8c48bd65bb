//! In-memory reference host.
//!
//! [`MemoryWorkspace`] owns rope-backed documents and publishes a
//! [`DocumentChangeEvent`] for every applied batch, synchronously and before
//! the applying call returns. Changes in an event are listed in reverse
//! document order, the way most editors report them.

use std::cmp::Reverse;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::Mutex;
use ropey::Rope;
use rustc_hash::FxHashMap;
use tether_primitives::{CharIdx, CharLen, ContentChange, Edit, EditBatch, Position, Selection, TextRange};

use crate::host::{ChangeEventSource, ChangeListener, DocumentChangeEvent, EditableEditor, Subscription, TextDocument};


#[derive(Debug)]
struct DocumentState {
	text: Rope,
	version: u64,
	reject_next_apply: bool,
}

#[derive(Default)]
struct WorkspaceInner {
	documents: Mutex<FxHashMap<String, DocumentState>>,
	listeners: Mutex<Vec<(u64, Arc<dyn ChangeListener>)>>,
	next_listener: AtomicU64,
}

impl WorkspaceInner {
	fn read<T>(&self, uri: &str, f: impl FnOnce(&DocumentState) -> T) -> Option<T> {
		self.documents.lock().get(uri).map(f)
	}

	fn emit(&self, event: &DocumentChangeEvent) {
		let listeners: Vec<Arc<dyn ChangeListener>> = self.listeners.lock().iter().map(|(_, l)| Arc::clone(l)).collect();
		for listener in listeners {
			listener.on_did_change(event);
		}
	}
}

/// A set of open in-memory documents sharing one change-event stream.
///
/// Clones share the same workspace.
#[derive(Clone, Default)]
pub struct MemoryWorkspace {
	inner: Arc<WorkspaceInner>,
}

impl MemoryWorkspace {
	/// Creates an empty workspace.
	pub fn new() -> Self {
		Self::default()
	}

	/// Opens (or reopens) `uri` with `text` at version 0.
	pub fn open(&self, uri: impl Into<String>, text: &str) -> MemoryDocument {
		let uri = uri.into();
		self.inner.documents.lock().insert(
			uri.clone(),
			DocumentState {
				text: Rope::from_str(text),
				version: 0,
				reject_next_apply: false,
			},
		);
		MemoryDocument {
			uri,
			workspace: Arc::clone(&self.inner),
		}
	}

	/// Returns a handle to an open document.
	pub fn document(&self, uri: &str) -> Option<MemoryDocument> {
		self.inner.documents.lock().contains_key(uri).then(|| MemoryDocument {
			uri: uri.to_owned(),
			workspace: Arc::clone(&self.inner),
		})
	}

	/// Makes the next edit application on `uri` fail.
	pub fn reject_next_apply(&self, uri: &str) {
		if let Some(state) = self.inner.documents.lock().get_mut(uri) {
			state.reject_next_apply = true;
		}
	}

	/// Number of subscribed listeners.
	pub fn listener_count(&self) -> usize {
		self.inner.listeners.lock().len()
	}

	/// Applies `edits` to `uri` as one batch.
	///
	/// Returns `false`, leaving the document untouched, if the document is not
	/// open, a rejection was armed, a position lies outside the document, or
	/// two edits overlap.
	pub fn apply(&self, uri: &str, edits: &[Edit]) -> bool {
		let event = {
			let mut documents = self.inner.documents.lock();
			let Some(state) = documents.get_mut(uri) else {
				return false;
			};
			if std::mem::take(&mut state.reject_next_apply) {
				tracing::trace!(uri, version = state.version, "memory.apply.rejected");
				return false;
			}

			let mut changes = Vec::with_capacity(edits.len());
			for edit in edits {
				let (Some(start), Some(end)) = (checked_offset(&state.text, edit.range.start), checked_offset(&state.text, edit.range.end)) else {
					tracing::trace!(uri, range = ?edit.range, "memory.apply.out_of_bounds");
					return false;
				};
				changes.push(ContentChange::new(start, end, edit.text.as_str()));
			}
			if let Err(error) = EditBatch::new(changes.clone()) {
				tracing::trace!(uri, error = %error, "memory.apply.overlapping");
				return false;
			}

			let changes = reverse_document_order(changes);
			for change in &changes {
				state.text.remove(change.old_range());
				state.text.insert(change.start(), change.new_text());
			}
			state.version += 1;
			tracing::trace!(uri, version = state.version, changes = changes.len(), "memory.apply");
			DocumentChangeEvent {
				uri: uri.to_owned(),
				version: state.version,
				changes,
			}
		};

		self.inner.emit(&event);
		true
	}

	/// Publishes `changes` for `uri` verbatim, bypassing validation.
	///
	/// The text is updated only when the changes form a valid, in-bounds
	/// batch; the version is bumped and the event emitted either way. This
	/// stands in for a misbehaving host.
	pub fn apply_raw(&self, uri: &str, changes: Vec<ContentChange>) {
		let event = {
			let mut documents = self.inner.documents.lock();
			let Some(state) = documents.get_mut(uri) else {
				return;
			};
			let len = state.text.len_chars();
			let in_bounds = changes.iter().all(|c| c.old_end() <= len);
			if in_bounds && EditBatch::new(changes.clone()).is_ok() {
				for change in &reverse_document_order(changes.clone()) {
					state.text.remove(change.old_range());
					state.text.insert(change.start(), change.new_text());
				}
			}
			state.version += 1;
			tracing::trace!(uri, version = state.version, changes = changes.len(), "memory.apply_raw");
			DocumentChangeEvent {
				uri: uri.to_owned(),
				version: state.version,
				changes,
			}
		};

		self.inner.emit(&event);
	}
}

impl ChangeEventSource for MemoryWorkspace {
	fn subscribe(&self, listener: Arc<dyn ChangeListener>) -> Subscription {
		let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
		self.inner.listeners.lock().push((id, listener));
		let workspace: Weak<WorkspaceInner> = Arc::downgrade(&self.inner);
		Subscription::new(move || {
			if let Some(workspace) = workspace.upgrade() {
				workspace.listeners.lock().retain(|(listener_id, _)| *listener_id != id);
			}
		})
	}
}

impl std::fmt::Debug for MemoryWorkspace {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MemoryWorkspace")
			.field("documents", &self.inner.documents.lock().len())
			.field("listeners", &self.listener_count())
			.finish()
	}
}

/// Live handle to one document of a [`MemoryWorkspace`].
#[derive(Clone)]
pub struct MemoryDocument {
	uri: String,
	workspace: Arc<WorkspaceInner>,
}

impl std::fmt::Debug for MemoryDocument {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MemoryDocument").field("uri", &self.uri).field("version", &self.version()).finish()
	}
}

impl TextDocument for MemoryDocument {
	fn uri(&self) -> &str {
		&self.uri
	}

	fn version(&self) -> u64 {
		self.workspace.read(&self.uri, |s| s.version).unwrap_or_default()
	}

	fn text(&self) -> String {
		self.workspace.read(&self.uri, |s| s.text.to_string()).unwrap_or_default()
	}

	fn len_chars(&self) -> CharLen {
		self.workspace.read(&self.uri, |s| s.text.len_chars()).unwrap_or_default()
	}

	fn text_in(&self, range: TextRange) -> String {
		self.workspace
			.read(&self.uri, |s| {
				let start = clamped_offset(&s.text, range.start);
				let end = clamped_offset(&s.text, range.end);
				s.text.slice(start..end.max(start)).to_string()
			})
			.unwrap_or_default()
	}

	fn offset_at(&self, pos: Position) -> CharIdx {
		self.workspace.read(&self.uri, |s| clamped_offset(&s.text, pos)).unwrap_or_default()
	}

	fn position_at(&self, offset: CharIdx) -> Position {
		self.workspace.read(&self.uri, |s| position_of(&s.text, offset)).unwrap_or_default()
	}
}

/// An [`EditableEditor`] over a [`MemoryDocument`] with its own selections.
#[derive(Debug)]
pub struct MemoryEditor {
	workspace: MemoryWorkspace,
	document: MemoryDocument,
	selections: Mutex<Vec<Selection>>,
}

impl MemoryEditor {
	/// Creates an editor on an open document with no selections.
	pub fn new(workspace: &MemoryWorkspace, document: MemoryDocument) -> Self {
		Self {
			workspace: workspace.clone(),
			document,
			selections: Mutex::new(Vec::new()),
		}
	}

	/// Replaces the selections without going through the async interface.
	pub fn with_selections(self, selections: Vec<Selection>) -> Self {
		*self.selections.lock() = selections;
		self
	}
}

#[async_trait]
impl EditableEditor for MemoryEditor {
	fn document(&self) -> Arc<dyn TextDocument> {
		Arc::new(self.document.clone())
	}

	fn selections(&self) -> Vec<Selection> {
		self.selections.lock().clone()
	}

	async fn set_selections(&self, selections: Vec<Selection>) {
		*self.selections.lock() = selections;
	}

	async fn apply_edits(&self, edits: &[Edit]) -> bool {
		self.workspace.apply(&self.document.uri, edits)
	}
}

/// Sorts changes so applying them one by one never shifts a later one.
///
/// At a shared start the wider change goes first, and equal changes keep
/// their relative order reversed, so repeated insertions at one point end up
/// in batch order.
fn reverse_document_order(changes: Vec<ContentChange>) -> Vec<ContentChange> {
	let mut indexed: Vec<(usize, ContentChange)> = changes.into_iter().enumerate().collect();
	indexed.sort_by_key(|(i, change)| Reverse((change.start(), change.old_end(), *i)));
	indexed.into_iter().map(|(_, change)| change).collect()
}

/// Length of `line` without its terminator.
fn line_len(text: &Rope, line: usize) -> CharLen {
	let slice = text.line(line);
	let mut len = slice.len_chars();
	if len == 0 {
		return 0;
	}
	let last = slice.char(len - 1);
	if matches!(last, '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}') {
		len -= 1;
		if last == '\n' && len > 0 && slice.char(len - 1) == '\r' {
			len -= 1;
		}
	}
	len
}

fn checked_offset(text: &Rope, pos: Position) -> Option<CharIdx> {
	let line = pos.line as usize;
	if line >= text.len_lines() {
		return None;
	}
	let character = pos.character as usize;
	(character <= line_len(text, line)).then(|| text.line_to_char(line) + character)
}

fn clamped_offset(text: &Rope, pos: Position) -> CharIdx {
	let line = pos.line as usize;
	if line >= text.len_lines() {
		return text.len_chars();
	}
	text.line_to_char(line) + (pos.character as usize).min(line_len(text, line))
}

fn position_of(text: &Rope, offset: CharIdx) -> Position {
	let offset = offset.min(text.len_chars());
	let line = text.char_to_line(offset);
	let character = offset - text.line_to_char(line);
	Position::new(line as u32, character as u32)
}
