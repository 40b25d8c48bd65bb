use std::ops::Range;

use thiserror::Error;

use crate::range::{CharIdx, CharLen};


/// One atomic substitution of `[start, old_end)` with `new_text`.
///
/// Offsets are in the document as it was *before* the batch containing this
/// change was applied. The inserted character count is cached on
/// construction; fields are private to keep it in sync with the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChange {
	start: CharIdx,
	old_end: CharIdx,
	new_text: String,
	inserted_len: CharLen,
	is_replace: bool,
}

impl ContentChange {
	/// Creates a change replacing `[start, old_end)` with `new_text`.
	pub fn new(start: CharIdx, old_end: CharIdx, new_text: impl Into<String>) -> Self {
		let new_text = new_text.into();
		let inserted_len = new_text.chars().count();
		Self {
			start,
			old_end,
			new_text,
			inserted_len,
			is_replace: false,
		}
	}

	/// Creates a pure insertion at `at`.
	pub fn insertion(at: CharIdx, text: impl Into<String>) -> Self {
		Self::new(at, at, text)
	}

	/// Creates a pure deletion of `[start, end)`.
	pub fn deletion(start: CharIdx, end: CharIdx) -> Self {
		Self::new(start, end, String::new())
	}

	/// Returns this change tagged as a replace edit.
	pub fn tagged_replace(mut self) -> Self {
		self.is_replace = true;
		self
	}

	/// Tags this change as a replace edit in place.
	pub fn mark_replace(&mut self) {
		self.is_replace = true;
	}

	/// Start of the replaced interval (pre-edit offset).
	#[inline]
	pub fn start(&self) -> CharIdx {
		self.start
	}

	/// End of the replaced interval (pre-edit offset, exclusive).
	#[inline]
	pub fn old_end(&self) -> CharIdx {
		self.old_end
	}

	/// Replaced interval in pre-edit offsets.
	pub fn old_range(&self) -> Range<CharIdx> {
		self.start..self.old_end
	}

	/// Text that replaces the interval.
	#[inline]
	pub fn new_text(&self) -> &str {
		&self.new_text
	}

	/// Whether a replace marker matched this change.
	#[inline]
	pub fn is_replace(&self) -> bool {
		self.is_replace
	}

	/// Number of characters inserted.
	#[inline]
	pub fn inserted_len(&self) -> CharLen {
		self.inserted_len
	}

	/// Number of characters removed.
	#[inline]
	pub fn removed_len(&self) -> CharLen {
		self.old_end.saturating_sub(self.start)
	}

	/// Offset just past the replacement text in the post-edit document,
	/// ignoring every other change in the batch.
	#[inline]
	pub fn new_end(&self) -> CharIdx {
		self.start + self.inserted_len
	}

	/// True when nothing is removed.
	#[inline]
	pub fn is_insertion(&self) -> bool {
		self.start == self.old_end
	}

	/// Signed length change caused by this substitution.
	pub fn displacement(&self) -> isize {
		self.inserted_len as isize - self.removed_len() as isize
	}

	/// Returns true if the two replaced intervals share at least one character,
	/// or one is an insertion strictly inside the other.
	pub fn overlaps(&self, other: &ContentChange) -> bool {
		self.start < other.old_end && other.start < self.old_end
	}
}

/// A change batch violating the non-overlap invariant.
///
/// This is a host bug rather than a caller error; rebasing against such a
/// batch would produce silently wrong offsets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedBatch {
	/// A change ends before it starts.
	#[error("change {index} is inverted: start {start} > old end {old_end}")]
	Inverted {
		/// Position of the change in the batch.
		index: usize,
		/// Reported start offset.
		start: CharIdx,
		/// Reported old end offset.
		old_end: CharIdx,
	},
	/// Two changes touch the same characters.
	#[error("changes {first} {first_range:?} and {second} {second_range:?} overlap")]
	Overlapping {
		/// Position of the earlier change in the batch.
		first: usize,
		/// Interval of the earlier change.
		first_range: Range<CharIdx>,
		/// Position of the later change in the batch.
		second: usize,
		/// Interval of the later change.
		second_range: Range<CharIdx>,
	},
}

/// The changes of one document-version transition.
///
/// Construction validates that the `[start, old_end)` intervals are pairwise
/// non-overlapping, so every `EditBatch` in existence describes simultaneous,
/// independent substitutions of one prior document state. The original order
/// is preserved; nothing downstream depends on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBatch {
	changes: Vec<ContentChange>,
}

impl EditBatch {
	/// Validates and wraps a list of changes.
	///
	/// # Errors
	///
	/// Returns [`MalformedBatch`] if any change is inverted or two changes overlap.
	pub fn new(changes: Vec<ContentChange>) -> Result<Self, MalformedBatch> {
		validate(&changes)?;
		Ok(Self { changes })
	}

	/// An empty batch.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Returns the validated changes.
	pub fn changes(&self) -> &[ContentChange] {
		&self.changes
	}

	/// Number of changes.
	pub fn len(&self) -> usize {
		self.changes.len()
	}

	/// True when the batch has no changes.
	pub fn is_empty(&self) -> bool {
		self.changes.is_empty()
	}

	/// Net length change of the document.
	pub fn displacement(&self) -> isize {
		self.changes.iter().map(ContentChange::displacement).sum()
	}
}

/// Sweeps the changes in `(start, old_end)` order, comparing each against the
/// earlier change reaching furthest right.
fn validate(changes: &[ContentChange]) -> Result<(), MalformedBatch> {
	if let Some((index, c)) = changes.iter().enumerate().find(|(_, c)| c.start > c.old_end) {
		return Err(MalformedBatch::Inverted {
			index,
			start: c.start,
			old_end: c.old_end,
		});
	}

	let mut order: Vec<usize> = (0..changes.len()).collect();
	order.sort_by_key(|&i| (changes[i].start, changes[i].old_end));

	let mut frontier: Option<usize> = None;
	for &i in &order {
		let current = &changes[i];
		if let Some(f) = frontier {
			let reach = &changes[f];
			if reach.overlaps(current) {
				let (first, second) = if f < i { (f, i) } else { (i, f) };
				return Err(MalformedBatch::Overlapping {
					first,
					first_range: changes[first].old_range(),
					second,
					second_range: changes[second].old_range(),
				});
			}
			if current.old_end > reach.old_end {
				frontier = Some(i);
			}
		} else {
			frontier = Some(i);
		}
	}

	Ok(())
}

/// Tags a later [`ContentChange`] as a replace edit.
///
/// Registered ahead of an edit; a change whose interval and text both equal
/// the marker's is flagged `is_replace`. Two identical edits at the same
/// location cannot be told apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReplaceMarker {
	/// Start of the expected interval.
	pub start: CharIdx,
	/// End of the expected interval.
	pub old_end: CharIdx,
	/// Expected replacement text.
	pub new_text: String,
}

impl ReplaceMarker {
	/// Creates a marker for `[start, old_end) -> new_text`.
	pub fn new(start: CharIdx, old_end: CharIdx, new_text: impl Into<String>) -> Self {
		Self {
			start,
			old_end,
			new_text: new_text.into(),
		}
	}

	/// Returns true if `change` is the edit this marker describes.
	pub fn matches(&self, change: &ContentChange) -> bool {
		self.start == change.start && self.old_end == change.old_end && self.new_text == change.new_text
	}
}
