//! Host-coordinate edit records.

use crate::range::{Position, TextRange};

/// How the rebasing pass should treat the change an [`Edit`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EditMode {
	/// Default insertion semantics.
	#[default]
	Standard,
	/// Registered as a replace marker before applying: an empty tracked point
	/// at an insertion produced by this edit stays before the new text.
	Replace,
}

/// One substitution requested by a caller, in host coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edit {
	/// Range to replace.
	pub range: TextRange,
	/// Replacement text.
	pub text: String,
	/// Rebasing treatment of the resulting change.
	pub mode: EditMode,
}

impl Edit {
	/// Creates a standard edit replacing `range` with `text`.
	pub fn replace(range: TextRange, text: impl Into<String>) -> Self {
		Self {
			range,
			text: text.into(),
			mode: EditMode::Standard,
		}
	}

	/// Creates a replace-mode edit.
	pub fn tagged_replace(range: TextRange, text: impl Into<String>) -> Self {
		Self {
			mode: EditMode::Replace,
			..Self::replace(range, text)
		}
	}

	/// Creates an insertion at `at`.
	pub fn insert(at: Position, text: impl Into<String>) -> Self {
		Self::replace(TextRange::point(at), text)
	}

	/// Creates a deletion of `range`.
	pub fn delete(range: TextRange) -> Self {
		Self::replace(range, String::new())
	}

	/// True when the edit should be registered as a replace marker.
	#[inline]
	pub fn is_replace(&self) -> bool {
		self.mode == EditMode::Replace
	}
}
