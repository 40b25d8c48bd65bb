/// Selection direction (anchor to active end).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
	/// Active end is at or after the anchor.
	Forward,
	/// Active end is before the anchor.
	Backward,
}

/// A position in the text, measured in characters (not bytes).
///
/// This is the canonical offset space for tracked ranges.
pub type CharIdx = usize;

/// A length or count in the text, measured in characters (not bytes).
///
/// This is distinct from CharIdx to avoid accidentally passing an index
/// where a length is expected or vice versa.
pub type CharLen = usize;

/// Host-facing position in line/character coordinates.
///
/// Both fields are zero-based; `character` counts characters within the line.
/// Ordering is document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
	/// Zero-based line index.
	pub line: u32,
	/// Zero-based character offset in the line.
	pub character: u32,
}

impl Position {
	/// Creates a new position.
	pub const fn new(line: u32, character: u32) -> Self {
		Self { line, character }
	}
}

/// Undirected host range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
	/// Start position (inclusive).
	pub start: Position,
	/// End position (exclusive).
	pub end: Position,
}

impl TextRange {
	/// Creates a range from two positions, ordering them if needed.
	pub fn new(a: Position, b: Position) -> Self {
		if b < a { Self { start: b, end: a } } else { Self { start: a, end: b } }
	}

	/// Creates a zero-length range at a position.
	pub const fn point(pos: Position) -> Self {
		Self { start: pos, end: pos }
	}

	/// Returns true if start equals end.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}

	/// Returns true if `pos` lies within the range, both ends inclusive.
	pub fn contains(&self, pos: Position) -> bool {
		self.start <= pos && pos <= self.end
	}
}

/// A directed host range: the anchor is the fixed end, the active end moves.
///
/// For a forward selection `active >= anchor`. For a reversed one
/// `active < anchor`. Rebasing only ever touches the two underlying offsets;
/// the direction is carried through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Selection {
	/// The fixed end of the selection.
	pub anchor: Position,
	/// The moving end of the selection (cursor position).
	pub active: Position,
}

impl Selection {
	/// Creates a new selection from anchor to active.
	pub const fn new(anchor: Position, active: Position) -> Self {
		Self { anchor, active }
	}

	/// Creates a zero-width selection (cursor) at the given position.
	pub const fn point(pos: Position) -> Self {
		Self::new(pos, pos)
	}

	/// Builds a selection covering `range` in the requested direction.
	pub fn from_range(range: TextRange, forward: bool) -> Self {
		if forward {
			Self::new(range.start, range.end)
		} else {
			Self::new(range.end, range.start)
		}
	}

	/// Returns the earlier of anchor and active.
	#[inline]
	pub fn start(&self) -> Position {
		self.anchor.min(self.active)
	}

	/// Returns the later of anchor and active.
	#[inline]
	pub fn end(&self) -> Position {
		self.anchor.max(self.active)
	}

	/// Returns the undirected extent of this selection.
	pub fn range(&self) -> TextRange {
		TextRange {
			start: self.start(),
			end: self.end(),
		}
	}

	/// Returns true if anchor equals active (zero-width cursor).
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.anchor == self.active
	}

	/// Returns true if the active end precedes the anchor.
	#[inline]
	pub fn is_reversed(&self) -> bool {
		self.active < self.anchor
	}

	/// Returns the direction of this selection.
	#[inline]
	pub fn direction(&self) -> Direction {
		if self.is_reversed() { Direction::Backward } else { Direction::Forward }
	}

	/// Returns a new selection with anchor and active swapped.
	pub fn flip(&self) -> Self {
		Self::new(self.active, self.anchor)
	}
}

impl From<TextRange> for Selection {
	fn from(range: TextRange) -> Self {
		Self::from_range(range, true)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pos(line: u32, character: u32) -> Position {
		Position::new(line, character)
	}

	#[test]
	fn test_position_ordering_is_document_order() {
		assert!(pos(0, 9) < pos(1, 0));
		assert!(pos(2, 3) < pos(2, 4));
		assert_eq!(pos(1, 1).max(pos(0, 7)), pos(1, 1));
	}

	#[test]
	fn test_text_range_orders_endpoints() {
		let r = TextRange::new(pos(3, 0), pos(1, 2));
		assert_eq!(r.start, pos(1, 2));
		assert_eq!(r.end, pos(3, 0));
		assert!(r.contains(pos(2, 100)));
		assert!(!r.contains(pos(3, 1)));
	}

	#[test]
	fn test_selection_backward() {
		let sel = Selection::new(pos(0, 10), pos(0, 5));
		assert!(sel.is_reversed());
		assert_eq!(sel.direction(), Direction::Backward);
		assert_eq!(sel.start(), pos(0, 5));
		assert_eq!(sel.end(), pos(0, 10));
	}

	#[test]
	fn test_selection_from_range_keeps_direction() {
		let range = TextRange::new(pos(0, 1), pos(0, 4));
		assert_eq!(Selection::from_range(range, true), Selection::new(pos(0, 1), pos(0, 4)));
		let reversed = Selection::from_range(range, false);
		assert!(reversed.is_reversed());
		assert_eq!(reversed.range(), range);
		assert_eq!(reversed.flip(), Selection::from(range));
	}

	#[test]
	fn test_point_selection_is_forward() {
		let sel = Selection::point(pos(4, 2));
		assert!(sel.is_empty());
		assert!(!sel.is_reversed());
	}
}
