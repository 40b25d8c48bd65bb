use crate::policy::{ExpansionPolicy, RangeExpansionBehavior};
use crate::range::{CharIdx, CharLen};

/// Which end of a tracked range a boundary offset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
	/// The lower offset.
	Start,
	/// The upper offset.
	End,
}

/// A character range kept consistent across document edits.
///
/// Invariant: `start <= end`, including immediately after rebasing.
/// `is_forward` records which offset is the anchor for presentation and is
/// never itself rebased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackedRange {
	/// Start offset (inclusive).
	pub start: CharIdx,
	/// End offset (exclusive).
	pub end: CharIdx,
	/// Stickiness of the start offset.
	pub start_policy: ExpansionPolicy,
	/// Stickiness of the end offset.
	pub end_policy: ExpansionPolicy,
	/// True when the anchor is at `start` and the active end at `end`.
	pub is_forward: bool,
}

impl TrackedRange {
	/// Creates a forward range over `[start, end)`.
	///
	/// Offsets given in the wrong order are swapped; the range is then marked
	/// backward so the caller's direction survives the round trip.
	pub fn new(start: CharIdx, end: CharIdx, behavior: RangeExpansionBehavior) -> Self {
		Self::from_anchor_active(start, end, behavior)
	}

	/// Creates a `ClosedClosed` forward range.
	pub fn closed(start: CharIdx, end: CharIdx) -> Self {
		Self::new(start, end, RangeExpansionBehavior::ClosedClosed)
	}

	/// Creates a zero-width range at `pos`.
	pub fn point(pos: CharIdx, behavior: RangeExpansionBehavior) -> Self {
		Self::new(pos, pos, behavior)
	}

	/// Creates a range from a directed pair of offsets.
	pub fn from_anchor_active(anchor: CharIdx, active: CharIdx, behavior: RangeExpansionBehavior) -> Self {
		Self {
			start: anchor.min(active),
			end: anchor.max(active),
			start_policy: behavior.start(),
			end_policy: behavior.end(),
			is_forward: anchor <= active,
		}
	}

	/// Returns the policy pair as a single behavior value.
	pub fn behavior(&self) -> RangeExpansionBehavior {
		RangeExpansionBehavior::from_policies(self.start_policy, self.end_policy)
	}

	/// Returns the policy governing `boundary`.
	pub fn policy(&self, boundary: Boundary) -> ExpansionPolicy {
		match boundary {
			Boundary::Start => self.start_policy,
			Boundary::End => self.end_policy,
		}
	}

	/// Returns true if start equals end.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}

	/// Returns the length of the range in characters.
	#[inline]
	pub fn len(&self) -> CharLen {
		self.end - self.start
	}

	/// Returns `(anchor, active)` according to the direction flag.
	pub fn anchor_active(&self) -> (CharIdx, CharIdx) {
		if self.is_forward { (self.start, self.end) } else { (self.end, self.start) }
	}
}
