//! Range rebasing against edit batches.
//!
//! Every boundary is mapped through every change independently, using the
//! pre-edit offsets of both. The displacement each change causes is added up
//! afterwards, so the order of changes in a batch never matters; only the
//! non-overlap invariant [`EditBatch`] guarantees does.
//!
//! For a boundary `o` and a change `[a, b) -> text` (`L` inserted chars):
//!
//! | case            | start boundary              | end boundary                |
//! |-----------------|-----------------------------|-----------------------------|
//! | `o < a`         | `o`                         | `o`                         |
//! | `o > b`         | shifted by the displacement | shifted by the displacement |
//! | `a < o < b`     | `a`                         | `a + L`                     |
//! | `o == a == b`   | closed: `a + L`, open: `a`  | closed: `a`, open: `a + L`  |
//! | `o == a < b`    | `a`                         | closed: `a`, open: `a + L`  |
//! | `a < b == o`    | closed: `a + L`, open: `a`  | `a + L`                     |
//!
//! An empty range sitting exactly on a pure insertion is carried as a single
//! point instead: pinned at `a` for replace-tagged changes, otherwise moved
//! to `a + L` only if its end policy is open.

use crate::change::{ContentChange, EditBatch};
use crate::policy::ExpansionPolicy;
use crate::range::CharIdx;
use crate::tracked::{Boundary, TrackedRange};


/// Rebases `ranges` against `batch`, returning the updated ranges in order.
pub fn rebase(batch: &EditBatch, ranges: &[TrackedRange]) -> Vec<TrackedRange> {
	ranges.iter().map(|range| rebase_range(batch, *range)).collect()
}

/// Rebases every range yielded by `ranges` in place.
///
/// Returns the number of ranges visited.
pub fn rebase_in_place<'a>(batch: &EditBatch, ranges: impl IntoIterator<Item = &'a mut TrackedRange>) -> usize {
	let mut visited = 0;
	for range in ranges {
		*range = rebase_range(batch, *range);
		visited += 1;
	}
	visited
}

/// Rebases a single range against `batch`.
pub fn rebase_range(batch: &EditBatch, range: TrackedRange) -> TrackedRange {
	if batch.is_empty() {
		return range;
	}

	let mut start_shift = 0isize;
	let mut end_shift = 0isize;
	for change in batch.changes() {
		let (start, end) = map_through(change, &range);
		start_shift += start as isize - range.start as isize;
		end_shift += end as isize - range.end as isize;
	}

	let start = range.start.saturating_add_signed(start_shift);
	let end = range.end.saturating_add_signed(end_shift);

	// Both boundaries collapsed past each other: keep the earlier point.
	let (start, end) = if end < start { (end, end) } else { (start, end) };

	TrackedRange { start, end, ..range }
}

/// Images of both boundaries of `range` under `change` alone.
fn map_through(change: &ContentChange, range: &TrackedRange) -> (CharIdx, CharIdx) {
	if range.is_empty() && change.is_insertion() && change.start() == range.start {
		let pinned = change.is_replace() || !range.end_policy.is_open();
		let point = if pinned { change.start() } else { change.new_end() };
		return (point, point);
	}

	(
		map_boundary(change, range.start, Boundary::Start, range.start_policy),
		map_boundary(change, range.end, Boundary::End, range.end_policy),
	)
}

/// Image of a single boundary offset under `change`.
pub fn map_boundary(change: &ContentChange, offset: CharIdx, boundary: Boundary, policy: ExpansionPolicy) -> CharIdx {
	let start = change.start();
	let old_end = change.old_end();

	if offset < start {
		return offset;
	}
	if offset > old_end {
		return offset - old_end + change.new_end();
	}

	let absorb = policy.is_open();
	match boundary {
		Boundary::Start if offset == old_end => {
			if absorb {
				start
			} else {
				change.new_end()
			}
		}
		Boundary::Start => start,
		Boundary::End if offset == start => {
			if absorb {
				change.new_end()
			} else {
				start
			}
		}
		Boundary::End => change.new_end(),
	}
}
