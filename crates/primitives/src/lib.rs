//! Core types for range tracking: positions, tracked ranges, edit batches, and rebasing.

/// Content changes, validated edit batches, and replace markers.
pub mod change;
/// Host-coordinate edit records.
pub mod edit;
/// Endpoint expansion policies.
pub mod policy;
/// Position, range, and selection types in host coordinates.
pub mod range;
/// The range rebasing algorithm.
pub mod rebase;
/// Offset-space tracked ranges.
pub mod tracked;

pub use change::{ContentChange, EditBatch, MalformedBatch, ReplaceMarker};
pub use edit::{Edit, EditMode};
pub use policy::{ExpansionPolicy, RangeExpansionBehavior};
pub use range::{CharIdx, CharLen, Direction, Position, Selection, TextRange};
pub use rebase::{map_boundary, rebase, rebase_in_place, rebase_range};
pub use tracked::{Boundary, TrackedRange};
