//! Range tracking on top of a host editor.
//!
//! A [`RangeRegistry`] subscribes to the host's change events and keeps every
//! registered [`RangeList`] rebased. [`perform_edits_and_track`],
//! [`run_and_track`] and [`RangeTransaction`] wrap the register, edit, read
//! back cycle for callers that only care about the resulting selections.

/// Tracker configuration.
pub mod config;
/// Error types.
pub mod error;
/// Host editor abstraction traits.
pub mod host;
/// In-memory reference host.
pub mod memory;
/// Boxed operation futures.
pub mod operation;
/// Range list and replace marker registry.
pub mod registry;
/// Edit-application facade.
pub mod track;
/// Multi-group transaction builder.
pub mod transaction;

pub use config::{ConfigError, TrackerConfig};
pub use error::{BoxError, TrackError};
pub use host::{ChangeEventSource, ChangeListener, DocumentChangeEvent, EditableEditor, Subscription, TextDocument};
pub use memory::{MemoryDocument, MemoryEditor, MemoryWorkspace};
pub use operation::{BoxFutureSend, Operation};
pub use registry::{RangeList, RangeRegistry, Registration, ReplaceMarkerList};
pub use track::{RangeGroup, perform_document_edits, perform_edits_and_track, run_and_track};
pub use transaction::{GroupId, RangeTransaction, TrackedGroups};
