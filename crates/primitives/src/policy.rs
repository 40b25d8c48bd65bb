/// Stickiness of one range endpoint at an edit boundary.
///
/// When text is inserted (or replaced) exactly at an endpoint, the policy
/// decides whether the endpoint stays outside the new content or grows to
/// include it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExpansionPolicy {
	/// Endpoint does not absorb text at its exact position.
	#[default]
	Closed,
	/// Endpoint grows to include text at its exact position.
	Open,
}

impl ExpansionPolicy {
	/// Returns true for [`ExpansionPolicy::Open`].
	#[inline]
	pub const fn is_open(self) -> bool {
		matches!(self, Self::Open)
	}
}

/// Start/end policy pair for a whole range.
///
/// The names read `<start><end>`, matching the decoration range behaviors
/// hosts usually expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum RangeExpansionBehavior {
	/// Neither end absorbs adjacent insertions.
	#[default]
	ClosedClosed,
	/// Only the end absorbs adjacent insertions.
	ClosedOpen,
	/// Only the start absorbs adjacent insertions.
	OpenClosed,
	/// Both ends absorb adjacent insertions.
	OpenOpen,
}

impl RangeExpansionBehavior {
	/// Policy applied to the start boundary.
	pub const fn start(self) -> ExpansionPolicy {
		match self {
			Self::ClosedClosed | Self::ClosedOpen => ExpansionPolicy::Closed,
			Self::OpenClosed | Self::OpenOpen => ExpansionPolicy::Open,
		}
	}

	/// Policy applied to the end boundary.
	pub const fn end(self) -> ExpansionPolicy {
		match self {
			Self::ClosedClosed | Self::OpenClosed => ExpansionPolicy::Closed,
			Self::ClosedOpen | Self::OpenOpen => ExpansionPolicy::Open,
		}
	}

	/// Builds the behavior from an explicit policy pair.
	pub const fn from_policies(start: ExpansionPolicy, end: ExpansionPolicy) -> Self {
		match (start, end) {
			(ExpansionPolicy::Closed, ExpansionPolicy::Closed) => Self::ClosedClosed,
			(ExpansionPolicy::Closed, ExpansionPolicy::Open) => Self::ClosedOpen,
			(ExpansionPolicy::Open, ExpansionPolicy::Closed) => Self::OpenClosed,
			(ExpansionPolicy::Open, ExpansionPolicy::Open) => Self::OpenOpen,
		}
	}
}
