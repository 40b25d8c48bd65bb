//! Tracker configuration.
//!
//! ```toml
//! preserve-editor-selections = false
//! default-behavior = "closed-open"
//! log-changes = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tether_primitives::RangeExpansionBehavior;
use thiserror::Error;


/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or an invalid value.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},
}

/// Defaults applied by a [`RangeRegistry`](crate::RangeRegistry) and the
/// transactions built on it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct TrackerConfig {
	/// Leave the editor's selections alone after a transaction instead of
	/// rebasing and writing them back.
	pub preserve_editor_selections: bool,
	/// Behavior for groups added with
	/// [`RangeTransaction::track_default`](crate::RangeTransaction::track_default).
	pub default_behavior: RangeExpansionBehavior,
	/// Include the full change list in `range_registry.change` events.
	pub log_changes: bool,
}

impl Default for TrackerConfig {
	fn default() -> Self {
		Self {
			preserve_editor_selections: false,
			default_behavior: RangeExpansionBehavior::ClosedClosed,
			log_changes: false,
		}
	}
}

impl TrackerConfig {
	/// Parses configuration from TOML text. Missing keys take their defaults.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(input)?)
	}

	/// Reads and parses a TOML configuration file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&input)
	}
}
