//! Config-file loading for the `meridian` binary. A thin wrapper around
//! [`meridian_core::SchedulerConfig`] plus the log level, loadable from a
//! TOML file or run with documented defaults.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use meridian_core::SchedulerConfig;
use meridian_util::LogLevel;
use serde::Deserialize;

/// The `meridian` binary's on-disk configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MeridianConfig {
	pub scheduler: SchedulerConfig,
	pub logging: LogLevel,
}

impl MeridianConfig {
	const DEFAULT_CONFIG: &'static str = include_str!("./default-config.toml");

	/// Write the shipped default config to `path`, overwriting anything
	/// already there.
	pub fn create_default_config(path: &Path) -> Result<()> {
		fs::write(path, Self::DEFAULT_CONFIG)
			.with_context(|| format!("writing default config to {}", path.display()))
	}

	/// Load a config from a TOML file. Missing fields (or a missing file
	/// entirely via [`Self::default`]) fall back to documented defaults.
	pub fn load_from_file(path: &Path) -> Result<Self> {
		let text = fs::read_to_string(path)
			.with_context(|| format!("reading config file {}", path.display()))?;
		toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
	}
}
