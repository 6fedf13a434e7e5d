//! A config-file friendly log level, convertible into a `tracing-subscriber` filter string.

use std::{fmt::Display, str::FromStr};

use serde::Deserialize;

/// The minimum severity of `tracing` events a binary should print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
	/// Everything, including per-message trace events. Noisy.
	Trace,
	/// Debug-level detail, useful while developing a graph.
	Debug,
	/// Default: node lifecycle transitions and shutdown phases.
	Info,
	/// Only unexpected conditions.
	Warn,
	/// Only failures.
	Error,
}

impl Default for LogLevel {
	fn default() -> Self {
		Self::Info
	}
}

impl Display for LogLevel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			Self::Trace => "trace",
			Self::Debug => "debug",
			Self::Info => "info",
			Self::Warn => "warn",
			Self::Error => "error",
		};
		write!(f, "{s}")
	}
}

impl FromStr for LogLevel {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match s.to_ascii_lowercase().as_str() {
			"trace" => Self::Trace,
			"debug" => Self::Debug,
			"info" => Self::Info,
			"warn" | "warning" => Self::Warn,
			"error" => Self::Error,
			other => return Err(format!("unrecognized log level `{other}`")),
		})
	}
}

impl LogLevel {
	/// Build the `tracing-subscriber` `EnvFilter` directive string for this level.
	///
	/// Scopes the directive to the `meridian` crates so a binary embedding
	/// Meridian doesn't also turn on trace logging for its own dependencies.
	pub fn to_env_filter(self) -> String {
		format!("meridian={self}")
	}
}
