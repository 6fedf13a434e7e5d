//! Lightweight interned-ish string labels used to name nodes and ports.

use smartstring::{LazyCompact, SmartString};
use std::fmt::{self, Display};

macro_rules! string_label {
	($name:ident, $doc:literal) => {
		#[doc = $doc]
		#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
		pub struct $name(SmartString<LazyCompact>);

		impl $name {
			/// Build a new label from any string-like value.
			pub fn new(s: impl AsRef<str>) -> Self {
				Self(SmartString::from(s.as_ref()))
			}

			/// Borrow the label as a plain `&str`.
			pub fn as_str(&self) -> &str {
				self.0.as_str()
			}
		}

		impl Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<&str> for $name {
			fn from(s: &str) -> Self {
				Self::new(s)
			}
		}

		impl From<String> for $name {
			fn from(s: String) -> Self {
				Self::new(s)
			}
		}
	};
}

string_label!(NodeName, "The stable, subgraph-unique name of a node.");
string_label!(PortName, "The name of a port, unique within its owning node and direction.");

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn labels_compare_by_value() {
		assert_eq!(NodeName::new("producer"), NodeName::from("producer"));
		assert_ne!(NodeName::new("producer"), NodeName::new("consumer"));
	}

	#[test]
	fn labels_display_as_their_string() {
		assert_eq!(PortName::new("out").to_string(), "out");
	}
}
