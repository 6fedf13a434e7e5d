//! Port declarations: where a node's edges attach.

use std::fmt::{self, Display};

use smartstring::{LazyCompact, SmartString};

use crate::labels::PortName;

/// Which way data flows through a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
	/// Messages arrive on this port, delivered via [`crate::node::Node::on_message`].
	Input,
	/// Messages leave through this port via [`crate::node::EmitContext::emit`].
	Output,
}

impl Display for PortDirection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Input => "input",
			Self::Output => "output",
		})
	}
}

/// The wildcard schema tag. A port declared with this tag is compatible with
/// any other port, in either direction.
pub const ANY_SCHEMA: &str = "any";

/// An advisory payload type tag, checked at wiring time only (`spec.md` §3).
///
/// Meridian never inspects message payloads against a schema at runtime;
/// this exists purely so two misconnected nodes fail loudly at
/// [`crate::subgraph::Subgraph::validate`] time instead of silently
/// misinterpreting each other's data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaTag(SmartString<LazyCompact>);

impl SchemaTag {
	/// Build a schema tag from any string-like value. `"any"` is treated
	/// specially by [`Self::compatible`].
	pub fn new(s: impl AsRef<str>) -> Self {
		Self(SmartString::from(s.as_ref()))
	}

	/// The wildcard tag, compatible with everything.
	pub fn any() -> Self {
		Self::new(ANY_SCHEMA)
	}

	/// Two ports may be connected if either side is `"any"` or both tags
	/// are textually equal.
	pub fn compatible(&self, other: &Self) -> bool {
		self.0 == ANY_SCHEMA || other.0 == ANY_SCHEMA || self.0 == other.0
	}

	/// Borrow the tag text.
	pub fn as_str(&self) -> &str {
		self.0.as_str()
	}
}

impl Display for SchemaTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<&str> for SchemaTag {
	fn from(s: &str) -> Self {
		Self::new(s)
	}
}

/// A name plus an advisory payload schema tag (`spec.md` §3).
#[derive(Debug, Clone)]
pub struct PortSpec {
	pub name: PortName,
	pub schema: SchemaTag,
}

impl PortSpec {
	/// Declare a port with an explicit schema tag.
	pub fn new(name: impl Into<PortName>, schema: impl Into<SchemaTag>) -> Self {
		Self {
			name: name.into(),
			schema: schema.into(),
		}
	}

	/// Declare a port that accepts/produces any payload.
	pub fn any(name: impl Into<PortName>) -> Self {
		Self::new(name, SchemaTag::any())
	}
}

impl Display for PortSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.name, self.schema)
	}
}

/// A port declaration bound to a node (`spec.md` §3): a direction plus a
/// [`PortSpec`]. Uniquely identified within its owning node by
/// `(node name, port name, direction)`.
#[derive(Debug, Clone)]
pub struct Port {
	pub direction: PortDirection,
	pub spec: PortSpec,
}

impl Port {
	pub fn input(spec: PortSpec) -> Self {
		Self {
			direction: PortDirection::Input,
			spec,
		}
	}

	pub fn output(spec: PortSpec) -> Self {
		Self {
			direction: PortDirection::Output,
			spec,
		}
	}

	pub fn name(&self) -> &PortName {
		&self.spec.name
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn any_is_compatible_with_everything() {
		assert!(SchemaTag::any().compatible(&SchemaTag::new("int")));
		assert!(SchemaTag::new("int").compatible(&SchemaTag::any()));
	}

	#[test]
	fn equal_tags_are_compatible() {
		assert!(SchemaTag::new("int").compatible(&SchemaTag::new("int")));
	}

	#[test]
	fn distinct_tags_are_incompatible() {
		assert!(!SchemaTag::new("int").compatible(&SchemaTag::new("string")));
	}
}
