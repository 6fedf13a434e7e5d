//! Owns a set of nodes and the edges wiring them; validates wiring
//! (`spec.md` §4.5).

use crate::{
	error::WiringError,
	labels::{NodeName, PortName},
	node::NodeSpec,
	policy::OverflowPolicy,
	port::PortDirection,
};

/// The default capacity `connect` uses when none is given (`spec.md` §6).
pub const DEFAULT_CAPACITY: usize = 16;

/// `(node, port)` as named at wiring time, before validation confirms it
/// refers to a real declared port.
pub type Endpoint = (NodeName, PortName);

/// Options for [`Subgraph::connect`], with `connect`'s documented defaults:
/// capacity 16, Block policy, no control bypass.
#[derive(Clone)]
pub struct ConnectOptions {
	pub capacity: usize,
	pub policy: OverflowPolicy,
	pub control_bypass: bool,
}

impl Default for ConnectOptions {
	fn default() -> Self {
		Self {
			capacity: DEFAULT_CAPACITY,
			policy: OverflowPolicy::Block,
			control_bypass: false,
		}
	}
}

impl ConnectOptions {
	pub fn capacity(mut self, capacity: usize) -> Self {
		self.capacity = capacity;
		self
	}

	pub fn policy(mut self, policy: OverflowPolicy) -> Self {
		self.policy = policy;
		self
	}

	pub fn control_bypass(mut self, bypass: bool) -> Self {
		self.control_bypass = bypass;
		self
	}
}

pub(crate) struct EdgeSpec {
	pub(crate) src: Endpoint,
	pub(crate) dst: Endpoint,
	pub(crate) options: ConnectOptions,
}

/// A validated-at-registration collection of nodes and the edges wiring
/// them. Built offline, then handed to exactly one
/// [`crate::scheduler::Scheduler`] at a time; topology is immutable after
/// registration.
#[derive(Default)]
pub struct Subgraph {
	pub(crate) nodes: Vec<NodeSpec>,
	pub(crate) edges: Vec<EdgeSpec>,
}

impl Subgraph {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a node to this subgraph. Fails immediately on a duplicate name so
	/// mistakes surface at the call site that caused them, rather than at
	/// validation time with a less specific error.
	pub fn add_node(&mut self, node: NodeSpec) -> Result<&mut Self, WiringError> {
		if self.nodes.iter().any(|n| n.name() == node.name()) {
			return Err(WiringError::DuplicateNodeName { node: node.name().clone() });
		}
		self.nodes.push(node);
		Ok(self)
	}

	/// Wire an output port to an input port. `src` and `dst` are
	/// `(node name, port name)` pairs; neither endpoint needs to exist yet
	/// at call time; all wiring is checked together by [`Self::validate`].
	pub fn connect(
		&mut self,
		src: (&str, &str),
		dst: (&str, &str),
		options: ConnectOptions,
	) -> &mut Self {
		self.edges.push(EdgeSpec {
			src: (NodeName::new(src.0), PortName::new(src.1)),
			dst: (NodeName::new(dst.0), PortName::new(dst.1)),
			options,
		});
		self
	}

	fn find_node(&self, name: &NodeName) -> Option<&NodeSpec> {
		self.nodes.iter().find(|n| n.name() == name)
	}

	/// Run the four checks from `spec.md` §4.5, in order, returning the
	/// first offending wiring.
	pub fn validate(&self) -> Result<(), WiringError> {
		// 4. No duplicate node names (add_node already enforces this, but a
		// subgraph may be mutated in ways that shouldn't be trusted blindly).
		for (i, a) in self.nodes.iter().enumerate() {
			for b in &self.nodes[i + 1..] {
				if a.name() == b.name() {
					return Err(WiringError::DuplicateNodeName { node: a.name().clone() });
				}
			}
		}

		let mut seen_inputs: Vec<&Endpoint> = Vec::new();

		for edge in &self.edges {
			let (src_node_name, src_port_name) = &edge.src;
			let (dst_node_name, dst_port_name) = &edge.dst;

			// 1. Every referenced (node, port) exists and direction is correct.
			let src_node = self
				.find_node(src_node_name)
				.ok_or_else(|| WiringError::UnknownNode { node: src_node_name.clone() })?;
			let src_port = src_node
				.port(src_port_name, PortDirection::Output)
				.ok_or_else(|| {
					if src_node.port(src_port_name, PortDirection::Input).is_some() {
						WiringError::WrongDirection {
							node: src_node_name.clone(),
							port: src_port_name.clone(),
							expected: PortDirection::Output,
						}
					} else {
						WiringError::UnknownPort {
							node: src_node_name.clone(),
							port: src_port_name.clone(),
						}
					}
				})?;

			let dst_node = self
				.find_node(dst_node_name)
				.ok_or_else(|| WiringError::UnknownNode { node: dst_node_name.clone() })?;
			let dst_port = dst_node
				.port(dst_port_name, PortDirection::Input)
				.ok_or_else(|| {
					if dst_node.port(dst_port_name, PortDirection::Output).is_some() {
						WiringError::WrongDirection {
							node: dst_node_name.clone(),
							port: dst_port_name.clone(),
							expected: PortDirection::Input,
						}
					} else {
						WiringError::UnknownPort {
							node: dst_node_name.clone(),
							port: dst_port_name.clone(),
						}
					}
				})?;

			// 2. Every input port has at most one incoming edge.
			if seen_inputs.iter().any(|(n, p)| n == dst_node_name && p == dst_port_name) {
				return Err(WiringError::DuplicateInputEdge {
					node: dst_node_name.clone(),
					port: dst_port_name.clone(),
				});
			}
			seen_inputs.push(&edge.dst);

			// 3. Schema tags on source/destination are compatible.
			if !src_port.spec.schema.compatible(&dst_port.spec.schema) {
				return Err(WiringError::IncompatibleSchema {
					source: edge.src.clone(),
					dest: edge.dst.clone(),
				});
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{node::Node, port::PortSpec};

	struct Noop;
	impl Node for Noop {}

	fn node(name: &str) -> NodeSpec {
		NodeSpec::new(name, Noop)
			.input(PortSpec::any("in"))
			.output(PortSpec::any("out"))
	}

	#[test]
	fn rejects_unknown_node() {
		let mut g = Subgraph::new();
		g.add_node(node("a")).unwrap();
		g.connect(("a", "out"), ("nope", "in"), ConnectOptions::default());
		assert!(matches!(g.validate(), Err(WiringError::UnknownNode { .. })));
	}

	#[test]
	fn rejects_wrong_direction() {
		let mut g = Subgraph::new();
		g.add_node(node("a")).unwrap();
		g.add_node(node("b")).unwrap();
		g.connect(("a", "in"), ("b", "in"), ConnectOptions::default());
		assert!(matches!(g.validate(), Err(WiringError::WrongDirection { .. })));
	}

	#[test]
	fn rejects_duplicate_input_edge() {
		let mut g = Subgraph::new();
		g.add_node(node("a")).unwrap();
		g.add_node(node("b")).unwrap();
		g.add_node(node("c")).unwrap();
		g.connect(("a", "out"), ("c", "in"), ConnectOptions::default());
		g.connect(("b", "out"), ("c", "in"), ConnectOptions::default());
		assert!(matches!(g.validate(), Err(WiringError::DuplicateInputEdge { .. })));
	}

	#[test]
	fn rejects_incompatible_schema() {
		let mut g = Subgraph::new();
		g.add_node(NodeSpec::new("a", Noop).output(PortSpec::new("out", "int")))
			.unwrap();
		g.add_node(NodeSpec::new("b", Noop).input(PortSpec::new("in", "string")))
			.unwrap();
		g.connect(("a", "out"), ("b", "in"), ConnectOptions::default());
		assert!(matches!(g.validate(), Err(WiringError::IncompatibleSchema { .. })));
	}

	#[test]
	fn rejects_duplicate_node_name() {
		let mut g = Subgraph::new();
		g.add_node(node("a")).unwrap();
		assert!(matches!(
			g.add_node(node("a")),
			Err(WiringError::DuplicateNodeName { .. })
		));
	}

	#[test]
	fn valid_wiring_passes_and_is_idempotent() {
		let mut g = Subgraph::new();
		g.add_node(node("a")).unwrap();
		g.add_node(node("b")).unwrap();
		g.connect(("a", "out"), ("b", "in"), ConnectOptions::default());
		assert!(g.validate().is_ok());
		assert!(g.validate().is_ok());
	}
}
