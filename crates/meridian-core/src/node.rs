//! Node lifecycle contract (`spec.md` §4.4).
//!
//! The source this was distilled from models nodes as duck-typed
//! subclasses of a framework base class. Here a node is a capability set:
//! a plain trait with four optional callbacks, so user code implements
//! [`Node`] rather than extending anything.

use std::{collections::HashMap, fmt};

use crate::{
	edge::{Edge, PutResult},
	error::{EmitError, NodeError},
	labels::{NodeName, PortName},
	message::Message,
	observability::Observability,
	port::{Port, PortDirection, PortSpec},
};
use std::sync::Arc;

/// Where a node sits in its lifecycle (`spec.md` §4.4):
/// `Init -> Started -> Running <-> (tick|message) -> Stopping -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
	Init,
	Started,
	Running,
	Stopping,
	Stopped,
}

impl NodeState {
	pub fn accepts_work(&self) -> bool {
		matches!(self, Self::Started | Self::Running)
	}
}

impl fmt::Display for NodeState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Init => "init",
			Self::Started => "started",
			Self::Running => "running",
			Self::Stopping => "stopping",
			Self::Stopped => "stopped",
		})
	}
}

/// The node-side handle passed to every callback. Routes [`Self::emit`]
/// calls to the precomputed outgoing edge for a port, resolved once at
/// registration rather than looked up by name on every call (`spec.md` §9
/// "dynamic port dispatch by string name").
pub struct EmitContext<'a> {
	node: &'a NodeName,
	outputs: &'a HashMap<PortName, Arc<Edge>>,
	obs: &'a Observability,
	pub(crate) blocked: Vec<Arc<Edge>>,
}

impl<'a> EmitContext<'a> {
	pub(crate) fn new(
		node: &'a NodeName,
		outputs: &'a HashMap<PortName, Arc<Edge>>,
		obs: &'a Observability,
	) -> Self {
		Self {
			node,
			outputs,
			obs,
			blocked: Vec::new(),
		}
	}

	/// Route a message to the edge bound to `port`. Returns the underlying
	/// [`PutResult`]; [`EmitError`] only if `port` has no outgoing edge.
	pub fn emit(&mut self, port: &str, msg: Message) -> Result<PutResult, EmitError> {
		let port_name = PortName::new(port);
		let edge = self.outputs.get(&port_name).ok_or_else(|| EmitError {
			node: self.node.clone(),
			port: port_name.clone(),
		})?;

		let result = edge.try_put(msg);
		self.obs.tracer.edge_put(&edge.source().0, &edge.dest().0, result);
		self.obs.metrics.record_count(put_result_metric(result), 1);
		if result.is_enqueued() {
			self.obs.tracer.message_enqueued(&edge.dest().0);
		}
		if result == PutResult::Blocked {
			self.blocked.push(Arc::clone(edge));
		}
		Ok(result)
	}
}

/// The metrics counter name for a given `try_put` outcome, e.g.
/// `"edge.put.accepted"`.
fn put_result_metric(result: PutResult) -> &'static str {
	match result {
		PutResult::Accepted => "edge.put.accepted",
		PutResult::Blocked => "edge.put.blocked",
		PutResult::Dropped => "edge.put.dropped",
		PutResult::Replaced => "edge.put.replaced",
		PutResult::Coalesced => "edge.put.coalesced",
	}
}

/// A processing unit with declared input/output ports and lifecycle
/// callbacks (`spec.md` §4.4). All callbacks are optional; the defaults are
/// no-ops so a node only implements what it needs.
pub trait Node: Send {
	/// Called exactly once per registration, before any tick or message
	/// delivery.
	fn on_start(&mut self, _ctx: &mut EmitContext<'_>) -> Result<(), NodeError> {
		Ok(())
	}

	/// Called exactly once, after the scheduler has decided to quiesce this
	/// node and no further deliveries will occur.
	fn on_stop(&mut self, _ctx: &mut EmitContext<'_>) -> Result<(), NodeError> {
		Ok(())
	}

	/// Invoked at most every `tick_interval_ms` (`spec.md` §5). Intended for
	/// time-driven work: producers, periodic flushers.
	fn on_tick(&mut self, _ctx: &mut EmitContext<'_>) -> Result<(), NodeError> {
		Ok(())
	}

	/// Invoked for each message the scheduler delivers to one of this
	/// node's input ports.
	fn on_message(
		&mut self,
		_port: &str,
		_msg: Message,
		_ctx: &mut EmitContext<'_>,
	) -> Result<(), NodeError> {
		Ok(())
	}
}

/// A node plus its declared ports, ready to be added to a
/// [`crate::subgraph::Subgraph`].
pub struct NodeSpec {
	pub(crate) name: NodeName,
	pub(crate) ports: Vec<Port>,
	pub(crate) node: Box<dyn Node>,
}

impl NodeSpec {
	/// Start building a node declaration. Ports are added with
	/// [`Self::input`]/[`Self::output`].
	pub fn new(name: impl Into<NodeName>, node: impl Node + 'static) -> Self {
		Self {
			name: name.into(),
			ports: Vec::new(),
			node: Box::new(node),
		}
	}

	/// Declare an input port.
	pub fn input(mut self, spec: PortSpec) -> Self {
		self.ports.push(Port::input(spec));
		self
	}

	/// Declare an output port.
	pub fn output(mut self, spec: PortSpec) -> Self {
		self.ports.push(Port::output(spec));
		self
	}

	pub fn name(&self) -> &NodeName {
		&self.name
	}

	pub(crate) fn port(&self, name: &PortName, direction: PortDirection) -> Option<&Port> {
		self.ports
			.iter()
			.find(|p| p.direction == direction && p.name() == name)
	}
}

impl fmt::Debug for NodeSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NodeSpec")
			.field("name", &self.name)
			.field("ports", &self.ports.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Noop;
	impl Node for Noop {}

	#[test]
	fn finds_declared_port_by_direction() {
		let spec = NodeSpec::new("n", Noop)
			.input(PortSpec::any("in"))
			.output(PortSpec::any("out"));
		assert!(spec.port(&PortName::new("in"), PortDirection::Input).is_some());
		assert!(spec.port(&PortName::new("in"), PortDirection::Output).is_none());
		assert!(spec.port(&PortName::new("missing"), PortDirection::Input).is_none());
	}
}
