//! Drives node execution: ticks, message dispatch, fairness, priority,
//! shutdown (`spec.md` §4.6).

use std::{
	collections::HashMap,
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
	time::{Duration, Instant},
};

use itertools::Itertools;
use petgraph::{algo::toposort, graph::DiGraph};
use serde::Deserialize;

use crate::{
	edge::Edge,
	error::{SchedulerError, ShutdownTimeout},
	labels::{NodeName, PortName},
	message::MessageKind,
	node::{EmitContext, Node, NodeState},
	observability::{Observability, ShutdownPhase},
	subgraph::Subgraph,
};

/// Scheduler tuning knobs (`spec.md` §6). Every field has a documented
/// default and is optional when loading from a config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
	/// Target period between ticks for a given node.
	pub tick_interval_ms: u64,
	/// Sleep interval when no node is runnable.
	pub idle_sleep_ms: u64,
	/// Maximum time to wait for drain after shutdown is requested, and also
	/// the idle period after which a quiescent graph self-transitions to
	/// `Requested` (`spec.md` §4.6.4).
	pub shutdown_timeout_s: f64,
	/// Integer weights `(control, high, normal)` for the three priority
	/// lanes (`spec.md` §4.6.1).
	pub fairness_ratio: (u32, u32, u32),
	/// Max messages/ticks delivered to one node in a single scheduling
	/// slice.
	pub max_batch_per_node: usize,
}

impl Default for SchedulerConfig {
	fn default() -> Self {
		Self {
			tick_interval_ms: 50,
			idle_sleep_ms: 1,
			shutdown_timeout_s: 5.0,
			fairness_ratio: (4, 2, 1),
			max_batch_per_node: 8,
		}
	}
}

/// A cheap, `Clone`-able, thread-safe way to request shutdown from outside
/// the thread running [`Scheduler::run`].
#[derive(Clone)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
	/// Request shutdown. Idempotent: calling this more than once has no
	/// additional effect (`spec.md` §8 R2).
	pub fn shutdown(&self) {
		self.0.store(true, Ordering::SeqCst);
	}

	pub fn is_requested(&self) -> bool {
		self.0.load(Ordering::SeqCst)
	}
}

struct NodeRuntime {
	name: NodeName,
	node: Box<dyn Node>,
	state: NodeState,
	/// Input edges in port-declaration order, so per-port FIFO dispatch
	/// (`spec.md` §4.6.2) is deterministic.
	inputs: Vec<(PortName, Arc<Edge>)>,
	/// Output port -> precomputed edge handle, resolved once at
	/// registration rather than looked up by name per `emit` call
	/// (`spec.md` §9 "dynamic port dispatch by string name").
	outputs: HashMap<PortName, Arc<Edge>>,
	tick_interval: Duration,
	next_tick: Instant,
	/// Edges a previous `Block`-policy emit returned `Blocked` on; this node
	/// is not runnable again until all of these have room (`spec.md` §4.6.3).
	blocked_on: Vec<Arc<Edge>>,
}

impl NodeRuntime {
	/// Record edges a callback blocked on, deduplicated by identity so a
	/// node that emits to the same full edge more than once in a single
	/// dispatch doesn't pile up redundant entries for [`Scheduler::classify`]
	/// to re-check.
	fn record_blocked(&mut self, blocked: Vec<Arc<Edge>>) {
		self.blocked_on
			.extend(blocked.into_iter().unique_by(|e| Arc::as_ptr(e) as usize));
	}

	fn next_control_source(&self) -> Option<(PortName, Arc<Edge>)> {
		self.inputs
			.iter()
			.find(|(_, e)| e.peek_kind() == Some(MessageKind::Control))
			.map(|(p, e)| (p.clone(), Arc::clone(e)))
	}

	fn next_data_source(&self) -> Option<(PortName, Arc<Edge>)> {
		self.inputs
			.iter()
			.find(|(_, e)| !e.is_empty())
			.map(|(p, e)| (p.clone(), Arc::clone(e)))
	}

	fn has_pending_data(&self) -> bool {
		self.inputs
			.iter()
			.any(|(_, e)| matches!(e.peek_kind(), Some(MessageKind::Data) | Some(MessageKind::Error)))
	}

	fn has_pending_control(&self) -> bool {
		self.inputs.iter().any(|(_, e)| e.peek_kind() == Some(MessageKind::Control))
	}

	fn record_result(&mut self, result: Result<(), crate::error::NodeError>, obs: &Observability) {
		if let Err(err) = result {
			obs.logger
				.log(meridian_util::LogLevel::Error, &format!("node `{}` failed: {err}", self.name));
			self.state = NodeState::Stopping;
		}
	}

	/// Deliver up to `max_batch` work units: CONTROL messages first across
	/// all input ports, then DATA in per-port FIFO order, then one tick if
	/// `tick_due` (`spec.md` §4.6.2).
	fn dispatch(&mut self, max_batch: usize, obs: &Observability, tick_due: bool) {
		let mut delivered = 0usize;
		let mut tick_used = false;

		while delivered < max_batch {
			if let Some((port, edge)) = self.next_control_source() {
				if let Some(msg) = edge.try_get() {
					obs.tracer.message_dequeued(&self.name);
					obs.metrics.record_count("message.dequeued", 1);
					let mut ctx = EmitContext::new(&self.name, &self.outputs, obs);
					let result = self.node.on_message(port.as_str(), msg, &mut ctx);
					self.record_blocked(ctx.blocked);
					self.record_result(result, obs);
					delivered += 1;
					if !self.state.accepts_work() {
						return;
					}
					continue;
				}
			}

			if let Some((port, edge)) = self.next_data_source() {
				if let Some(msg) = edge.try_get() {
					obs.tracer.message_dequeued(&self.name);
					obs.metrics.record_count("message.dequeued", 1);
					let mut ctx = EmitContext::new(&self.name, &self.outputs, obs);
					let result = self.node.on_message(port.as_str(), msg, &mut ctx);
					self.record_blocked(ctx.blocked);
					self.record_result(result, obs);
					delivered += 1;
					if !self.state.accepts_work() {
						return;
					}
					continue;
				}
			}

			if tick_due && !tick_used {
				tick_used = true;
				let mut ctx = EmitContext::new(&self.name, &self.outputs, obs);
				let result = self.node.on_tick(&mut ctx);
				self.record_blocked(ctx.blocked);
				self.record_result(result, obs);
				self.next_tick = Instant::now() + self.tick_interval;
				delivered += 1;
				if !self.state.accepts_work() {
					return;
				}
				continue;
			}

			break;
		}
	}
}

/// Drives execution of one registered [`Subgraph`] (`spec.md` §4.6). Owns
/// the node-ready set, per-node tick deadlines, and the shutdown flag — the
/// three owners of shared mutation per `spec.md` §5; nodes never reach into
/// edges or each other directly.
pub struct Scheduler {
	config: SchedulerConfig,
	obs: Observability,
	nodes: Vec<NodeRuntime>,
	/// Node indices in the order `on_stop` should be called: reverse
	/// topological order when the graph is acyclic, registration order
	/// reversed otherwise (`spec.md` §4.6.4).
	stop_order: Vec<usize>,
	shutdown: ShutdownHandle,
}

impl Scheduler {
	/// Build a scheduler with no subgraph registered yet.
	pub fn new(config: SchedulerConfig, obs: Observability) -> Self {
		Self {
			config,
			obs,
			nodes: Vec::new(),
			stop_order: Vec::new(),
			shutdown: ShutdownHandle(Arc::new(AtomicBool::new(false))),
		}
	}

	/// Validate and register a subgraph, building the runtime edge/node
	/// topology. Consumes `self` and the subgraph: a scheduler registers
	/// exactly one subgraph (`spec.md` §4.5).
	pub fn register(mut self, mut subgraph: Subgraph) -> Result<Self, crate::error::WiringError> {
		subgraph.validate()?;
		tracing::debug!(
			nodes = subgraph.nodes.len(),
			edges = subgraph.edges.len(),
			"registering subgraph"
		);

		let node_index: HashMap<NodeName, usize> = subgraph
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.name().clone(), i))
			.collect();

		let mut outputs: Vec<HashMap<PortName, Arc<Edge>>> = vec![HashMap::new(); subgraph.nodes.len()];
		let mut inputs: Vec<Vec<(PortName, Arc<Edge>)>> = vec![Vec::new(); subgraph.nodes.len()];

		let mut graph = DiGraph::<(), ()>::with_capacity(subgraph.nodes.len(), subgraph.edges.len());
		let graph_nodes: Vec<_> = (0..subgraph.nodes.len()).map(|_| graph.add_node(())).collect();

		for edge_spec in &subgraph.edges {
			let src_idx = node_index[&edge_spec.src.0];
			let dst_idx = node_index[&edge_spec.dst.0];
			graph.add_edge(graph_nodes[src_idx], graph_nodes[dst_idx], ());

			let edge = Arc::new(
				Edge::new(
					edge_spec.src.clone(),
					edge_spec.dst.clone(),
					edge_spec.options.capacity,
					edge_spec.options.policy.clone(),
				)
				.with_control_bypass(edge_spec.options.control_bypass),
			);

			outputs[src_idx].insert(edge_spec.src.1.clone(), Arc::clone(&edge));
			inputs[dst_idx].push((edge_spec.dst.1.clone(), edge));
		}

		// Keep each node's input ports in declaration order, not edge
		// registration order, so per-port FIFO dispatch is deterministic.
		for (idx, node_spec) in subgraph.nodes.iter().enumerate() {
			inputs[idx].sort_by_key(|(port, _)| {
				node_spec
					.ports
					.iter()
					.position(|p| p.name() == port)
					.unwrap_or(usize::MAX)
			});
		}

		let stop_order = match toposort(&graph, None) {
			Ok(order) => order.into_iter().rev().map(|ix| ix.index()).collect(),
			Err(_cycle) => (0..subgraph.nodes.len()).rev().collect(),
		};

		let tick_interval = Duration::from_millis(self.config.tick_interval_ms);
		let now = Instant::now();
		let nodes = subgraph
			.nodes
			.into_iter()
			.enumerate()
			.map(|(idx, spec)| NodeRuntime {
				name: spec.name,
				node: spec.node,
				state: NodeState::Init,
				inputs: std::mem::take(&mut inputs[idx]),
				outputs: std::mem::take(&mut outputs[idx]),
				tick_interval,
				next_tick: now,
				blocked_on: Vec::new(),
			})
			.collect();

		self.nodes = nodes;
		self.stop_order = stop_order;
		Ok(self)
	}

	/// A cloneable, thread-safe handle that can request shutdown from a
	/// different thread than the one running [`Self::run`].
	pub fn shutdown_handle(&self) -> ShutdownHandle {
		self.shutdown.clone()
	}

	/// Request shutdown. Thread-safe and idempotent (`spec.md` §6, §8 R2).
	pub fn shutdown(&self) {
		self.shutdown.shutdown();
	}

	fn start_all(&mut self) {
		for n in &mut self.nodes {
			let mut ctx = EmitContext::new(&n.name, &n.outputs, &self.obs);
			let result = n.node.on_start(&mut ctx);
			n.record_blocked(ctx.blocked);
			match result {
				Ok(()) => {
					n.state = NodeState::Running;
					self.obs.tracer.node_started(&n.name);
					self.obs.metrics.record_count("node.started", 1);
				}
				Err(err) => {
					self.obs
						.logger
						.log(meridian_util::LogLevel::Error, &format!("node `{}` on_start failed: {err}", n.name));
					n.state = NodeState::Stopping;
				}
			}
		}
	}

	fn stop_all(&mut self) {
		for &idx in &self.stop_order.clone() {
			let n = &mut self.nodes[idx];
			if n.state == NodeState::Stopped {
				continue;
			}
			let mut ctx = EmitContext::new(&n.name, &n.outputs, &self.obs);
			let _ = n.node.on_stop(&mut ctx);
			n.state = NodeState::Stopped;
			self.obs.tracer.node_stopped(&n.name);
			self.obs.metrics.record_count("node.stopped", 1);
		}
	}

	/// Recompute the runnable set and classify it into the three priority
	/// lanes (`spec.md` §4.6.1). Also clears `blocked_on` for nodes whose
	/// blocking edges have drained.
	fn classify(&mut self, now: Instant, shutting_down: bool) -> (Vec<usize>, Vec<usize>, Vec<usize>) {
		let mut control = Vec::new();
		let mut high = Vec::new();
		let mut normal = Vec::new();

		for (idx, n) in self.nodes.iter_mut().enumerate() {
			if !n.state.accepts_work() {
				continue;
			}
			if !n.blocked_on.is_empty() {
				if n.blocked_on.iter().any(|e| e.is_full()) {
					continue;
				}
				n.blocked_on.clear();
			}

			let has_control = n.has_pending_control();
			let has_data = n.has_pending_data();
			let tick_due = !shutting_down && now >= n.next_tick;

			if has_control {
				control.push(idx);
			} else if tick_due && !has_data {
				high.push(idx);
			} else if has_data {
				normal.push(idx);
			}
		}

		(control, high, normal)
	}

	fn dispatch_round(
		&mut self,
		control: Vec<usize>,
		high: Vec<usize>,
		normal: Vec<usize>,
		now: Instant,
		shutting_down: bool,
	) {
		let (ctl_weight, high_weight, norm_weight) = self.config.fairness_ratio;
		let max_batch = self.config.max_batch_per_node;
		let obs = self.obs.clone();

		for &idx in control.iter().take(ctl_weight as usize) {
			self.nodes[idx].dispatch(max_batch, &obs, false);
		}
		for &idx in high.iter().take(high_weight as usize) {
			let tick_due = !shutting_down && now >= self.nodes[idx].next_tick;
			self.nodes[idx].dispatch(max_batch, &obs, tick_due);
		}
		for &idx in normal.iter().take(norm_weight as usize) {
			self.nodes[idx].dispatch(max_batch, &obs, false);
		}
	}

	/// Drive the registered subgraph to completion (`spec.md` §4.6).
	///
	/// Returns once shutdown has fully drained (either requested explicitly
	/// via [`Self::shutdown`] or self-triggered by graph idleness) and every
	/// started node's `on_stop` has run exactly once. Returns
	/// [`SchedulerError::ShutdownTimeout`] if the drain phase exceeded
	/// `shutdown_timeout_s`; nodes are still forced to `Stopped` first.
	#[tracing::instrument(skip(self))]
	pub fn run(&mut self) -> Result<(), SchedulerError> {
		tracing::info!(nodes = self.nodes.len(), "scheduler run starting");
		self.start_all();

		let mut idle_since: Option<Instant> = None;
		let mut shutdown_requested_at: Option<Instant> = None;
		let mut draining_announced = false;

		loop {
			let now = Instant::now();

			if shutdown_requested_at.is_none() && self.shutdown.is_requested() {
				shutdown_requested_at = Some(now);
				self.obs.tracer.shutdown_transition(ShutdownPhase::Requested);
			}

			let shutting_down = shutdown_requested_at.is_some();
			let (control, high, normal) = self.classify(now, shutting_down);

			if control.is_empty() && high.is_empty() && normal.is_empty() {
				if shutdown_requested_at.is_some() {
					break;
				}
				match idle_since {
					None => idle_since = Some(now),
					Some(since) => {
						if now.duration_since(since).as_secs_f64() >= self.config.shutdown_timeout_s {
							shutdown_requested_at = Some(now);
							self.obs.tracer.shutdown_transition(ShutdownPhase::Requested);
						}
					}
				}
				std::thread::sleep(Duration::from_millis(self.config.idle_sleep_ms));
				continue;
			}
			idle_since = None;

			if shutting_down && !draining_announced {
				draining_announced = true;
				self.obs.tracer.shutdown_transition(ShutdownPhase::Draining);
			}

			let loop_start = Instant::now();
			self.dispatch_round(control, high, normal, now, shutting_down);
			let elapsed = loop_start.elapsed();
			self.obs.tracer.loop_latency(elapsed);
			self.obs.metrics.record_duration("scheduler.loop_latency", elapsed);

			if let Some(requested_at) = shutdown_requested_at {
				let waited = requested_at.elapsed();
				if waited.as_secs_f64() > self.config.shutdown_timeout_s {
					tracing::warn!(?waited, "shutdown drain timed out");
					self.stop_all();
					self.obs.tracer.shutdown_transition(ShutdownPhase::Stopped);
					return Err(SchedulerError::ShutdownTimeout(ShutdownTimeout { waited }));
				}
			}
		}

		self.stop_all();
		self.obs.tracer.shutdown_transition(ShutdownPhase::Stopped);
		tracing::info!("scheduler run stopped");
		Ok(())
	}
}
