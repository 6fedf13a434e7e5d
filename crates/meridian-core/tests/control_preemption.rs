//! A fast data producer paired with a control injector that quiets a
//! worker mid-stream: once the `Quiet` command is received, no further
//! data reaches the node downstream of the worker (`spec.md` §8
//! scenario 5, §4.6.1 "CONTROL preference").

mod support;

use std::{
	sync::atomic::{AtomicU64, Ordering},
	sync::Arc,
	time::Duration,
};

use meridian_core::{
	message::Message,
	node::{EmitContext, Node, NodeSpec},
	port::PortSpec,
	subgraph::ConnectOptions,
	NodeError, Scheduler, Subgraph,
};
use meridian_nodes::{Collector, ControlAwareWorker, WorkerCommand};

const TOTAL: u64 = 1000;
const QUIET_AFTER: u64 = 30;

/// Emits `0..TOTAL` on every tick, publishing how many it has emitted so
/// far so a sibling node can time a control message off real progress
/// instead of guessing at tick counts.
struct TrackedProducer {
	emitted: u64,
	published: Arc<AtomicU64>,
}

impl Node for TrackedProducer {
	fn on_tick(&mut self, ctx: &mut EmitContext<'_>) -> Result<(), NodeError> {
		if self.emitted >= TOTAL {
			return Ok(());
		}
		ctx.emit("out", Message::data(self.emitted))?;
		self.emitted += 1;
		self.published.store(self.emitted, Ordering::SeqCst);
		Ok(())
	}
}

/// Emits exactly one `Quiet` command once the producer has published at
/// least `QUIET_AFTER` values, then goes silent.
struct QuietAfter {
	threshold: Arc<AtomicU64>,
	sent: bool,
}

impl Node for QuietAfter {
	fn on_tick(&mut self, ctx: &mut EmitContext<'_>) -> Result<(), NodeError> {
		if !self.sent && self.threshold.load(Ordering::SeqCst) >= QUIET_AFTER {
			ctx.emit("out", Message::control(WorkerCommand::Quiet))?;
			self.sent = true;
		}
		Ok(())
	}
}

#[test]
fn no_data_is_forwarded_once_quiet_is_received() {
	support::init_tracing();
	let published = Arc::new(AtomicU64::new(0));
	let (collector, sink) = Collector::<u64>::new();

	let mut graph = Subgraph::new();
	graph
		.add_node(
			NodeSpec::new(
				"producer",
				TrackedProducer {
					emitted: 0,
					published: Arc::clone(&published),
				},
			)
			.output(PortSpec::any("out")),
		)
		.unwrap();
	graph
		.add_node(
			NodeSpec::new(
				"injector",
				QuietAfter {
					threshold: Arc::clone(&published),
					sent: false,
				},
			)
			.output(PortSpec::any("out")),
		)
		.unwrap();
	graph
		.add_node(
			NodeSpec::new("worker", ControlAwareWorker::new())
				.input(PortSpec::any("data"))
				.input(PortSpec::any("control"))
				.output(PortSpec::any("out")),
		)
		.unwrap();
	graph
		.add_node(NodeSpec::new("collector", collector).input(PortSpec::any("in")))
		.unwrap();

	graph.connect(("producer", "out"), ("worker", "data"), ConnectOptions::default().capacity(2048));
	graph.connect(("injector", "out"), ("worker", "control"), ConnectOptions::default());
	graph.connect(("worker", "out"), ("collector", "in"), ConnectOptions::default().capacity(2048));

	let scheduler = Scheduler::new(support::fast_config(), support::noop_obs())
		.register(graph)
		.unwrap();

	support::run_and_shutdown_after(scheduler, Duration::from_millis(1200)).unwrap();

	let delivered = sink.lock().unwrap();
	assert!(
		delivered.len() < TOTAL as usize,
		"quieting mid-stream must suppress at least some of the {TOTAL} messages"
	);
	let expected: Vec<u64> = (0..delivered.len() as u64).collect();
	assert_eq!(
		*delivered, expected,
		"once quieted, no further data may reach the collector: {delivered:?}"
	);
}
