//! `shutdown()` called the instant a producer finishes its burst must
//! still drain every already-queued message before `run` returns, and
//! `on_stop` must fire exactly once per node (`spec.md` §8 scenario 6,
//! §4.6.4).

mod support;

use std::{
	sync::atomic::{AtomicU64, AtomicUsize, Ordering},
	sync::Arc,
	thread,
	time::Duration,
};

use meridian_core::{
	message::Message,
	node::{EmitContext, Node, NodeSpec},
	policy::OverflowPolicy,
	port::PortSpec,
	subgraph::ConnectOptions,
	NodeError, Observability, Scheduler, Subgraph,
};

const COUNT: u64 = 20;

struct CountedProducer {
	emitted: u64,
	published: Arc<AtomicU64>,
	stops: Arc<AtomicUsize>,
}

impl Node for CountedProducer {
	fn on_tick(&mut self, ctx: &mut EmitContext<'_>) -> Result<(), NodeError> {
		if self.emitted >= COUNT {
			return Ok(());
		}
		ctx.emit("out", Message::data(self.emitted))?;
		self.emitted += 1;
		self.published.store(self.emitted, Ordering::SeqCst);
		Ok(())
	}

	fn on_stop(&mut self, _ctx: &mut EmitContext<'_>) -> Result<(), NodeError> {
		self.stops.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}
}

struct SlowSink {
	delay: Duration,
	sink: Arc<std::sync::Mutex<Vec<u64>>>,
	stops: Arc<AtomicUsize>,
}

impl Node for SlowSink {
	fn on_message(&mut self, _port: &str, msg: Message, _ctx: &mut EmitContext<'_>) -> Result<(), NodeError> {
		thread::sleep(self.delay);
		if let Ok(v) = msg.into_payload::<u64>() {
			self.sink.lock().unwrap().push(v);
		}
		Ok(())
	}

	fn on_stop(&mut self, _ctx: &mut EmitContext<'_>) -> Result<(), NodeError> {
		self.stops.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}
}

#[test]
fn shutdown_requested_right_after_the_burst_still_drains_everything() {
	let published = Arc::new(AtomicU64::new(0));
	let stops = Arc::new(AtomicUsize::new(0));
	let sink = Arc::new(std::sync::Mutex::new(Vec::new()));

	let mut graph = Subgraph::new();
	graph
		.add_node(
			NodeSpec::new(
				"producer",
				CountedProducer {
					emitted: 0,
					published: Arc::clone(&published),
					stops: Arc::clone(&stops),
				},
			)
			.output(PortSpec::any("out")),
		)
		.unwrap();
	graph
		.add_node(
			NodeSpec::new(
				"consumer",
				SlowSink {
					delay: Duration::from_millis(10),
					sink: Arc::clone(&sink),
					stops: Arc::clone(&stops),
				},
			)
			.input(PortSpec::any("in")),
		)
		.unwrap();
	graph.connect(
		("producer", "out"),
		("consumer", "in"),
		ConnectOptions::default().capacity(8).policy(OverflowPolicy::Block),
	);

	let mut config = support::fast_config();
	config.shutdown_timeout_s = 1.0;
	let mut scheduler = Scheduler::new(config, Observability::noop()).register(graph).unwrap();
	let handle = scheduler.shutdown_handle();

	let watcher_published = Arc::clone(&published);
	thread::spawn(move || {
		while watcher_published.load(Ordering::SeqCst) < COUNT {
			thread::sleep(Duration::from_millis(1));
		}
		handle.shutdown();
	});

	scheduler.run().expect("drain must finish inside shutdown_timeout_s");

	let delivered = sink.lock().unwrap();
	assert_eq!(*delivered, (0..COUNT).collect::<Vec<_>>(), "every queued message must be drained");
	assert_eq!(stops.load(Ordering::SeqCst), 2, "on_stop must fire exactly once per node");
}
