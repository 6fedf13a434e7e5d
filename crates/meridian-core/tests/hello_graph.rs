//! A ticking producer feeding a collecting sink: the simplest possible
//! graph, end to end through a real `Scheduler`.

mod support;

use std::time::Duration;

use meridian_core::{node::NodeSpec, port::PortSpec, subgraph::ConnectOptions, Scheduler, Subgraph};
use meridian_nodes::{Collector, Ticker};

#[test]
fn ticker_feeds_collector_in_order() {
	support::init_tracing();
	let (collector, sink) = Collector::<u64>::new();

	let mut graph = Subgraph::new();
	graph
		.add_node(NodeSpec::new("ticker", Ticker::new(5)).output(PortSpec::any("out")))
		.unwrap();
	graph
		.add_node(NodeSpec::new("collector", collector).input(PortSpec::any("in")))
		.unwrap();
	graph.connect(("ticker", "out"), ("collector", "in"), ConnectOptions::default());

	let scheduler = Scheduler::new(support::fast_config(), support::noop_obs())
		.register(graph)
		.unwrap();

	support::run_and_shutdown_after(scheduler, Duration::from_millis(100)).unwrap();

	assert_eq!(*sink.lock().unwrap(), vec![0, 1, 2, 3, 4]);
}
