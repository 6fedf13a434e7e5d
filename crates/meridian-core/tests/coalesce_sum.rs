//! A sensor bursting 1000 `(count=1, sum=v)` aggregates into a capacity-4
//! `Coalesce` edge that sums both fields on merge: no aggregate unit is
//! ever lost, only batched together (`spec.md` §8 scenario 4).

mod support;

use std::time::Duration;

use meridian_core::{
	message::Message,
	node::{EmitContext, Node, NodeSpec},
	policy::OverflowPolicy,
	port::PortSpec,
	subgraph::ConnectOptions,
	NodeError, Scheduler, Subgraph,
};
use meridian_nodes::{sum_aggregates, Aggregate, WindowAggregator};

const SAMPLES: i64 = 1000;

/// Emits `SAMPLES` aggregates of `(count=1, sum=i)` in one burst, all from
/// `on_start`, so the downstream Coalesce edge sees real backpressure
/// rather than ticker-paced trickle.
struct BurstySensor;

impl Node for BurstySensor {
	fn on_start(&mut self, ctx: &mut EmitContext<'_>) -> Result<(), NodeError> {
		for v in 0..SAMPLES {
			ctx.emit("out", Message::data(Aggregate { count: 1, sum: v }))?;
		}
		Ok(())
	}
}

#[test]
fn coalesced_totals_match_the_uncoalesced_sum() {
	support::init_tracing();
	let (aggregator, total) = WindowAggregator::new();

	let mut graph = Subgraph::new();
	graph
		.add_node(NodeSpec::new("sensor", BurstySensor).output(PortSpec::any("out")))
		.unwrap();
	graph
		.add_node(NodeSpec::new("aggregator", aggregator).input(PortSpec::any("in")))
		.unwrap();
	graph.connect(
		("sensor", "out"),
		("aggregator", "in"),
		ConnectOptions::default()
			.capacity(4)
			.policy(OverflowPolicy::coalesce(sum_aggregates)),
	);

	let scheduler = Scheduler::new(support::fast_config(), support::noop_obs())
		.register(graph)
		.unwrap();

	support::run_and_shutdown_after(scheduler, Duration::from_millis(200)).unwrap();

	let result = *total.lock().unwrap();
	let expected_sum: i64 = (0..SAMPLES).sum();
	assert_eq!(result.count, SAMPLES as u64, "every unit must be accounted for");
	assert_eq!(result.sum, expected_sum, "coalescing must not change the total");
}
