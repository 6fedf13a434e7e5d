//! A `Coalesce` overflow policy and a sink node for the "sum while
//! backed up" scenario: an edge that merges queued values instead of
//! blocking or dropping them, feeding a node that keeps a running total.

use std::sync::{Arc, Mutex};

use meridian_core::{
	message::Message,
	node::{EmitContext, Node},
	NodeError,
};

/// A running count and sum, the merge result of one or more `i64` data
/// messages that arrived while an edge was at capacity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Aggregate {
	pub count: u64,
	pub sum: i64,
}

fn as_aggregate(msg: Message) -> Aggregate {
	match msg.into_payload::<Aggregate>() {
		Ok(agg) => agg,
		Err(msg) => match msg.into_payload::<i64>() {
			Ok(v) => Aggregate { count: 1, sum: v },
			Err(_) => Aggregate::default(),
		},
	}
}

/// A [`meridian_core::policy::OverflowPolicy::Coalesce`] merge function:
/// folds the queue's tail and an incoming message into a running
/// [`Aggregate`], accepting either a bare `i64` or an already-merged
/// `Aggregate` as either side.
pub fn sum_aggregates(tail: Message, new: Message) -> Message {
	let a = as_aggregate(tail);
	let b = as_aggregate(new);
	Message::data(Aggregate {
		count: a.count + b.count,
		sum: a.sum + b.sum,
	})
}

/// A sink that folds every message delivered on its `"in"` port into a
/// shared running [`Aggregate`], whether the message carries a bare
/// `i64` or one already merged by [`sum_aggregates`].
pub struct WindowAggregator {
	total: Arc<Mutex<Aggregate>>,
}

impl WindowAggregator {
	/// Build an aggregator and the shared handle used to read its running
	/// total.
	pub fn new() -> (Self, Arc<Mutex<Aggregate>>) {
		let total = Arc::new(Mutex::new(Aggregate::default()));
		(
			Self {
				total: Arc::clone(&total),
			},
			total,
		)
	}
}

impl Node for WindowAggregator {
	fn on_message(
		&mut self,
		_port: &str,
		msg: Message,
		_ctx: &mut EmitContext<'_>,
	) -> Result<(), NodeError> {
		let delta = as_aggregate(msg);
		let mut total = self.total.lock().expect("aggregate total poisoned");
		total.count += delta.count;
		total.sum += delta.sum;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn merges_two_bare_values() {
		let merged = sum_aggregates(Message::data(3i64), Message::data(4i64));
		assert_eq!(merged.into_payload::<Aggregate>().unwrap(), Aggregate { count: 2, sum: 7 });
	}

	#[test]
	fn merges_an_aggregate_with_a_bare_value() {
		let merged = sum_aggregates(
			Message::data(Aggregate { count: 2, sum: 7 }),
			Message::data(5i64),
		);
		assert_eq!(merged.into_payload::<Aggregate>().unwrap(), Aggregate { count: 3, sum: 12 });
	}
}
