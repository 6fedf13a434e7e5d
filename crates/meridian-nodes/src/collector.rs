//! A sink node that appends every message it receives to a shared `Vec`,
//! for use in tests and demos that need to observe what reached the end
//! of a graph.

use std::{
	sync::{Arc, Mutex},
	thread,
	time::Duration,
};

use meridian_core::{
	message::Message,
	node::{EmitContext, Node},
	NodeError,
};

/// Collects `T`-typed payloads delivered on its `"in"` port into a shared
/// `Vec`, in delivery order. Payloads that don't downcast to `T` are
/// silently skipped rather than treated as an error, since a `Collector`
/// is a test/demo fixture, not a production sink.
pub struct Collector<T> {
	sink: Arc<Mutex<Vec<T>>>,
	delay: Option<Duration>,
}

impl<T: Send + 'static> Collector<T> {
	/// Build a collector and the shared `Vec` handle used to inspect what it
	/// has received so far.
	pub fn new() -> (Self, Arc<Mutex<Vec<T>>>) {
		let sink = Arc::new(Mutex::new(Vec::new()));
		(
			Self {
				sink: Arc::clone(&sink),
				delay: None,
			},
			sink,
		)
	}

	/// Like [`Self::new`], but sleeps `delay` before recording each message.
	/// Used to simulate a slow consumer for backpressure and overflow-policy
	/// scenarios.
	pub fn with_delay(delay: Duration) -> (Self, Arc<Mutex<Vec<T>>>) {
		let (mut collector, sink) = Self::new();
		collector.delay = Some(delay);
		(collector, sink)
	}
}

impl<T: Send + 'static> Node for Collector<T> {
	fn on_message(
		&mut self,
		_port: &str,
		msg: Message,
		_ctx: &mut EmitContext<'_>,
	) -> Result<(), NodeError> {
		if let Some(delay) = self.delay {
			thread::sleep(delay);
		}
		if let Ok(value) = msg.into_payload::<T>() {
			self.sink.lock().expect("collector sink poisoned").push(value);
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn new_sink_starts_empty() {
		let (_collector, sink) = Collector::<i32>::new();
		assert!(sink.lock().unwrap().is_empty());
	}

	#[test]
	fn shared_sink_handle_observes_external_writes() {
		let (_collector, sink) = Collector::<i32>::new();
		sink.lock().unwrap().push(7);
		assert_eq!(*sink.lock().unwrap(), vec![7]);
	}
}
