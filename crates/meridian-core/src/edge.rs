//! Bounded single-producer, single-consumer FIFO queues connecting one
//! output port to one input port (`spec.md` §4.2).

use std::{collections::VecDeque, sync::Mutex};

use crate::{
	labels::{NodeName, PortName},
	message::{Message, MessageKind},
	policy::OverflowPolicy,
};

/// The outcome of a [`Edge::try_put`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutResult {
	/// The message was enqueued as-is.
	Accepted,
	/// The edge was full and its policy is [`OverflowPolicy::Block`]; nothing
	/// was enqueued. The caller should retry later.
	Blocked,
	/// The edge was full and its policy is [`OverflowPolicy::Drop`]; the
	/// message was discarded.
	Dropped,
	/// The edge was full and its policy is [`OverflowPolicy::Latest`]; the
	/// oldest message was evicted to make room.
	Replaced,
	/// The edge was full and its policy is [`OverflowPolicy::Coalesce`]; the
	/// tail was merged with the new message.
	Coalesced,
}

impl PutResult {
	/// `true` if the message (or its merge) is now sitting in the queue.
	pub fn is_enqueued(self) -> bool {
		!matches!(self, Self::Blocked | Self::Dropped)
	}
}

/// One end of an edge: `(node, port)`.
pub type Endpoint = (NodeName, PortName);

/// A bounded FIFO linking one output port to one input port.
///
/// Invariants upheld by this type: `0 <= depth() <= capacity()` always
/// (`spec.md` §8 P1); messages are observed by the consumer in the exact
/// order they were accepted, replaced, or coalesced in (`spec.md` §8 P2).
pub struct Edge {
	source: Endpoint,
	dest: Endpoint,
	capacity: usize,
	policy: OverflowPolicy,
	/// If true, a `Control`-kind message at capacity is handled as though
	/// the policy were `Block` rather than the edge's declared lossy policy
	/// (`spec.md` §4.3). Off by default: control obeys the same policy as
	/// data unless an edge opts in.
	control_bypass: bool,
	queue: Mutex<VecDeque<Message>>,
}

impl Edge {
	pub fn new(source: Endpoint, dest: Endpoint, capacity: usize, policy: OverflowPolicy) -> Self {
		assert!(capacity >= 1, "edge capacity must be at least 1");
		Self {
			source,
			dest,
			capacity,
			policy,
			control_bypass: false,
			queue: Mutex::new(VecDeque::with_capacity(capacity)),
		}
	}

	/// Opt this edge's Control messages out of Drop/Latest/Coalesce loss,
	/// treating them as Block instead while the queue is full.
	pub fn with_control_bypass(mut self, bypass: bool) -> Self {
		self.control_bypass = bypass;
		self
	}

	pub fn source(&self) -> &Endpoint {
		&self.source
	}

	pub fn dest(&self) -> &Endpoint {
		&self.dest
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn depth(&self) -> usize {
		self.queue.lock().expect("edge queue poisoned").len()
	}

	pub fn is_empty(&self) -> bool {
		self.depth() == 0
	}

	pub fn is_full(&self) -> bool {
		self.depth() >= self.capacity
	}

	/// The kind of the head message, without removing it. Used by the
	/// scheduler to classify a node into the control/high/normal lane
	/// (`spec.md` §4.6.1) without consuming the message.
	pub fn peek_kind(&self) -> Option<MessageKind> {
		self.queue.lock().expect("edge queue poisoned").front().map(Message::kind)
	}

	/// Enqueue a message, applying the overflow policy if the edge is full.
	pub fn try_put(&self, msg: Message) -> PutResult {
		let mut q = self.queue.lock().expect("edge queue poisoned");
		if q.len() < self.capacity {
			q.push_back(msg);
			return PutResult::Accepted;
		}

		let effective_policy = if self.control_bypass && msg.kind() == MessageKind::Control {
			&OverflowPolicy::Block
		} else {
			&self.policy
		};

		match effective_policy {
			OverflowPolicy::Block => PutResult::Blocked,
			OverflowPolicy::Drop => PutResult::Dropped,
			OverflowPolicy::Latest => {
				q.pop_front();
				q.push_back(msg);
				PutResult::Replaced
			}
			OverflowPolicy::Coalesce(merge) => {
				let tail = q.pop_back().expect("full edge must have a tail");
				q.push_back(merge(tail, msg));
				PutResult::Coalesced
			}
		}
	}

	/// Remove and return the head message, if any.
	pub fn try_get(&self) -> Option<Message> {
		self.queue.lock().expect("edge queue poisoned").pop_front()
	}
}
