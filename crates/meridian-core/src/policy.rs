//! Overflow policies: what an edge does when a `try_put` would exceed
//! capacity (`spec.md` §4.3).

use std::{fmt, sync::Arc};

use crate::message::Message;

/// A pure, deterministic merge function used by [`OverflowPolicy::Coalesce`].
/// Takes the queue's current tail and the incoming message, returns the
/// message that replaces the tail.
pub type CoalesceFn = Arc<dyn Fn(Message, Message) -> Message + Send + Sync>;

/// The rule an edge applies when a put would exceed its capacity. Fixed per
/// edge at wiring time.
#[derive(Clone)]
pub enum OverflowPolicy {
	/// Lossless backpressure: `try_put` returns [`crate::edge::PutResult::Blocked`]
	/// without enqueuing; the producing node is held off until the edge drains.
	Block,
	/// Discard the new message; the queue is unchanged.
	Drop,
	/// Discard the oldest queued message, enqueue the new one in its place.
	Latest,
	/// Pop the tail, merge it with the new message via `fn`, enqueue the result.
	Coalesce(CoalesceFn),
}

impl OverflowPolicy {
	/// Convenience constructor for [`Self::Coalesce`].
	pub fn coalesce(f: impl Fn(Message, Message) -> Message + Send + Sync + 'static) -> Self {
		Self::Coalesce(Arc::new(f))
	}
}

impl fmt::Debug for OverflowPolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Block => f.write_str("Block"),
			Self::Drop => f.write_str("Drop"),
			Self::Latest => f.write_str("Latest"),
			Self::Coalesce(_) => f.write_str("Coalesce(..)"),
		}
	}
}

impl Default for OverflowPolicy {
	/// `connect`'s documented default (`spec.md` §6).
	fn default() -> Self {
		Self::Block
	}
}
