//! Messages: the values carried between nodes over edges.

use std::{
	any::Any,
	fmt::{self, Debug},
	time::SystemTime,
};

/// What kind of message this is. Determines scheduling priority (§4.6.1)
/// and, for [`MessageKind::Control`], whether an edge's overflow policy
/// is allowed to drop or merge it (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
	/// Ordinary payload data flowing through the graph.
	Data,
	/// A management command: mode changes, quiesce signals, and the like.
	Control,
	/// A structured error value produced by a node, routed like data.
	Error,
}

/// Metadata carried alongside a message's payload. Every field is optional;
/// producers set what's useful to them.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
	/// A producer-assigned sequence number, useful for detecting gaps or
	/// reordering downstream of a lossy edge.
	pub sequence: Option<u64>,
	/// An opaque trace identifier, for correlating a message across nodes.
	pub trace_id: Option<u64>,
	/// When this message was created.
	pub timestamp: Option<SystemTime>,
}

/// A value in flight between two ports.
///
/// Messages are immutable once constructed; the payload is an opaque,
/// type-erased value that the receiving node is expected to know how to
/// interpret (schema compatibility is checked advisorily at wiring time,
/// not enforced on every message — see [`crate::port::PortSpec`]).
pub struct Message {
	kind: MessageKind,
	payload: Box<dyn Any + Send>,
	metadata: Metadata,
}

impl Message {
	/// Build a new `Data` message.
	pub fn data<T: Send + 'static>(payload: T) -> Self {
		Self::with_metadata(MessageKind::Data, payload, Metadata::default())
	}

	/// Build a new `Control` message. Payloads are typically small command
	/// tokens (an enum, a string, a unit struct).
	pub fn control<T: Send + 'static>(payload: T) -> Self {
		Self::with_metadata(MessageKind::Control, payload, Metadata::default())
	}

	/// Build a new `Error` message carrying a structured error value.
	pub fn error<T: Send + 'static>(payload: T) -> Self {
		Self::with_metadata(MessageKind::Error, payload, Metadata::default())
	}

	/// Build a message of any kind with explicit metadata attached.
	pub fn with_metadata<T: Send + 'static>(kind: MessageKind, payload: T, metadata: Metadata) -> Self {
		Self {
			kind,
			payload: Box::new(payload),
			metadata,
		}
	}

	/// This message's kind.
	pub fn kind(&self) -> MessageKind {
		self.kind
	}

	/// This message's metadata.
	pub fn metadata(&self) -> &Metadata {
		&self.metadata
	}

	/// Attach (or replace) metadata, returning the message for chaining.
	pub fn set_metadata(mut self, metadata: Metadata) -> Self {
		self.metadata = metadata;
		self
	}

	/// Borrow the payload as `T`, if that's the type it was constructed with.
	pub fn payload_ref<T: 'static>(&self) -> Option<&T> {
		self.payload.downcast_ref::<T>()
	}

	/// Consume the message, taking ownership of its payload as `T`.
	///
	/// Returns the message back, boxed, if the downcast fails so nothing is
	/// lost.
	pub fn into_payload<T: 'static>(self) -> Result<T, Self> {
		let kind = self.kind;
		let metadata = self.metadata;
		match self.payload.downcast::<T>() {
			Ok(boxed) => Ok(*boxed),
			Err(payload) => Err(Self {
				kind,
				payload,
				metadata,
			}),
		}
	}
}

impl Debug for Message {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Message")
			.field("kind", &self.kind)
			.field("metadata", &self.metadata)
			.finish_non_exhaustive()
	}
}
