//! The core's error taxonomy (`spec.md` §7). Kinds, not type hierarchies:
//! each boundary gets one flat enum with a manual `Display`/`Error` impl,
//! no `thiserror` macro.

use std::{error::Error, fmt};

use crate::{
	labels::{NodeName, PortName},
	port::PortDirection,
};

/// Detected at [`crate::subgraph::Subgraph::validate`] time. Fatal to
/// registration; never raised from a running scheduler.
#[derive(Debug)]
pub enum WiringError {
	/// `connect`/`add_node` referenced a node that was never added.
	UnknownNode { node: NodeName },
	/// `connect` referenced a port the named node never declared.
	UnknownPort { node: NodeName, port: PortName },
	/// `connect` named a port on the wrong side: e.g. an `Output` port used
	/// as a destination, or an `Input` port used as a source.
	WrongDirection {
		node: NodeName,
		port: PortName,
		expected: PortDirection,
	},
	/// An input port already has an incoming edge; at most one is allowed.
	DuplicateInputEdge { node: NodeName, port: PortName },
	/// The source and destination schema tags are neither equal nor `"any"`.
	IncompatibleSchema {
		source: (NodeName, PortName),
		dest: (NodeName, PortName),
	},
	/// Two nodes were added under the same name.
	DuplicateNodeName { node: NodeName },
}

impl fmt::Display for WiringError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::UnknownNode { node } => write!(f, "no node named `{node}`"),
			Self::UnknownPort { node, port } => {
				write!(f, "node `{node}` has no port named `{port}`")
			}
			Self::WrongDirection { node, port, expected } => {
				write!(f, "port `{node}.{port}` is not a declared {expected} port")
			}
			Self::DuplicateInputEdge { node, port } => {
				write!(f, "input port `{node}.{port}` already has an incoming edge")
			}
			Self::IncompatibleSchema {
				source: (sn, sp),
				dest: (dn, dp),
			} => write!(
				f,
				"schema mismatch connecting `{sn}.{sp}` to `{dn}.{dp}`"
			),
			Self::DuplicateNodeName { node } => write!(f, "duplicate node name `{node}`"),
		}
	}
}

impl Error for WiringError {}

/// Returned by [`crate::node::EmitContext::emit`] when a node emits to a
/// port with no outgoing edge bound to it — whether because the port was
/// never connected, or because it names an input port rather than an
/// output (`spec.md` §4.4, §7).
#[derive(Debug)]
pub struct EmitError {
	pub node: NodeName,
	pub port: PortName,
}

impl fmt::Display for EmitError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "node `{}` has no outgoing edge on port `{}`", self.node, self.port)
	}
}

impl Error for EmitError {}

/// An uncaught failure inside a node callback (`spec.md` §7). The scheduler
/// catches this, records it via the observability taps, and transitions the
/// offending node to `Stopping`. Other nodes continue.
#[derive(Debug)]
pub enum NodeError {
	/// An I/O failure, for nodes that talk to the outside world.
	Io(std::io::Error),
	/// Anything else; boxed so node authors aren't forced into this crate's
	/// error type.
	Other(Box<dyn Error + Send + Sync>),
}

impl fmt::Display for NodeError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Io(e) => write!(f, "io error: {e}"),
			Self::Other(e) => write!(f, "{e}"),
		}
	}
}

impl Error for NodeError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			Self::Io(e) => Some(e),
			Self::Other(e) => Some(e.as_ref()),
		}
	}
}

impl From<std::io::Error> for NodeError {
	fn from(e: std::io::Error) -> Self {
		Self::Io(e)
	}
}

impl From<EmitError> for NodeError {
	fn from(e: EmitError) -> Self {
		Self::Other(Box::new(e))
	}
}

/// Returned from [`crate::scheduler::Scheduler::run`] if the shutdown drain
/// could not complete within `shutdown_timeout_s`. All nodes are still
/// forced to `Stopped` before this is surfaced.
#[derive(Debug)]
pub struct ShutdownTimeout {
	pub waited: std::time::Duration,
}

impl fmt::Display for ShutdownTimeout {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"shutdown drain did not finish within {:?}",
			self.waited
		)
	}
}

impl Error for ShutdownTimeout {}

/// The error type returned by [`crate::scheduler::Scheduler::run`].
#[derive(Debug)]
pub enum SchedulerError {
	/// Shutdown was requested but the drain phase timed out.
	ShutdownTimeout(ShutdownTimeout),
}

impl fmt::Display for SchedulerError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::ShutdownTimeout(e) => write!(f, "{e}"),
		}
	}
}

impl Error for SchedulerError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			Self::ShutdownTimeout(e) => Some(e),
		}
	}
}
