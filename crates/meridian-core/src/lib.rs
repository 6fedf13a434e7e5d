//! Meridian's scheduler/edge core: the graph-based dataflow runtime
//! described by `spec.md` §4. Everything else in the Meridian workspace —
//! node libraries, demo graphs, the CLI — is an external collaborator
//! built on top of the public surface this crate exposes.

pub mod edge;
pub mod error;
pub mod labels;
pub mod message;
pub mod node;
pub mod observability;
pub mod policy;
pub mod port;
pub mod scheduler;
pub mod subgraph;

pub use edge::{Edge, PutResult};
pub use error::{EmitError, NodeError, SchedulerError, ShutdownTimeout, WiringError};
pub use labels::{NodeName, PortName};
pub use message::{Message, MessageKind, Metadata};
pub use node::{EmitContext, Node, NodeSpec, NodeState};
pub use observability::{Logger, MetricsRecorder, Observability, ShutdownPhase, Tracer};
pub use policy::OverflowPolicy;
pub use port::{Port, PortDirection, PortSpec, SchemaTag};
pub use scheduler::{Scheduler, SchedulerConfig, ShutdownHandle};
pub use subgraph::{ConnectOptions, Subgraph};
