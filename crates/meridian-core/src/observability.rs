//! Pluggable observability taps (`spec.md` §6, §9 "global observability
//! singletons").
//!
//! The source repo this was distilled from calls module-level
//! `get_logger()`/`get_metrics()` singletons. Here the three taps are
//! explicit collaborators passed to [`crate::scheduler::Scheduler::new`],
//! with a no-op default so embedding Meridian without observability stays
//! ergonomic. These are deliberately separate from this crate's own
//! internal `tracing` spans: the taps are the *contract* `spec.md`
//! promises callers, not an implementation detail.

use std::{sync::Arc, time::Duration};

use meridian_util::LogLevel;

use crate::{edge::PutResult, labels::NodeName};

/// A point in the shutdown state machine (`spec.md` §4.6.4), reported to
/// [`Tracer::shutdown_transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownPhase {
	Requested,
	Draining,
	Stopped,
}

/// A text logging sink.
pub trait Logger: Send + Sync {
	fn log(&self, level: LogLevel, message: &str);
}

/// A counters/gauges sink. Names are dotted paths, e.g. `"edge.put.accepted"`.
pub trait MetricsRecorder: Send + Sync {
	fn record_count(&self, name: &str, value: u64);
	fn record_duration(&self, name: &str, duration: Duration);
}

/// Structured event sink for node lifecycle, edge puts and scheduler loop
/// events. Coarser-grained than [`Logger`]; meant for a real tracing
/// backend rather than free text.
pub trait Tracer: Send + Sync {
	fn node_started(&self, node: &NodeName);
	fn node_stopped(&self, node: &NodeName);
	fn message_enqueued(&self, node: &NodeName);
	fn message_dequeued(&self, node: &NodeName);
	fn edge_put(&self, source: &NodeName, dest: &NodeName, result: PutResult);
	fn loop_latency(&self, duration: Duration);
	fn shutdown_transition(&self, phase: ShutdownPhase);
}

struct NoopLogger;
impl Logger for NoopLogger {
	fn log(&self, _level: LogLevel, _message: &str) {}
}

struct NoopMetrics;
impl MetricsRecorder for NoopMetrics {
	fn record_count(&self, _name: &str, _value: u64) {}
	fn record_duration(&self, _name: &str, _duration: Duration) {}
}

struct NoopTracer;
impl Tracer for NoopTracer {
	fn node_started(&self, _node: &NodeName) {}
	fn node_stopped(&self, _node: &NodeName) {}
	fn message_enqueued(&self, _node: &NodeName) {}
	fn message_dequeued(&self, _node: &NodeName) {}
	fn edge_put(&self, _source: &NodeName, _dest: &NodeName, _result: PutResult) {}
	fn loop_latency(&self, _duration: Duration) {}
	fn shutdown_transition(&self, _phase: ShutdownPhase) {}
}

/// The logger/metrics/tracer trio a [`crate::scheduler::Scheduler`] is
/// constructed with.
#[derive(Clone)]
pub struct Observability {
	pub logger: Arc<dyn Logger>,
	pub metrics: Arc<dyn MetricsRecorder>,
	pub tracer: Arc<dyn Tracer>,
}

impl Observability {
	/// A no-op implementation of all three taps. The default for
	/// `Scheduler::new` when observability isn't wired up.
	pub fn noop() -> Self {
		Self {
			logger: Arc::new(NoopLogger),
			metrics: Arc::new(NoopMetrics),
			tracer: Arc::new(NoopTracer),
		}
	}
}

impl Default for Observability {
	fn default() -> Self {
		Self::noop()
	}
}
