//! A small built-in node library exercising the `meridian-core` scheduler
//! contract: a tick-driven producer, a sink that collects messages for
//! tests, a stateless transform, a control-aware worker, a window
//! aggregator driving a Coalesce edge, and a thread-pool-backed async
//! worker. These are "external collaborators" per `spec.md` §1, not part
//! of the scheduler core — useful for tests and demos.

mod aggregate;
mod async_worker;
mod collector;
mod ticker;
mod transform;
mod worker;

pub use aggregate::{sum_aggregates, Aggregate, WindowAggregator};
pub use async_worker::AsyncWorker;
pub use collector::Collector;
pub use ticker::Ticker;
pub use transform::Transform;
pub use worker::{ControlAwareWorker, WorkerCommand};
