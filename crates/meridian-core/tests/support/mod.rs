//! Shared helpers for the scenario tests in this directory.

use std::{sync::Once, thread, time::Duration};

use meridian_core::{
	message::{Message, MessageKind},
	node::{EmitContext, Node},
	NodeError, Observability, Scheduler, SchedulerConfig, SchedulerError,
};

static TRACING: Once = Once::new();

/// Install a `tracing_subscriber` once per test binary, so a failing
/// scenario's scheduler spans and events show up in `cargo test -- --nocapture`
/// instead of going nowhere.
pub fn init_tracing() {
	TRACING.call_once(|| {
		let _ = tracing_subscriber::fmt().with_test_writer().try_init();
	});
}

/// A config with a short tick interval so tick-driven tests don't spend
/// real wall-clock time waiting on the default 50ms period.
pub fn fast_config() -> SchedulerConfig {
	SchedulerConfig {
		tick_interval_ms: 1,
		idle_sleep_ms: 1,
		..SchedulerConfig::default()
	}
}

/// Run `scheduler` to completion, requesting shutdown from a background
/// thread after `delay`. Every scenario here either finishes its work
/// synchronously in `on_start` or within a handful of 1ms ticks, so a
/// generous fixed delay is enough to let it settle before shutdown cuts
/// the loop off.
pub fn run_and_shutdown_after(mut scheduler: Scheduler, delay: Duration) -> Result<(), SchedulerError> {
	let handle = scheduler.shutdown_handle();
	thread::spawn(move || {
		thread::sleep(delay);
		handle.shutdown();
	});
	scheduler.run()
}

pub fn noop_obs() -> Observability {
	Observability::noop()
}
