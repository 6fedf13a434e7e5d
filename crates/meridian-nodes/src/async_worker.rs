//! A node that offloads blocking work to a dedicated OS thread instead of
//! running it inline on the scheduler's loop (`spec.md` Non-goals: the
//! scheduler itself never blocks on I/O, but nothing stops a node from
//! doing so on its own thread and reporting back on a later tick).

use std::thread;

use crossbeam::channel::{unbounded, Receiver, Sender};

use meridian_core::{
	message::Message,
	node::{EmitContext, Node},
	NodeError,
};

/// Runs `f` on a dedicated worker thread. Messages arriving on `"in"` are
/// handed off over an unbounded channel and never block the scheduler
/// loop; completed results are drained and emitted on `"out"` on every
/// tick.
///
/// The worker thread exits on its own once the channel's sending half is
/// dropped, which happens when this node is dropped.
pub struct AsyncWorker<I, O> {
	tx: Sender<I>,
	rx: Receiver<O>,
	_handle: thread::JoinHandle<()>,
}

impl<I, O> AsyncWorker<I, O>
where
	I: Send + 'static,
	O: Send + 'static,
{
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(I) -> O + Send + 'static,
	{
		let (tx, worker_rx) = unbounded::<I>();
		let (worker_tx, rx) = unbounded::<O>();
		let handle = thread::spawn(move || {
			while let Ok(item) = worker_rx.recv() {
				if worker_tx.send(f(item)).is_err() {
					break;
				}
			}
		});
		Self {
			tx,
			rx,
			_handle: handle,
		}
	}
}

impl<I, O> Node for AsyncWorker<I, O>
where
	I: Send + 'static,
	O: Send + 'static,
{
	fn on_message(
		&mut self,
		_port: &str,
		msg: Message,
		_ctx: &mut EmitContext<'_>,
	) -> Result<(), NodeError> {
		if let Ok(payload) = msg.into_payload::<I>() {
			// Unbounded: send only fails if the worker thread has already
			// exited, which we treat as nothing left to do.
			let _ = self.tx.send(payload);
		}
		Ok(())
	}

	fn on_tick(&mut self, ctx: &mut EmitContext<'_>) -> Result<(), NodeError> {
		while let Ok(result) = self.rx.try_recv() {
			ctx.emit("out", Message::data(result))?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;

	#[test]
	fn worker_thread_computes_off_the_caller() {
		let worker = AsyncWorker::<i32, i32>::new(|x| x * 2);
		worker.tx.send(21).unwrap();
		let result = worker.rx.recv_timeout(Duration::from_secs(1)).unwrap();
		assert_eq!(result, 42);
	}
}
