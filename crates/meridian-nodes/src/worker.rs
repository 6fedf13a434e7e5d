//! A worker that obeys out-of-band control commands ahead of its regular
//! data traffic, exercising the control lane's scheduling priority
//! (`spec.md` §4.6.1, §8 "control preemption").

use meridian_core::{
	message::Message,
	node::{EmitContext, Node},
	NodeError,
};

/// A command delivered on a `ControlAwareWorker`'s `"control"` port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerCommand {
	/// Stop forwarding data until a [`Self::Resume`] arrives.
	Quiet,
	/// Resume forwarding data.
	Resume,
}

/// Forwards whatever arrives on `"data"` to `"out"`, except while quieted
/// by a [`WorkerCommand::Quiet`] on `"control"`. Because control messages
/// are scheduled ahead of data regardless of arrival order, a `Quiet`
/// queued behind a burst of data still takes effect before the next data
/// message is forwarded.
pub struct ControlAwareWorker {
	quieted: bool,
}

impl ControlAwareWorker {
	pub fn new() -> Self {
		Self { quieted: false }
	}

	/// Whether this worker is currently dropping data messages.
	pub fn is_quieted(&self) -> bool {
		self.quieted
	}
}

impl Default for ControlAwareWorker {
	fn default() -> Self {
		Self::new()
	}
}

impl Node for ControlAwareWorker {
	fn on_message(
		&mut self,
		port: &str,
		msg: Message,
		ctx: &mut EmitContext<'_>,
	) -> Result<(), NodeError> {
		if port == "control" {
			if let Ok(cmd) = msg.into_payload::<WorkerCommand>() {
				self.quieted = matches!(cmd, WorkerCommand::Quiet);
				tracing::debug!(quieted = self.quieted, "control command applied");
			}
			return Ok(());
		}

		if !self.quieted {
			ctx.emit("out", msg)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn starts_unquieted() {
		assert!(!ControlAwareWorker::new().is_quieted());
	}
}
