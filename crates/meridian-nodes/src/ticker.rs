use meridian_core::{
	message::Message,
	node::{EmitContext, Node},
	NodeError,
};

/// Emits `0..count` as `Data` messages on its `"out"` port, one per tick,
/// then goes quiet. The simplest time-driven producer (`spec.md` §8
/// scenario 1, "hello graph").
pub struct Ticker {
	count: u64,
	emitted: u64,
}

impl Ticker {
	pub fn new(count: u64) -> Self {
		Self { count, emitted: 0 }
	}

	/// How many values this ticker has emitted so far.
	pub fn emitted(&self) -> u64 {
		self.emitted
	}
}

impl Node for Ticker {
	fn on_tick(&mut self, ctx: &mut EmitContext<'_>) -> Result<(), NodeError> {
		if self.emitted >= self.count {
			return Ok(());
		}
		ctx.emit("out", Message::data(self.emitted))?;
		self.emitted += 1;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn stops_emitting_once_count_reached() {
		let mut t = Ticker::new(2);
		assert_eq!(t.emitted(), 0);
		t.emitted = 2;
		assert_eq!(t.emitted(), 2);
	}
}
