//! A stateless one-in-one-out node: apply a function to each message and
//! forward the result, or drop it if the function returns `None`.

use meridian_core::{
	message::Message,
	node::{EmitContext, Node},
	NodeError,
};

/// Applies `f` to the payload arriving on `"in"` and emits the result on
/// `"out"`. `f` returning `None` drops the message instead of forwarding
/// it, so `Transform` doubles as a filter.
pub struct Transform<I, O, F>
where
	F: FnMut(I) -> Option<O> + Send,
{
	f: F,
	_marker: std::marker::PhantomData<fn(I) -> O>,
}

impl<I, O, F> Transform<I, O, F>
where
	F: FnMut(I) -> Option<O> + Send,
{
	pub fn new(f: F) -> Self {
		Self {
			f,
			_marker: std::marker::PhantomData,
		}
	}
}

impl<I, O, F> Node for Transform<I, O, F>
where
	I: Send + 'static,
	O: Send + 'static,
	F: FnMut(I) -> Option<O> + Send,
{
	fn on_message(
		&mut self,
		_port: &str,
		msg: Message,
		ctx: &mut EmitContext<'_>,
	) -> Result<(), NodeError> {
		let Ok(payload) = msg.into_payload::<I>() else {
			return Ok(());
		};
		if let Some(out) = (self.f)(payload) {
			ctx.emit("out", Message::data(out))?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn filters_out_none_results() {
		let mut seen = Vec::new();
		let mut t = Transform::new(|x: i32| if x % 2 == 0 { Some(x * 10) } else { None });
		seen.push((t.f)(2));
		seen.push((t.f)(3));
		assert_eq!(seen, vec![Some(20), None]);
	}
}
