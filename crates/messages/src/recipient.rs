//! Message recipients and the send boundary.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::component::Component;

/// An opaque addressee for rendered messages.
pub trait Recipient: Any + Send + Sync + fmt::Debug {
	/// Delivers a rendered message. Fire-and-forget from the dispatcher's view.
	fn send_message(&self, message: &Component);
}

/// Shared handle to a recipient, as carried by arguments.
pub type RecipientRef = Arc<dyn Recipient>;

/// A recipient that discards everything sent to it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmptyRecipient;

static EMPTY: LazyLock<RecipientRef> = LazyLock::new(|| Arc::new(EmptyRecipient));

impl EmptyRecipient {
	/// The process-wide shared empty recipient.
	pub fn shared() -> RecipientRef {
		Arc::clone(&EMPTY)
	}

	/// Whether `recipient` is the empty recipient.
	pub fn is(recipient: &dyn Recipient) -> bool {
		let any: &dyn Any = recipient;
		any.is::<EmptyRecipient>()
	}
}

impl Recipient for EmptyRecipient {
	fn send_message(&self, _message: &Component) {}
}

/// Hands rendered messages to their recipient.
pub trait ComponentSender: Send + Sync {
	fn send(&self, recipient: &dyn Recipient, component: Component);
}

/// Sender that calls [`Recipient::send_message`] directly.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleSender;

impl ComponentSender for SimpleSender {
	fn send(&self, recipient: &dyn Recipient, component: Component) {
		recipient.send_message(&component);
	}
}

impl<F> ComponentSender for F
where
	F: Fn(&dyn Recipient, Component) + Send + Sync,
{
	fn send(&self, recipient: &dyn Recipient, component: Component) {
		self(recipient, component)
	}
}
