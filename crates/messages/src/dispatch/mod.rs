//! Runtime dispatch of declared message methods.
//!
//! A [`Dispatcher`] is the state behind one proxy instance: the shared scan,
//! resolver, renderer and sender, plus the key prefix accumulated along the
//! section path that produced it. Each call is evaluated in a fixed order:
//!
//! 1. passthrough bodies run as-is,
//! 2. methods missing from the scan are rejected,
//! 3. sections vend a child dispatcher with an extended prefix,
//! 4. leaves resolve arguments, render the final key and send or return the result.
//!
//! Identity (`PartialEq`, `Hash`, `Debug`, `Display`) is structural on the
//! dispatcher instance and never reaches the pipeline.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::argument::Arguments;
use crate::component::Component;
use crate::declaration::{MessageInterface, MethodId, ReturnShape, simple_name};
use crate::descriptor::{DescriptorCache, DescriptorKind, MethodDescriptor};
use crate::error::CallError;
use crate::recipient::ComponentSender;
use crate::render::Renderer;
use crate::resolver::{ArgumentResolver, InvocationContext};

/// Result of one dispatched call.
#[derive(Debug)]
pub enum Outcome {
	/// A unit leaf rendered its message and handed it to the sender.
	Sent,
	/// A component leaf rendered its message without sending it.
	Rendered(Component),
	/// A section opened a nested namespace.
	Section(Dispatcher),
}

impl Outcome {
	fn describe(&self) -> &'static str {
		match self {
			Self::Sent => ReturnShape::Unit.describe(),
			Self::Rendered(_) => ReturnShape::Component.describe(),
			Self::Section(child) => child.interface(),
		}
	}
}

/// Immutable state shared by a root dispatcher and every section below it.
pub(crate) struct Shared {
	pub(crate) descriptors: DescriptorCache,
	pub(crate) arguments: ArgumentResolver,
	pub(crate) renderer: Arc<dyn Renderer>,
	pub(crate) sender: Arc<dyn ComponentSender>,
}

struct DispatcherInner {
	shared: Arc<Shared>,
	interface: &'static str,
	prefix: Box<str>,
}

/// Dispatch state for one proxy instance. Cloning shares the instance.
#[derive(Clone)]
pub struct Dispatcher {
	inner: Arc<DispatcherInner>,
}

impl Dispatcher {
	pub(crate) fn root(shared: Shared) -> Self {
		let interface = shared.descriptors.root();
		let prefix = shared.descriptors.root_prefix().into();
		Self {
			inner: Arc::new(DispatcherInner {
				shared: Arc::new(shared),
				interface,
				prefix,
			}),
		}
	}

	/// Type path of the interface this dispatcher implements.
	pub fn interface(&self) -> &'static str {
		self.inner.interface
	}

	/// Key prefix prepended to every leaf reached through this dispatcher.
	pub fn prefix(&self) -> &str {
		&self.inner.prefix
	}

	pub fn descriptors(&self) -> &DescriptorCache {
		&self.inner.shared.descriptors
	}

	pub fn argument_resolver(&self) -> &ArgumentResolver {
		&self.inner.shared.arguments
	}

	/// Dispatches one call of `method`.
	pub fn invoke(&self, method: &MethodId, arguments: Arguments) -> Result<Outcome, CallError> {
		let shared = &self.inner.shared;
		if let Some(body) = shared.descriptors.passthrough(method) {
			tracing::trace!(method = %method, "passthrough");
			return body(self, arguments);
		}

		let Some(descriptor) = shared.descriptors.get(method) else {
			return Err(CallError::UnscannedMethod { method: *method });
		};

		match descriptor.kind() {
			DescriptorKind::Section {
				interface,
				delimiter,
			} => {
				if !arguments.is_empty() {
					return Err(CallError::ArityMismatch {
						method: *method,
						expected: 0,
						found: arguments.len(),
					});
				}
				let child = self.child(interface, descriptor.key(), delimiter);
				tracing::trace!(method = %method, prefix = child.prefix(), "opened section");
				Ok(Outcome::Section(child))
			}
			DescriptorKind::Leaf => self.leaf(descriptor, arguments),
		}
	}

	fn leaf(&self, descriptor: &MethodDescriptor, arguments: Arguments) -> Result<Outcome, CallError> {
		let shared = &self.inner.shared;
		let method = descriptor.id();
		let send = match descriptor.returns() {
			ReturnShape::Unit => true,
			ReturnShape::Component => false,
			other => {
				return Err(CallError::UnsupportedReturn {
					method,
					found: other.describe(),
				});
			}
		};

		let context = InvocationContext::new(descriptor, arguments)?;
		let placeholders = shared.arguments.resolve(&context)?;
		let key = format!("{}{}", self.inner.prefix, descriptor.key());
		let component = shared.renderer.render(&key, placeholders);

		if send {
			tracing::trace!(method = %method, key = %key, "sending message");
			shared.sender.send(&**context.recipient(), component);
			Ok(Outcome::Sent)
		} else {
			tracing::trace!(method = %method, key = %key, "rendered message");
			Ok(Outcome::Rendered(component))
		}
	}

	fn child(&self, interface: &'static str, fragment: &str, delimiter: char) -> Self {
		let mut prefix =
			String::with_capacity(self.inner.prefix.len() + fragment.len() + delimiter.len_utf8());
		prefix.push_str(&self.inner.prefix);
		prefix.push_str(fragment);
		prefix.push(delimiter);
		Self {
			inner: Arc::new(DispatcherInner {
				shared: Arc::clone(&self.inner.shared),
				interface,
				prefix: prefix.into_boxed_str(),
			}),
		}
	}

	/// Dispatches a leaf declared to return nothing.
	pub fn send(&self, method: &MethodId, arguments: Arguments) -> Result<(), CallError> {
		self.expect_leaf(method, ReturnShape::Unit)?;
		match self.invoke(method, arguments)? {
			Outcome::Sent => Ok(()),
			other => Err(mismatch(method, ReturnShape::Unit, &other)),
		}
	}

	/// Dispatches a leaf declared to return its rendered component.
	pub fn render(&self, method: &MethodId, arguments: Arguments) -> Result<Component, CallError> {
		self.expect_leaf(method, ReturnShape::Component)?;
		match self.invoke(method, arguments)? {
			Outcome::Rendered(component) => Ok(component),
			other => Err(mismatch(method, ReturnShape::Component, &other)),
		}
	}

	/// Opens the section `method` as the proxy type `I`.
	pub fn section<I: MessageInterface>(&self, method: &MethodId) -> Result<I, CallError> {
		if let Some(descriptor) = self.descriptors().get(method)
			&& !descriptor.is_section()
		{
			return Err(CallError::NotASection { method: *method });
		}
		match self.invoke(method, Arguments::new())? {
			Outcome::Section(child) if child.interface() == I::NAME => Ok(I::from_dispatcher(child)),
			Outcome::Section(child) => Err(CallError::SectionTypeMismatch {
				method: *method,
				expected: I::NAME,
				found: child.interface(),
			}),
			other => Err(CallError::ReturnMismatch {
				method: *method,
				expected: I::NAME,
				found: other.describe(),
			}),
		}
	}

	/// Rejects a leaf call whose declared return shape disagrees with the entry point.
	fn expect_leaf(&self, method: &MethodId, expected: ReturnShape) -> Result<(), CallError> {
		let Some(descriptor) = self.descriptors().get(method) else {
			return Ok(());
		};
		if descriptor.is_section() {
			return Err(CallError::NotALeaf { method: *method });
		}
		match descriptor.returns() {
			ReturnShape::Other(_) => Ok(()),
			found if found != expected => Err(CallError::ReturnMismatch {
				method: *method,
				expected: expected.describe(),
				found: found.describe(),
			}),
			_ => Ok(()),
		}
	}
}

fn mismatch(method: &MethodId, expected: ReturnShape, outcome: &Outcome) -> CallError {
	match outcome {
		Outcome::Section(_) => CallError::NotALeaf { method: *method },
		other => CallError::ReturnMismatch {
			method: *method,
			expected: expected.describe(),
			found: other.describe(),
		},
	}
}

impl PartialEq for Dispatcher {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

impl Eq for Dispatcher {}

impl Hash for Dispatcher {
	fn hash<H: Hasher>(&self, state: &mut H) {
		std::ptr::hash(Arc::as_ptr(&self.inner), state);
	}
}

impl fmt::Debug for Dispatcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Dispatcher")
			.field("interface", &self.inner.interface)
			.field("prefix", &self.inner.prefix)
			.finish_non_exhaustive()
	}
}

impl fmt::Display for Dispatcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "proxy for {}", simple_name(self.inner.interface))
	}
}
