//! Call arguments as seen by the resolver.
//!
//! Arguments are dynamically typed: the resolver picks a strategy from the
//! argument's structural kind and its runtime type. A slot left empty is the
//! null argument and rejects the invocation.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use crate::component::Component;
use crate::placeholder::TagResolver;
use crate::recipient::{Recipient, RecipientRef};

/// A plain value bound through its string form unless a resolver claims it.
pub trait ArgumentValue: Any + fmt::Display + Send + Sync {
	fn type_name(&self) -> &'static str;
}

impl<T: Any + fmt::Display + Send + Sync> ArgumentValue for T {
	fn type_name(&self) -> &'static str {
		type_name::<T>()
	}
}

/// A value with no string form of its own. Only key and type resolvers can
/// render it meaningfully; the structural fallback binds its type name.
pub trait OpaqueValue: Any + Send + Sync {
	fn type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync> OpaqueValue for T {
	fn type_name(&self) -> &'static str {
		type_name::<T>()
	}
}

/// One actual argument of an invocation.
#[derive(Clone)]
pub enum Argument {
	/// Already a placeholder set; spliced in verbatim.
	Resolver(TagResolver),
	/// Renderable content, bound under the argument's key.
	Component(Component),
	/// An addressee; used for delivery, never rendered.
	Recipient(RecipientRef),
	/// Any other displayable value.
	Value(Arc<dyn ArgumentValue>),
	/// A domain value meant for a type or key resolver.
	Opaque(Arc<dyn OpaqueValue>),
}

impl Argument {
	pub fn value<T: Any + fmt::Display + Send + Sync>(value: T) -> Self {
		Self::Value(Arc::new(value))
	}

	pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
		Self::Opaque(Arc::new(value))
	}

	pub fn recipient(recipient: RecipientRef) -> Self {
		Self::Recipient(recipient)
	}

	/// The argument's payload as its concrete runtime type.
	pub fn as_any(&self) -> &dyn Any {
		match self {
			Self::Resolver(resolver) => resolver,
			Self::Component(component) => component,
			Self::Recipient(recipient) => {
				let recipient: &dyn Recipient = &**recipient;
				recipient
			}
			Self::Value(value) => {
				let value: &dyn ArgumentValue = &**value;
				value
			}
			Self::Opaque(value) => {
				let value: &dyn OpaqueValue = &**value;
				value
			}
		}
	}

	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.as_any().downcast_ref()
	}

	pub fn type_name(&self) -> &'static str {
		match self {
			Self::Resolver(_) => type_name::<TagResolver>(),
			Self::Component(_) => type_name::<Component>(),
			Self::Recipient(_) => type_name::<RecipientRef>(),
			Self::Value(value) => (**value).type_name(),
			Self::Opaque(value) => (**value).type_name(),
		}
	}

	pub fn as_recipient(&self) -> Option<&RecipientRef> {
		match self {
			Self::Recipient(recipient) => Some(recipient),
			_ => None,
		}
	}
}

impl fmt::Debug for Argument {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Resolver(resolver) => f.debug_tuple("Resolver").field(resolver).finish(),
			Self::Component(component) => f.debug_tuple("Component").field(component).finish(),
			Self::Recipient(recipient) => f.debug_tuple("Recipient").field(recipient).finish(),
			Self::Value(value) => f
				.debug_struct("Value")
				.field("type", &(**value).type_name())
				.field("display", &format_args!("{value}"))
				.finish(),
			Self::Opaque(value) => f.debug_tuple("Opaque").field(&(**value).type_name()).finish(),
		}
	}
}

/// The ordered argument slots of one call; `None` marks a null slot.
#[derive(Clone, Debug, Default)]
pub struct Arguments {
	slots: Vec<Option<Argument>>,
}

impl Arguments {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_slots(slots: Vec<Option<Argument>>) -> Self {
		Self { slots }
	}

	/// Appends an argument.
	pub fn with(mut self, value: impl IntoArgument) -> Self {
		self.slots.push(value.into_argument());
		self
	}

	/// Appends a null slot.
	pub fn null(mut self) -> Self {
		self.slots.push(None);
		self
	}

	pub fn len(&self) -> usize {
		self.slots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	pub fn slots(&self) -> &[Option<Argument>] {
		&self.slots
	}

	pub(crate) fn into_slots(self) -> Vec<Option<Argument>> {
		self.slots
	}
}

impl FromIterator<Option<Argument>> for Arguments {
	fn from_iter<I: IntoIterator<Item = Option<Argument>>>(iter: I) -> Self {
		Self {
			slots: iter.into_iter().collect(),
		}
	}
}

/// Conversion from a declared parameter type into an argument slot.
///
/// Returning `None` produces a null slot.
pub trait IntoArgument {
	fn into_argument(self) -> Option<Argument>;
}

/// Wraps any displayable value so it can be passed as an argument.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Value<T>(pub T);

impl<T: Any + fmt::Display + Send + Sync> IntoArgument for Value<T> {
	fn into_argument(self) -> Option<Argument> {
		Some(Argument::value(self.0))
	}
}

/// Wraps a value without a string form, for types claimed by a resolver.
///
/// Borrowed domain parameters can convert through it:
///
/// ```ignore
/// impl IntoArgument for &Player {
///     fn into_argument(self) -> Option<Argument> {
///         Opaque(self.clone()).into_argument()
///     }
/// }
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Opaque<T>(pub T);

impl<T: Any + Send + Sync> IntoArgument for Opaque<T> {
	fn into_argument(self) -> Option<Argument> {
		Some(Argument::opaque(self.0))
	}
}

impl IntoArgument for Argument {
	fn into_argument(self) -> Option<Argument> {
		Some(self)
	}
}

impl<T: IntoArgument> IntoArgument for Option<T> {
	fn into_argument(self) -> Option<Argument> {
		self.and_then(IntoArgument::into_argument)
	}
}

impl IntoArgument for Component {
	fn into_argument(self) -> Option<Argument> {
		Some(Argument::Component(self))
	}
}

impl IntoArgument for &Component {
	fn into_argument(self) -> Option<Argument> {
		Some(Argument::Component(self.clone()))
	}
}

impl IntoArgument for TagResolver {
	fn into_argument(self) -> Option<Argument> {
		Some(Argument::Resolver(self))
	}
}

impl IntoArgument for &TagResolver {
	fn into_argument(self) -> Option<Argument> {
		Some(Argument::Resolver(self.clone()))
	}
}

impl IntoArgument for RecipientRef {
	fn into_argument(self) -> Option<Argument> {
		Some(Argument::Recipient(self))
	}
}

impl IntoArgument for &RecipientRef {
	fn into_argument(self) -> Option<Argument> {
		Some(Argument::Recipient(Arc::clone(self)))
	}
}

impl<R: Recipient> IntoArgument for Arc<R> {
	fn into_argument(self) -> Option<Argument> {
		Some(Argument::Recipient(self))
	}
}

impl IntoArgument for &str {
	fn into_argument(self) -> Option<Argument> {
		Some(Argument::value(self.to_owned()))
	}
}

impl IntoArgument for &String {
	fn into_argument(self) -> Option<Argument> {
		Some(Argument::value(self.clone()))
	}
}

macro_rules! display_arguments {
	($($ty:ty),* $(,)?) => {
		$(
			impl IntoArgument for $ty {
				fn into_argument(self) -> Option<Argument> {
					Some(Argument::value(self))
				}
			}
		)*
	};
}

display_arguments!(
	String, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);
