//! Argument to placeholder resolution.
//!
//! Each argument is bound under its placeholder key by the first applicable
//! strategy, highest precedence first:
//!
//! 1. a resolver registered for that placeholder key,
//! 2. a resolver registered for the argument's exact runtime type, then the first
//!    matching resolver in registration order,
//! 3. the structural fallback for the argument kind; opaque values bind their
//!    type name.
//!
//! Contextual placeholders for the recipient are merged before any argument, so
//! every argument binding overrides them.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::argument::{Argument, Arguments};
use crate::component::{Component, ComponentLike};
use crate::config::KeyStyle;
use crate::descriptor::{MethodDescriptor, ParamDescriptor};
use crate::error::CallError;
use crate::placeholder::{Placeholder, TagResolver};
use crate::recipient::{EmptyRecipient, Recipient, RecipientRef};

/// Turns a parameter name into a placeholder key.
pub type KeyFormatter = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Supplies ambient placeholders for the recipient of a call.
pub type ContextualPlaceholders = Arc<dyn Fn(&dyn Recipient) -> TagResolver + Send + Sync>;

type ErasedResolve = Arc<dyn Fn(&Argument) -> Option<Component> + Send + Sync>;
type Matcher = Arc<dyn Fn(&Argument) -> bool + Send + Sync>;

/// Per-call inputs to resolution: the scanned method, its non-null arguments
/// and the recipient they address.
pub struct InvocationContext<'a> {
	descriptor: &'a MethodDescriptor,
	arguments: Vec<Argument>,
	recipient: RecipientRef,
}

impl<'a> InvocationContext<'a> {
	/// Validates argument slots against the descriptor.
	///
	/// The recipient is the first recipient argument, or the shared empty
	/// recipient when there is none.
	pub fn new(descriptor: &'a MethodDescriptor, arguments: Arguments) -> Result<Self, CallError> {
		let method = descriptor.id();
		let slots = arguments.into_slots();
		if slots.len() != descriptor.params().len() {
			return Err(CallError::ArityMismatch {
				method,
				expected: descriptor.params().len(),
				found: slots.len(),
			});
		}

		let mut values = Vec::with_capacity(slots.len());
		for (index, slot) in slots.into_iter().enumerate() {
			match slot {
				Some(argument) => values.push(argument),
				None => return Err(CallError::NullArgument { method, index }),
			}
		}

		let recipient = values
			.iter()
			.find_map(Argument::as_recipient)
			.cloned()
			.unwrap_or_else(EmptyRecipient::shared);

		Ok(Self {
			descriptor,
			arguments: values,
			recipient,
		})
	}

	pub fn descriptor(&self) -> &'a MethodDescriptor {
		self.descriptor
	}

	pub fn arguments(&self) -> &[Argument] {
		&self.arguments
	}

	pub fn recipient(&self) -> &RecipientRef {
		&self.recipient
	}
}

struct KeyEntry {
	expected: &'static str,
	resolve: ErasedResolve,
}

struct TypeEntry {
	label: &'static str,
	matches: Matcher,
	resolve: ErasedResolve,
}

/// Frozen resolution table shared by every dispatcher of one proxy tree.
pub struct ArgumentResolver {
	key_formatter: KeyFormatter,
	key_resolvers: FxHashMap<Box<str>, KeyEntry>,
	exact: FxHashMap<TypeId, usize>,
	types: Vec<TypeEntry>,
	placeholders: Option<ContextualPlaceholders>,
}

impl ArgumentResolver {
	pub fn builder() -> ArgumentResolverBuilder {
		ArgumentResolverBuilder::default()
	}

	/// Placeholder key a parameter occupies.
	pub fn placeholder_key(&self, param: &ParamDescriptor) -> String {
		match param.placeholder() {
			Some(key) => key.to_owned(),
			None => (self.key_formatter)(param.name()),
		}
	}

	/// Builds the composite placeholder set for one call.
	pub fn resolve(&self, context: &InvocationContext<'_>) -> Result<TagResolver, CallError> {
		let mut builder = TagResolver::builder();
		if let Some(placeholders) = &self.placeholders {
			builder.resolver(placeholders(&**context.recipient()));
		}

		let params = context.descriptor().params();
		for (param, argument) in params.iter().zip(context.arguments()) {
			let key = self.placeholder_key(param);
			builder.resolver(self.resolve_value(&key, argument)?);
		}
		Ok(builder.build())
	}

	fn resolve_value(&self, key: &str, argument: &Argument) -> Result<TagResolver, CallError> {
		if let Some(entry) = self.key_resolvers.get(key) {
			let component =
				(entry.resolve)(argument).ok_or_else(|| CallError::KeyResolverType {
					key: key.into(),
					expected: entry.expected,
					found: argument.type_name(),
				})?;
			return Ok(TagResolver::single(Placeholder::component(key, component)));
		}

		if let Some(component) = self.resolve_by_type(argument) {
			return Ok(TagResolver::single(Placeholder::component(key, component)));
		}

		Ok(match argument {
			Argument::Resolver(resolver) => resolver.clone(),
			Argument::Component(component) => {
				TagResolver::single(Placeholder::component(key, component))
			}
			Argument::Recipient(_) => TagResolver::empty(),
			Argument::Value(value) => {
				TagResolver::single(Placeholder::parsed(key, value.to_string()))
			}
			Argument::Opaque(value) => {
				TagResolver::single(Placeholder::parsed(key, (**value).type_name()))
			}
		})
	}

	fn resolve_by_type(&self, argument: &Argument) -> Option<Component> {
		let type_id = Any::type_id(argument.as_any());
		if let Some(&index) = self.exact.get(&type_id)
			&& let Some(component) = (self.types[index].resolve)(argument)
		{
			return Some(component);
		}
		self.types
			.iter()
			.filter(|entry| (entry.matches)(argument))
			.find_map(|entry| {
				tracing::trace!(resolver = entry.label, "type resolver matched");
				(entry.resolve)(argument)
			})
	}
}

impl fmt::Debug for ArgumentResolver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ArgumentResolver")
			.field("key_resolvers", &self.key_resolvers.keys().collect::<Vec<_>>())
			.field(
				"type_resolvers",
				&self.types.iter().map(|t| t.label).collect::<Vec<_>>(),
			)
			.field("placeholders", &self.placeholders.is_some())
			.finish_non_exhaustive()
	}
}

/// Collects resolution rules; frozen by [`ArgumentResolverBuilder::build`].
#[derive(Default)]
pub struct ArgumentResolverBuilder {
	key_formatter: Option<KeyFormatter>,
	key_resolvers: FxHashMap<Box<str>, KeyEntry>,
	exact: FxHashMap<TypeId, usize>,
	types: Vec<TypeEntry>,
	placeholders: Option<ContextualPlaceholders>,
}

impl ArgumentResolverBuilder {
	/// Replaces the parameter-name formatter. Defaults to the configured key style.
	pub fn key_formatter<F>(&mut self, formatter: F) -> &mut Self
	where
		F: Fn(&str) -> String + Send + Sync + 'static,
	{
		self.key_formatter = Some(Arc::new(formatter));
		self
	}

	/// Resolver for whatever argument occupies placeholder `key`.
	///
	/// An argument of another type in that slot rejects the call.
	pub fn key_resolver<T, C, F>(&mut self, key: impl Into<Box<str>>, resolver: F) -> &mut Self
	where
		T: Any,
		C: ComponentLike,
		F: Fn(&T) -> C + Send + Sync + 'static,
	{
		self.key_resolvers.insert(
			key.into(),
			KeyEntry {
				expected: type_name::<T>(),
				resolve: Arc::new(move |argument: &Argument| {
					argument
						.downcast_ref::<T>()
						.map(|value| resolver(value).as_component())
				}),
			},
		);
		self
	}

	/// Resolver for arguments whose runtime type is exactly `T`.
	///
	/// Registering `T` again replaces the earlier resolver in place.
	pub fn type_resolver<T, C, F>(&mut self, resolver: F) -> &mut Self
	where
		T: Any,
		C: ComponentLike,
		F: Fn(&T) -> C + Send + Sync + 'static,
	{
		let entry = TypeEntry {
			label: type_name::<T>(),
			matches: Arc::new(|argument: &Argument| argument.as_any().is::<T>()),
			resolve: Arc::new(move |argument: &Argument| {
				argument
					.downcast_ref::<T>()
					.map(|value| resolver(value).as_component())
			}),
		};
		match self.exact.get(&TypeId::of::<T>()) {
			Some(&index) => self.types[index] = entry,
			None => {
				self.exact.insert(TypeId::of::<T>(), self.types.len());
				self.types.push(entry);
			}
		}
		self
	}

	/// Resolver for any argument accepted by `matches`, such as every
	/// implementor of a trait.
	///
	/// Consulted after exact type matches; among several matching resolvers the
	/// first registered wins.
	pub fn type_resolver_matching<P, C, F>(
		&mut self,
		label: &'static str,
		matches: P,
		resolver: F,
	) -> &mut Self
	where
		P: Fn(&Argument) -> bool + Send + Sync + 'static,
		C: ComponentLike,
		F: Fn(&Argument) -> C + Send + Sync + 'static,
	{
		self.types.push(TypeEntry {
			label,
			matches: Arc::new(matches),
			resolve: Arc::new(move |argument: &Argument| Some(resolver(argument).as_component())),
		});
		self
	}

	/// Ambient placeholders for the call's recipient, merged at lowest precedence.
	pub fn placeholders<F>(&mut self, placeholders: F) -> &mut Self
	where
		F: Fn(&dyn Recipient) -> TagResolver + Send + Sync + 'static,
	{
		self.placeholders = Some(Arc::new(placeholders));
		self
	}

	pub fn build(self) -> ArgumentResolver {
		self.build_with(KeyStyle::default())
	}

	/// Builds with `style` as the formatter unless one was set explicitly.
	pub(crate) fn build_with(self, style: KeyStyle) -> ArgumentResolver {
		let key_formatter: KeyFormatter = match self.key_formatter {
			Some(formatter) => formatter,
			None => Arc::new(move |name: &str| style.apply(name)),
		};
		ArgumentResolver {
			key_formatter,
			key_resolvers: self.key_resolvers,
			exact: self.exact,
			types: self.types,
			placeholders: self.placeholders,
		}
	}
}

impl fmt::Debug for ArgumentResolverBuilder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ArgumentResolverBuilder")
			.field("key_resolvers", &self.key_resolvers.len())
			.field("type_resolvers", &self.types.len())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests;
