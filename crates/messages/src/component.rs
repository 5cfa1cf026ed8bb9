//! Renderable message values.
//!
//! The formatting engine that turns a [`Component`] into styled output lives
//! outside this crate. Components produced here are either literal text or a
//! translatable reference: a key plus the placeholder set to render it with.

use std::fmt;

use crate::placeholder::TagResolver;

/// An opaque renderable message.
#[derive(Clone, Debug, PartialEq)]
pub enum Component {
	/// Literal text, rendered as-is.
	Text(Box<str>),
	/// A message key awaiting translation with its bound placeholders.
	Translatable(TranslatableComponent),
}

impl Component {
	/// Creates a literal text component.
	pub fn text(text: impl Into<Box<str>>) -> Self {
		Self::Text(text.into())
	}

	/// Creates a translatable component bound to `key` and `placeholders`.
	pub fn translatable(key: impl Into<Box<str>>, placeholders: TagResolver) -> Self {
		Self::Translatable(TranslatableComponent {
			key: key.into(),
			placeholders,
		})
	}

	/// Returns the translatable part, if this is one.
	pub fn as_translatable(&self) -> Option<&TranslatableComponent> {
		match self {
			Self::Translatable(t) => Some(t),
			Self::Text(_) => None,
		}
	}

	/// Returns the message key of a translatable component.
	pub fn key(&self) -> Option<&str> {
		self.as_translatable().map(TranslatableComponent::key)
	}
}

impl fmt::Display for Component {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Text(text) => f.write_str(text),
			Self::Translatable(t) => f.write_str(&t.key),
		}
	}
}

/// A message key together with the placeholders it should be rendered with.
#[derive(Clone, Debug, PartialEq)]
pub struct TranslatableComponent {
	key: Box<str>,
	placeholders: TagResolver,
}

impl TranslatableComponent {
	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn placeholders(&self) -> &TagResolver {
		&self.placeholders
	}
}

/// Anything that can stand in for a [`Component`].
pub trait ComponentLike {
	fn as_component(&self) -> Component;
}

impl ComponentLike for Component {
	fn as_component(&self) -> Component {
		self.clone()
	}
}

impl ComponentLike for TranslatableComponent {
	fn as_component(&self) -> Component {
		Component::Translatable(self.clone())
	}
}

impl<C: ComponentLike + ?Sized> ComponentLike for &C {
	fn as_component(&self) -> Component {
		(**self).as_component()
	}
}
