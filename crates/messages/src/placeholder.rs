//! Placeholder bindings and composite placeholder sets.

use indexmap::IndexMap;

use crate::component::{Component, ComponentLike};

/// The value bound to a placeholder key.
#[derive(Clone, Debug, PartialEq)]
pub enum PlaceholderValue {
	/// A component inserted verbatim.
	Component(Component),
	/// Text handed to the formatting engine for parsing.
	Parsed(Box<str>),
}

/// A single `(key, value)` binding produced from one argument.
#[derive(Clone, Debug, PartialEq)]
pub struct Placeholder {
	key: Box<str>,
	value: PlaceholderValue,
}

impl Placeholder {
	pub fn component(key: impl Into<Box<str>>, value: impl ComponentLike) -> Self {
		Self {
			key: key.into(),
			value: PlaceholderValue::Component(value.as_component()),
		}
	}

	pub fn parsed(key: impl Into<Box<str>>, value: impl Into<Box<str>>) -> Self {
		Self {
			key: key.into(),
			value: PlaceholderValue::Parsed(value.into()),
		}
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn value(&self) -> &PlaceholderValue {
		&self.value
	}
}

/// An ordered set of placeholder bindings.
///
/// Merging is last-wins: a binding added later replaces an earlier binding for
/// the same key, so lower-precedence sources are merged first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TagResolver {
	bindings: IndexMap<Box<str>, PlaceholderValue>,
}

impl TagResolver {
	pub fn empty() -> Self {
		Self::default()
	}

	pub fn builder() -> TagResolverBuilder {
		TagResolverBuilder::default()
	}

	/// A resolver holding exactly one binding.
	pub fn single(placeholder: Placeholder) -> Self {
		let mut bindings = IndexMap::with_capacity(1);
		bindings.insert(placeholder.key, placeholder.value);
		Self { bindings }
	}

	pub fn get(&self, key: &str) -> Option<&PlaceholderValue> {
		self.bindings.get(key)
	}

	pub fn contains(&self, key: &str) -> bool {
		self.bindings.contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.bindings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bindings.is_empty()
	}

	/// Bindings in first-insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &PlaceholderValue)> {
		self.bindings.iter().map(|(k, v)| (&**k, v))
	}

	/// Bound keys in first-insertion order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.bindings.keys().map(|k| &**k)
	}
}

impl FromIterator<Placeholder> for TagResolver {
	fn from_iter<I: IntoIterator<Item = Placeholder>>(iter: I) -> Self {
		let mut builder = Self::builder();
		for placeholder in iter {
			builder.placeholder(placeholder);
		}
		builder.build()
	}
}

/// Accumulates bindings from several sources into one [`TagResolver`].
#[derive(Debug, Default)]
pub struct TagResolverBuilder {
	bindings: IndexMap<Box<str>, PlaceholderValue>,
}

impl TagResolverBuilder {
	/// Merges every binding of `resolver`, overriding earlier keys.
	pub fn resolver(&mut self, resolver: TagResolver) -> &mut Self {
		self.bindings.extend(resolver.bindings);
		self
	}

	pub fn placeholder(&mut self, placeholder: Placeholder) -> &mut Self {
		self.bindings.insert(placeholder.key, placeholder.value);
		self
	}

	pub fn build(self) -> TagResolver {
		TagResolver {
			bindings: self.bindings,
		}
	}
}
