//! The render boundary: turning a resolved key and placeholder set into a component.

use std::fmt;
use std::sync::Arc;

use parley_holder::ReloadableHolder;

use crate::component::Component;
use crate::placeholder::TagResolver;

/// Renders a message template bound to `key` with `placeholders`.
pub trait Renderer: Send + Sync {
	fn render(&self, key: &str, placeholders: TagResolver) -> Component;
}

impl<F> Renderer for F
where
	F: Fn(&str, TagResolver) -> Component + Send + Sync,
{
	fn render(&self, key: &str, placeholders: TagResolver) -> Component {
		self(key, placeholders)
	}
}

/// Defers rendering: produces a translatable component for the formatting engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct TranslatableRenderer;

impl Renderer for TranslatableRenderer {
	fn render(&self, key: &str, placeholders: TagResolver) -> Component {
		Component::translatable(key, placeholders)
	}
}

/// Looks up a message template for a key.
pub trait Translator: Send + Sync {
	/// Returns `None` when the key has no translation.
	fn translate(&self, key: &str, placeholders: &TagResolver) -> Option<Component>;
}

/// The shared, hot-swappable translator source.
pub type TranslatorHolder = ReloadableHolder<Arc<dyn Translator>>;

/// Renders through whichever translator is currently published.
///
/// The translator is read on every render, so a reload of the holder applies to
/// the next call of every proxy that shares it.
#[derive(Clone)]
pub struct TranslatorRenderer {
	translators: Arc<TranslatorHolder>,
}

impl TranslatorRenderer {
	pub fn new(translators: Arc<TranslatorHolder>) -> Self {
		Self { translators }
	}

	pub fn translators(&self) -> &Arc<TranslatorHolder> {
		&self.translators
	}
}

impl Renderer for TranslatorRenderer {
	fn render(&self, key: &str, placeholders: TagResolver) -> Component {
		let translator = self.translators.load();
		match translator.translate(key, &placeholders) {
			Some(component) => component,
			None => {
				tracing::trace!(key, "no translation, deferring to translatable component");
				Component::translatable(key, placeholders)
			}
		}
	}
}

impl fmt::Debug for TranslatorRenderer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TranslatorRenderer").finish_non_exhaustive()
	}
}
