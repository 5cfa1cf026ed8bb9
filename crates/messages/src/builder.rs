//! Assembles scanned descriptors, resolver, renderer and sender into a proxy.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parley_holder::ReloadableHolder;

use crate::config::MessagesConfig;
use crate::declaration::MessageInterface;
use crate::descriptor::DescriptorCache;
use crate::dispatch::{Dispatcher, Shared};
use crate::error::DeclarationError;
use crate::recipient::{ComponentSender, SimpleSender};
use crate::render::{Renderer, TranslatableRenderer, TranslatorHolder, TranslatorRenderer};
use crate::resolver::ArgumentResolverBuilder;

/// Builds a ready-to-use proxy for the message interface `I`.
///
/// ```ignore
/// let messages = PluginMessagesProxy::builder()
///     .arguments(|args| {
///         args.type_resolver(|player: &Player| Component::text(player.name()));
///     })
///     .sender(|recipient: &dyn Recipient, message: Component| recipient.send_message(&message))
///     .build()?;
/// ```
pub struct ProxyBuilder<I> {
	config: MessagesConfig,
	arguments: ArgumentResolverBuilder,
	renderer: Arc<dyn Renderer>,
	sender: Arc<dyn ComponentSender>,
	marker: PhantomData<fn() -> I>,
}

impl<I: MessageInterface> ProxyBuilder<I> {
	pub fn new() -> Self {
		Self {
			config: MessagesConfig::default(),
			arguments: ArgumentResolverBuilder::default(),
			renderer: Arc::new(TranslatableRenderer),
			sender: Arc::new(SimpleSender),
			marker: PhantomData,
		}
	}

	pub fn config(mut self, config: MessagesConfig) -> Self {
		self.config = config;
		self
	}

	/// Uses the configuration currently published by `holder`.
	pub fn config_from(self, holder: &ReloadableHolder<MessagesConfig>) -> Self {
		let config = MessagesConfig::clone(&holder.load());
		self.config(config)
	}

	/// Configures argument resolution.
	pub fn arguments(mut self, configure: impl FnOnce(&mut ArgumentResolverBuilder)) -> Self {
		configure(&mut self.arguments);
		self
	}

	pub fn renderer(mut self, renderer: impl Renderer + 'static) -> Self {
		self.renderer = Arc::new(renderer);
		self
	}

	/// Renders through the translator currently published by `translators`.
	pub fn translator(self, translators: Arc<TranslatorHolder>) -> Self {
		self.renderer(TranslatorRenderer::new(translators))
	}

	pub fn sender(mut self, sender: impl ComponentSender + 'static) -> Self {
		self.sender = Arc::new(sender);
		self
	}

	/// Scans `I` and everything reachable from it, then vends the root proxy.
	///
	/// Declaration and configuration errors surface here; a built proxy never
	/// fails on shape.
	pub fn build(self) -> Result<I, DeclarationError> {
		let declaration = I::declaration();
		let descriptors = DescriptorCache::scan(&declaration, &self.config)?;
		let arguments = self.arguments.build_with(self.config.key_style);
		let dispatcher = Dispatcher::root(Shared {
			descriptors,
			arguments,
			renderer: self.renderer,
			sender: self.sender,
		});
		tracing::debug!(
			interface = I::NAME,
			prefix = dispatcher.prefix(),
			"built message proxy"
		);
		Ok(I::from_dispatcher(dispatcher))
	}
}

impl<I: MessageInterface> Default for ProxyBuilder<I> {
	fn default() -> Self {
		Self::new()
	}
}

impl<I> fmt::Debug for ProxyBuilder<I> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProxyBuilder")
			.field("interface", &std::any::type_name::<I>())
			.field("config", &self.config)
			.field("arguments", &self.arguments)
			.finish_non_exhaustive()
	}
}
