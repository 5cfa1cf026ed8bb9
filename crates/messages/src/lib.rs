//! Declarative message interfaces.
//!
//! A message interface is a trait whose methods stand for localizable message
//! templates. `#[message_interface]` turns the trait into a scanned declaration
//! and a generated proxy type; calling a proxy method resolves the arguments
//! into placeholders, builds the hierarchical message key and either sends the
//! rendered message to its recipient or returns it.
//!
//! # Modules
//!
//! - [`declaration`] - interface and method declarations, [`MessageInterface`]
//! - [`descriptor`] - one-time scan into immutable per-method metadata
//! - [`resolver`] - argument to placeholder resolution
//! - [`dispatch`] - per-call dispatch through sections and leaves
//! - [`builder`] - proxy assembly
//! - [`render`] - renderers and hot-swappable translators
//! - [`config`] - key style, delimiter and root prefix settings
//!
//! # Example
//!
//! ```ignore
//! use parley_messages::{Component, RecipientRef, message_interface};
//!
//! #[message_interface(prefix = "plugin")]
//! pub trait PluginMessages {
//!     #[key]
//!     fn command_reload_success(&self, viewer: RecipientRef);
//!
//!     #[key("greeting")]
//!     fn greet(&self, #[placeholder("name")] player: &str) -> Component;
//!
//!     #[section(prefix = "cmd")]
//!     fn commands(&self) -> CommandMessagesProxy;
//! }
//! ```

extern crate self as parley_messages;

pub mod argument;
pub mod builder;
pub mod component;
pub mod config;
pub mod declaration;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod placeholder;
pub mod recipient;
pub mod render;
pub mod resolver;

#[cfg(test)]
#[allow(unused_imports, reason = "dev-dependency used by the integration tests")]
use proptest as _;

pub use argument::{
	Argument, ArgumentValue, Arguments, IntoArgument, Opaque, OpaqueValue, Value,
};
pub use builder::ProxyBuilder;
pub use component::{Component, ComponentLike, TranslatableComponent};
pub use config::{ConfigError, KeyStyle, MessagesConfig};
pub use declaration::{
	InterfaceDecl, KeyMarker, MessageInterface, MethodDecl, MethodId, ParamDecl, PassthroughFn,
	ReturnShape, SectionMarker,
};
pub use descriptor::{DescriptorCache, DescriptorKind, MethodDescriptor, ParamDescriptor};
pub use dispatch::{Dispatcher, Outcome};
pub use error::{CallError, DeclarationError};
pub use parley_holder::{HolderError, ReloadableHolder};
pub use parley_macros::message_interface;
pub use placeholder::{Placeholder, PlaceholderValue, TagResolver, TagResolverBuilder};
pub use recipient::{ComponentSender, EmptyRecipient, Recipient, RecipientRef, SimpleSender};
pub use render::{Renderer, TranslatableRenderer, Translator, TranslatorHolder, TranslatorRenderer};
pub use resolver::{
	ArgumentResolver, ArgumentResolverBuilder, ContextualPlaceholders, InvocationContext,
	KeyFormatter,
};

/// Support items for generated proxies. Not part of the public API.
#[doc(hidden)]
pub mod __private {
	pub use crate::argument::{Arguments, IntoArgument};
	pub use crate::builder::ProxyBuilder;
	pub use crate::declaration::{
		InterfaceDecl, KeyMarker, MessageInterface, MethodDecl, MethodId, ParamDecl, ReturnShape,
		SectionMarker,
	};
	pub use crate::dispatch::{Dispatcher, Outcome};
	pub use crate::error::CallError;

	/// Rejects an invocation whose signature cannot carry the error.
	#[cold]
	#[track_caller]
	pub fn reject(error: CallError) -> ! {
		panic!("rejected message invocation: {error}")
	}

	/// Dispatches a leaf whose declared return type is unsupported, which always rejects.
	#[cold]
	#[track_caller]
	pub fn reject_invocation(result: Result<Outcome, CallError>) -> ! {
		match result {
			Err(error) => reject(error),
			Ok(outcome) => panic!("rejected message invocation: unexpected outcome {outcome:?}"),
		}
	}
}
