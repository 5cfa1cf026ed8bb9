//! Procedural macros for parley.
//!
//! Provides the `#[message_interface]` attribute, which generates a proxy type
//! for a trait of message methods.

use proc_macro::TokenStream;

/// Message interface expansion.
mod interface;

/// Declares a message interface and generates its proxy type.
///
/// ```ignore
/// #[message_interface(prefix = "plugin")]
/// pub trait PluginMessages {
///     /// Sent after `/plugin reload`.
///     #[key]
///     fn command_reload_success(&self, viewer: RecipientRef);
///
///     #[key("greeting")]
///     fn greet(&self, #[placeholder("name")] player: &str) -> Component;
///
///     #[section(prefix = "cmd", delimiter = '/')]
///     fn commands(&self) -> CommandMessagesProxy;
///
///     fn shout(&self, player: &str) -> String {
///         self.greet(player).to_string().to_uppercase()
///     }
/// }
/// ```
///
/// Generates `PluginMessagesProxy`, which implements the trait by dispatching each
/// call, plus `MessageInterface`, `Clone`, `PartialEq`, `Eq`, `Hash`, `Debug`
/// and `Display`.
///
/// # Interface arguments
///
/// - `prefix = "..."` - root key prefix
/// - `delimiter = '.'` - delimiter after the root prefix
/// - `section` - derive the root prefix from the trait name
/// - `proxy = Name` - name of the generated type (default `<Trait>Proxy`)
///
/// # Method attributes
///
/// - `#[key]` / `#[key("explicit.key")]` - leaf rendering a message
/// - `#[section]` / `#[section(prefix = "...", delimiter = '/')]` - nested interface
/// - `#[placeholder("name")]` on a parameter - explicit placeholder key
///
/// Methods with a default body are left as they are. Leaf methods return `()`,
/// `Component`, or either wrapped in `Result<_, E>` where `E: From<CallError>`;
/// a rejected call on a signature without `Result` panics.
#[proc_macro_attribute]
pub fn message_interface(attr: TokenStream, item: TokenStream) -> TokenStream {
	interface::message_interface(attr, item)
}
