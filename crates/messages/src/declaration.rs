//! Declarative description of message interfaces.
//!
//! A message interface is described by an [`InterfaceDecl`]: one [`MethodDecl`]
//! per declared operation, each carrying exactly one role marker. Declarations
//! are normally generated by `#[message_interface]`, but can be written by hand.

use std::fmt;
use std::sync::Arc;

use crate::argument::Arguments;
use crate::builder::ProxyBuilder;
use crate::dispatch::{Dispatcher, Outcome};
use crate::error::CallError;

/// Stable identity of a declared method: declaring interface, name and parameter types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId {
	interface: &'static str,
	name: &'static str,
	signature: &'static [&'static str],
}

impl MethodId {
	pub const fn new(
		interface: &'static str,
		name: &'static str,
		signature: &'static [&'static str],
	) -> Self {
		Self {
			interface,
			name,
			signature,
		}
	}

	pub fn interface(&self) -> &'static str {
		self.interface
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn signature(&self) -> &'static [&'static str] {
		self.signature
	}
}

impl fmt::Display for MethodId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}::{}({})",
			simple_name(self.interface),
			self.name,
			self.signature.join(", ")
		)
	}
}

/// Last path segment of a type path.
pub(crate) fn simple_name(path: &str) -> &str {
	path.rsplit("::").next().unwrap_or(path)
}

/// A declared parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParamDecl {
	name: Option<&'static str>,
	placeholder: Option<&'static str>,
}

impl ParamDecl {
	/// A parameter with no recorded name; it is keyed positionally as `arg{index}`.
	pub const fn positional() -> Self {
		Self {
			name: None,
			placeholder: None,
		}
	}

	pub const fn named(name: &'static str) -> Self {
		Self {
			name: Some(name),
			placeholder: None,
		}
	}

	/// Overrides the placeholder key. Blank overrides are ignored.
	pub const fn placeholder(mut self, key: &'static str) -> Self {
		self.placeholder = Some(key);
		self
	}

	pub fn name(&self) -> Option<&'static str> {
		self.name
	}

	pub fn placeholder_key(&self) -> Option<&'static str> {
		self.placeholder.filter(|key| !key.trim().is_empty())
	}
}

/// Marks a method as a leaf message key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyMarker {
	key: Option<&'static str>,
}

impl KeyMarker {
	/// Key fragment derived from the method name.
	pub const fn derived() -> Self {
		Self { key: None }
	}

	pub const fn explicit(key: &'static str) -> Self {
		Self { key: Some(key) }
	}

	pub fn key(&self) -> Option<&'static str> {
		self.key.filter(|key| !key.trim().is_empty())
	}
}

/// Marks a method (or a root interface) as opening a nested namespace.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SectionMarker {
	prefix: Option<&'static str>,
	delimiter: Option<char>,
}

impl SectionMarker {
	/// Prefix derived from the nested interface name, configured default delimiter.
	pub const fn derived() -> Self {
		Self {
			prefix: None,
			delimiter: None,
		}
	}

	pub const fn prefixed(prefix: &'static str) -> Self {
		Self {
			prefix: Some(prefix),
			delimiter: None,
		}
	}

	pub const fn delimiter(mut self, delimiter: char) -> Self {
		self.delimiter = Some(delimiter);
		self
	}

	/// Explicit prefix; blank prefixes count as derived.
	pub fn prefix(&self) -> Option<&'static str> {
		self.prefix.filter(|prefix| !prefix.trim().is_empty())
	}

	/// Delimiter named by the marker itself, if any.
	pub fn declared_delimiter(&self) -> Option<char> {
		self.delimiter
	}

	pub fn delimiter_or(&self, default: char) -> char {
		self.delimiter.unwrap_or(default)
	}
}

/// What a declared method hands back to its caller.
#[derive(Clone, Copy, Debug)]
pub enum ReturnShape {
	/// No value: the rendered message goes to the sender.
	Unit,
	/// The rendered message itself.
	Component,
	/// A nested message interface.
	Interface {
		name: &'static str,
		declare: fn() -> InterfaceDecl,
	},
	/// Anything else; rejected when called.
	Other(&'static str),
}

impl ReturnShape {
	pub fn interface<I: MessageInterface>() -> Self {
		Self::Interface {
			name: I::NAME,
			declare: I::declaration,
		}
	}

	pub fn describe(&self) -> &'static str {
		match *self {
			Self::Unit => "()",
			Self::Component => "Component",
			Self::Interface { name, .. } => name,
			Self::Other(ty) => ty,
		}
	}
}

impl PartialEq for ReturnShape {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Unit, Self::Unit) | (Self::Component, Self::Component) => true,
			(Self::Interface { name: a, .. }, Self::Interface { name: b, .. }) => a == b,
			(Self::Other(a), Self::Other(b)) => a == b,
			_ => false,
		}
	}
}

impl Eq for ReturnShape {}

/// Body of a method that carries its own implementation.
pub type PassthroughFn =
	Arc<dyn Fn(&Dispatcher, Arguments) -> Result<Outcome, CallError> + Send + Sync>;

/// One declared method.
#[derive(Clone)]
pub struct MethodDecl {
	name: &'static str,
	signature: &'static [&'static str],
	params: Vec<ParamDecl>,
	key: Option<KeyMarker>,
	section: Option<SectionMarker>,
	returns: ReturnShape,
	passthrough: Option<PassthroughFn>,
}

impl MethodDecl {
	/// A method with no role marker yet.
	pub fn new(name: &'static str, signature: &'static [&'static str]) -> Self {
		Self {
			name,
			signature,
			params: Vec::new(),
			key: None,
			section: None,
			returns: ReturnShape::Unit,
			passthrough: None,
		}
	}

	/// A leaf whose key fragment is derived from `name`.
	pub fn leaf(name: &'static str, signature: &'static [&'static str]) -> Self {
		Self::new(name, signature).marked_leaf(KeyMarker::derived())
	}

	/// A section opening the namespace declared by `I`.
	pub fn section<I: MessageInterface>(name: &'static str) -> Self {
		Self::new(name, &[])
			.marked_section(SectionMarker::derived())
			.returns(ReturnShape::interface::<I>())
	}

	/// A method with its own body, bypassing key resolution entirely.
	pub fn passthrough<F>(name: &'static str, signature: &'static [&'static str], body: F) -> Self
	where
		F: Fn(&Dispatcher, Arguments) -> Result<Outcome, CallError> + Send + Sync + 'static,
	{
		let mut decl = Self::new(name, signature);
		decl.passthrough = Some(Arc::new(body));
		decl
	}

	pub fn marked_leaf(mut self, marker: KeyMarker) -> Self {
		self.key = Some(marker);
		self
	}

	pub fn marked_section(mut self, marker: SectionMarker) -> Self {
		self.section = Some(marker);
		self
	}

	/// Sets an explicit message key, marking the method as a leaf.
	pub fn key(self, key: &'static str) -> Self {
		self.marked_leaf(KeyMarker::explicit(key))
	}

	pub fn param(mut self, param: ParamDecl) -> Self {
		self.params.push(param);
		self
	}

	pub fn returns(mut self, shape: ReturnShape) -> Self {
		self.returns = shape;
		self
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn signature(&self) -> &'static [&'static str] {
		self.signature
	}

	pub fn params(&self) -> &[ParamDecl] {
		&self.params
	}

	pub fn key_marker(&self) -> Option<&KeyMarker> {
		self.key.as_ref()
	}

	pub fn section_marker(&self) -> Option<&SectionMarker> {
		self.section.as_ref()
	}

	pub fn return_shape(&self) -> &ReturnShape {
		&self.returns
	}

	pub fn passthrough_body(&self) -> Option<&PassthroughFn> {
		self.passthrough.as_ref()
	}

	pub fn id(&self, interface: &'static str) -> MethodId {
		MethodId::new(interface, self.name, self.signature)
	}
}

impl fmt::Debug for MethodDecl {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MethodDecl")
			.field("name", &self.name)
			.field("signature", &self.signature)
			.field("params", &self.params)
			.field("key", &self.key)
			.field("section", &self.section)
			.field("returns", &self.returns)
			.field("passthrough", &self.passthrough.is_some())
			.finish()
	}
}

/// A declared message interface.
#[derive(Clone, Debug)]
pub struct InterfaceDecl {
	name: &'static str,
	section: Option<SectionMarker>,
	methods: Vec<MethodDecl>,
	extends: Vec<fn() -> InterfaceDecl>,
}

impl InterfaceDecl {
	/// `name` is the interface's type path; its last segment is the simple name.
	pub fn new(name: &'static str) -> Self {
		Self {
			name,
			section: None,
			methods: Vec::new(),
			extends: Vec::new(),
		}
	}

	/// Root section applied when this interface is the proxy target.
	pub fn section(mut self, marker: SectionMarker) -> Self {
		self.section = Some(marker);
		self
	}

	pub fn method(mut self, method: MethodDecl) -> Self {
		self.methods.push(method);
		self
	}

	/// Adds a parent interface whose methods are visible through this one.
	pub fn extends(mut self, parent: fn() -> InterfaceDecl) -> Self {
		self.extends.push(parent);
		self
	}

	pub fn extends_interface<I: MessageInterface>(self) -> Self {
		self.extends(I::declaration)
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn simple_name(&self) -> &'static str {
		simple_name(self.name)
	}

	pub fn section_marker(&self) -> Option<&SectionMarker> {
		self.section.as_ref()
	}

	pub fn methods(&self) -> &[MethodDecl] {
		&self.methods
	}

	pub fn parents(&self) -> impl Iterator<Item = InterfaceDecl> + '_ {
		self.extends.iter().map(|declare| declare())
	}
}

/// A concrete proxy type standing in for a declared message interface.
///
/// Implemented by the types `#[message_interface]` generates.
pub trait MessageInterface: Sized + Send + Sync + 'static {
	/// Full type path of the declared interface.
	const NAME: &'static str;

	fn declaration() -> InterfaceDecl;

	fn from_dispatcher(dispatcher: Dispatcher) -> Self;

	fn dispatcher(&self) -> &Dispatcher;

	fn builder() -> ProxyBuilder<Self> {
		ProxyBuilder::new()
	}
}
