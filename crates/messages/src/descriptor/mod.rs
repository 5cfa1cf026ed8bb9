//! One-time scan of a message interface into immutable per-method metadata.
//!
//! The scan walks the root declaration depth-first: its own methods in
//! declaration order, recursing into a section's nested interface as soon as the
//! section is classified, then its parent interfaces. Every interface is visited
//! once and every method is recorded once, so shared parents and cyclic section
//! graphs terminate.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::{MessagesConfig, is_valid_delimiter};
use crate::declaration::{InterfaceDecl, MethodDecl, MethodId, PassthroughFn, ReturnShape};
use crate::error::DeclarationError;

/// A scanned parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamDescriptor {
	name: Box<str>,
	placeholder: Option<Box<str>>,
}

impl ParamDescriptor {
	/// Declared name, or `arg{index}` when none was recorded.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Explicit placeholder key, bypassing the key formatter.
	pub fn placeholder(&self) -> Option<&str> {
		self.placeholder.as_deref()
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DescriptorKind {
	/// Renders a message under the accumulated key.
	Leaf,
	/// Opens the namespace of `interface`, joined to descendants by `delimiter`.
	Section {
		interface: &'static str,
		delimiter: char,
	},
}

/// Scanned metadata for one declared method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDescriptor {
	id: MethodId,
	key: Box<str>,
	kind: DescriptorKind,
	params: Box<[ParamDescriptor]>,
	returns: ReturnShape,
}

impl MethodDescriptor {
	pub fn id(&self) -> MethodId {
		self.id
	}

	/// Key fragment this method contributes.
	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn kind(&self) -> DescriptorKind {
		self.kind
	}

	pub fn is_section(&self) -> bool {
		matches!(self.kind, DescriptorKind::Section { .. })
	}

	pub fn params(&self) -> &[ParamDescriptor] {
		&self.params
	}

	pub fn returns(&self) -> ReturnShape {
		self.returns
	}
}

/// Immutable method metadata for a root interface and everything reachable from it.
pub struct DescriptorCache {
	root: &'static str,
	root_prefix: Box<str>,
	methods: FxHashMap<MethodId, MethodDescriptor>,
	passthrough: FxHashMap<MethodId, PassthroughFn>,
	interfaces: Vec<&'static str>,
}

impl DescriptorCache {
	/// Scans `root` under `config`.
	///
	/// The configuration is checked first, so an invalid delimiter or a blank
	/// root prefix override fails the scan like any declaration error.
	pub fn scan(root: &InterfaceDecl, config: &MessagesConfig) -> Result<Self, DeclarationError> {
		check_config(root, config)?;
		let mut scanner = Scanner {
			config,
			methods: FxHashMap::default(),
			passthrough: FxHashMap::default(),
			visited: FxHashSet::default(),
			interfaces: Vec::new(),
		};
		scanner.visit(root)?;

		let cache = Self {
			root: root.name(),
			root_prefix: root_prefix(root, config).into_boxed_str(),
			methods: scanner.methods,
			passthrough: scanner.passthrough,
			interfaces: scanner.interfaces,
		};
		tracing::debug!(
			interface = cache.root,
			prefix = %cache.root_prefix,
			methods = cache.methods.len(),
			passthrough = cache.passthrough.len(),
			interfaces = cache.interfaces.len(),
			"scanned message interface"
		);
		Ok(cache)
	}

	/// Type path of the interface the scan started from.
	pub fn root(&self) -> &'static str {
		self.root
	}

	/// Prefix applied to every key reached through the root interface.
	pub fn root_prefix(&self) -> &str {
		&self.root_prefix
	}

	pub fn get(&self, id: &MethodId) -> Option<&MethodDescriptor> {
		self.methods.get(id)
	}

	pub fn passthrough(&self, id: &MethodId) -> Option<&PassthroughFn> {
		self.passthrough.get(id)
	}

	pub fn contains(&self, id: &MethodId) -> bool {
		self.methods.contains_key(id) || self.passthrough.contains_key(id)
	}

	/// Number of scanned leaf and section methods.
	pub fn len(&self) -> usize {
		self.methods.len()
	}

	pub fn is_empty(&self) -> bool {
		self.methods.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &MethodDescriptor> {
		self.methods.values()
	}

	/// Interfaces reached by the scan, in visiting order.
	pub fn interfaces(&self) -> &[&'static str] {
		&self.interfaces
	}
}

impl std::fmt::Debug for DescriptorCache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DescriptorCache")
			.field("root", &self.root)
			.field("root_prefix", &self.root_prefix)
			.field("methods", &self.methods.len())
			.field("passthrough", &self.passthrough.len())
			.field("interfaces", &self.interfaces)
			.finish()
	}
}

fn check_config(root: &InterfaceDecl, config: &MessagesConfig) -> Result<(), DeclarationError> {
	if !is_valid_delimiter(config.delimiter) {
		return Err(DeclarationError::ConfigDelimiter(config.delimiter));
	}
	if config.has_blank_root_prefix() {
		return Err(DeclarationError::BlankRootPrefix);
	}
	if let Some(delimiter) = root.section_marker().and_then(|m| m.declared_delimiter())
		&& !is_valid_delimiter(delimiter)
	{
		return Err(DeclarationError::InterfaceDelimiter {
			interface: root.name(),
			delimiter,
		});
	}
	Ok(())
}

fn root_prefix(root: &InterfaceDecl, config: &MessagesConfig) -> String {
	let marker = root.section_marker();
	let prefix = match (&config.root_prefix, marker) {
		(Some(prefix), _) => prefix.clone(),
		(None, Some(marker)) => match marker.prefix() {
			Some(prefix) => prefix.to_owned(),
			None => config.key_style.apply(root.simple_name()),
		},
		(None, None) => return String::new(),
	};
	if prefix.is_empty() {
		return prefix;
	}
	let delimiter = marker.map_or(config.delimiter, |m| m.delimiter_or(config.delimiter));
	let mut prefix = prefix;
	prefix.push(delimiter);
	prefix
}

struct Scanner<'a> {
	config: &'a MessagesConfig,
	methods: FxHashMap<MethodId, MethodDescriptor>,
	passthrough: FxHashMap<MethodId, PassthroughFn>,
	visited: FxHashSet<&'static str>,
	interfaces: Vec<&'static str>,
}

impl Scanner<'_> {
	fn visit(&mut self, decl: &InterfaceDecl) -> Result<(), DeclarationError> {
		if !self.visited.insert(decl.name()) {
			return Ok(());
		}
		self.interfaces.push(decl.name());

		for method in decl.methods() {
			let id = method.id(decl.name());
			if self.methods.contains_key(&id) || self.passthrough.contains_key(&id) {
				tracing::trace!(method = %id, "method already scanned");
				continue;
			}
			if let Some(body) = method.passthrough_body() {
				self.passthrough.insert(id, body.clone());
				continue;
			}
			let params = params(id, method)?;

			match (method.key_marker(), method.section_marker()) {
				(Some(_), Some(_)) => return Err(DeclarationError::DualMarker { method: id }),
				(None, None) => return Err(DeclarationError::MissingMarker { method: id }),
				(Some(marker), None) => {
					let key = match marker.key() {
						Some(key) => key.to_owned(),
						None => self.config.key_style.apply(method.name()),
					};
					self.methods.insert(
						id,
						MethodDescriptor {
							id,
							key: key.into_boxed_str(),
							kind: DescriptorKind::Leaf,
							params,
							returns: *method.return_shape(),
						},
					);
				}
				(None, Some(marker)) => {
					let ReturnShape::Interface { name, declare } = *method.return_shape() else {
						return Err(DeclarationError::SectionNotInterface {
							method: id,
							found: method.return_shape().describe(),
						});
					};
					if let Some(delimiter) = marker.declared_delimiter()
						&& !is_valid_delimiter(delimiter)
					{
						return Err(DeclarationError::SectionDelimiter {
							method: id,
							delimiter,
						});
					}
					let nested = declare();
					let key = match marker.prefix() {
						Some(prefix) => prefix.to_owned(),
						None => self.config.key_style.apply(nested.simple_name()),
					};
					self.methods.insert(
						id,
						MethodDescriptor {
							id,
							key: key.into_boxed_str(),
							kind: DescriptorKind::Section {
								interface: name,
								delimiter: marker.delimiter_or(self.config.delimiter),
							},
							params,
							returns: *method.return_shape(),
						},
					);
					self.visit(&nested)?;
				}
			}
		}

		for parent in decl.parents() {
			self.visit(&parent)?;
		}
		Ok(())
	}
}

fn params(id: MethodId, method: &MethodDecl) -> Result<Box<[ParamDescriptor]>, DeclarationError> {
	let expected = method.signature().len();
	let declared = method.params();
	if declared.is_empty() {
		return Ok((0..expected)
			.map(|index| ParamDescriptor {
				name: format!("arg{index}").into_boxed_str(),
				placeholder: None,
			})
			.collect());
	}
	if declared.len() != expected {
		return Err(DeclarationError::ParameterMismatch {
			method: id,
			declared: declared.len(),
			expected,
		});
	}
	Ok(declared
		.iter()
		.enumerate()
		.map(|(index, param)| ParamDescriptor {
			name: match param.name() {
				Some(name) => name.into(),
				None => format!("arg{index}").into_boxed_str(),
			},
			placeholder: param.placeholder_key().map(Into::into),
		})
		.collect())
}
