//! Message framework configuration.
//!
//! Loading the text from disk is the host's job; this module only parses and
//! validates it. A [`MessagesConfig`] can be kept in a `ReloadableHolder` so a
//! reload picks up new settings for proxies built afterwards.

use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase};
use serde::Deserialize;
use thiserror::Error;

/// Case transform applied to derived key fragments and placeholder names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStyle {
	/// `commandReloadSuccess` becomes `command_reload_success`.
	#[default]
	SnakeCase,
	/// `commandReloadSuccess` becomes `command-reload-success`.
	KebabCase,
	/// `CommandReload` becomes `commandReload`.
	LowerCamelCase,
	/// Names are used as written.
	Verbatim,
}

impl KeyStyle {
	pub fn apply(self, name: &str) -> String {
		match self {
			Self::SnakeCase => name.to_snake_case(),
			Self::KebabCase => name.to_kebab_case(),
			Self::LowerCamelCase => name.to_lower_camel_case(),
			Self::Verbatim => name.to_owned(),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MessagesConfig {
	pub key_style: KeyStyle,
	/// Section delimiter used when a section marker does not name one.
	pub delimiter: char,
	/// Replaces the root interface's own section prefix.
	pub root_prefix: Option<String>,
}

impl Default for MessagesConfig {
	fn default() -> Self {
		Self {
			key_style: KeyStyle::default(),
			delimiter: '.',
			root_prefix: None,
		}
	}
}

impl MessagesConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if !is_valid_delimiter(self.delimiter) {
			return Err(ConfigError::InvalidDelimiter(self.delimiter));
		}
		if self.has_blank_root_prefix() {
			return Err(ConfigError::EmptyRootPrefix);
		}
		Ok(())
	}

	pub(crate) fn has_blank_root_prefix(&self) -> bool {
		self.root_prefix
			.as_deref()
			.is_some_and(|prefix| prefix.trim().is_empty())
	}
}

/// Whether `delimiter` may join key segments. Letters, digits and whitespace
/// would merge into the fragments around them.
pub fn is_valid_delimiter(delimiter: char) -> bool {
	!delimiter.is_alphanumeric() && !delimiter.is_whitespace()
}

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to parse messages config: {0}")]
	Toml(#[from] toml::de::Error),
	#[error("root_prefix must not be empty; omit it to use the declared prefix")]
	EmptyRootPrefix,
	#[error("delimiter {0:?} must be punctuation")]
	InvalidDelimiter(char),
}
