//! Error types for declaration scanning and message invocation.

use thiserror::Error;

use crate::declaration::MethodId;

/// A message interface declaration that cannot be turned into a proxy.
///
/// Raised once while building the proxy; nothing is cached on failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
	#[error("method {method} is marked as both a key and a section")]
	DualMarker { method: MethodId },
	#[error("method {method} has neither a key nor a section marker")]
	MissingMarker { method: MethodId },
	#[error("section method {method} must return a message interface, found {found}")]
	SectionNotInterface { method: MethodId, found: &'static str },
	#[error("method {method} declares {declared} parameters but its signature has {expected}")]
	ParameterMismatch {
		method: MethodId,
		declared: usize,
		expected: usize,
	},
	#[error("section {method} declares delimiter {delimiter:?}, which must be punctuation")]
	SectionDelimiter { method: MethodId, delimiter: char },
	#[error("interface {interface} declares delimiter {delimiter:?}, which must be punctuation")]
	InterfaceDelimiter {
		interface: &'static str,
		delimiter: char,
	},
	#[error("configured delimiter {0:?} must be punctuation")]
	ConfigDelimiter(char),
	#[error("configured root_prefix must not be blank")]
	BlankRootPrefix,
}

/// A single invocation that was rejected.
///
/// No side effects happen before the error is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
	#[error("argument {index} of {method} is null")]
	NullArgument { method: MethodId, index: usize },
	#[error("{method} expects {expected} arguments, got {found}")]
	ArityMismatch {
		method: MethodId,
		expected: usize,
		found: usize,
	},
	#[error("{method} returns {found}, which is neither a component nor unit")]
	UnsupportedReturn { method: MethodId, found: &'static str },
	#[error("{method} was not scanned for this proxy")]
	UnscannedMethod { method: MethodId },
	#[error("{method} is a leaf, not a section")]
	NotASection { method: MethodId },
	#[error("{method} is a section, not a leaf")]
	NotALeaf { method: MethodId },
	#[error("section {method} opens {found}, not {expected}")]
	SectionTypeMismatch {
		method: MethodId,
		expected: &'static str,
		found: &'static str,
	},
	#[error("key resolver for {key:?} expects {expected}, got {found}")]
	KeyResolverType {
		key: Box<str>,
		expected: &'static str,
		found: &'static str,
	},
	#[error("{method} was declared to return {expected} but dispatch produced {found}")]
	ReturnMismatch {
		method: MethodId,
		expected: &'static str,
		found: &'static str,
	},
}
