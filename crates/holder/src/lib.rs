//! Reloadable value holders.
//!
//! A [`ReloadableHolder`] wraps a factory and the most recent value it produced.
//! Readers call [`ReloadableHolder::get`] and never block; [`ReloadableHolder::reload`]
//! runs the factory again and publishes the result with a single atomic swap.
//!
//! # Invariants
//!
//! - A holder is never observed without a value: construction performs one
//!   synchronous build and fails if it cannot.
//! - A failed reload leaves the previously published value in place and reports
//!   the failure to the caller.
//! - Concurrent reloads are not ordered against each other; the last successful
//!   publish wins.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use arc_swap::{ArcSwap, Guard};

#[cfg(test)]
mod tests;
#[cfg(test)]
#[allow(unused_imports, reason = "dev-dependency used by the integration tests")]
use tracing_subscriber as _;

/// Error type produced by holder factories once erased.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

type Factory<T> = Box<dyn Fn() -> Result<T, BoxError> + Send + Sync>;

/// Failures surfaced by [`ReloadableHolder`].
#[derive(Debug, thiserror::Error)]
pub enum HolderError {
	/// The factory failed while building the first value; there is nothing to fall back to.
	#[error("initial build of {type_name} failed: {source}")]
	InitialBuild {
		type_name: &'static str,
		#[source]
		source: BoxError,
	},
	/// The factory failed during a reload; the previous value is still published.
	#[error("reload of {type_name} failed, keeping previous value: {source}")]
	Reload {
		type_name: &'static str,
		#[source]
		source: BoxError,
	},
}

/// Holds the latest value built by a factory and swaps it atomically on reload.
pub struct ReloadableHolder<T> {
	factory: Factory<T>,
	current: ArcSwap<T>,
}

impl<T: 'static> ReloadableHolder<T> {
	/// Builds a holder from a fallible factory, running it once before returning.
	pub fn of<F, E>(factory: F) -> Result<Self, HolderError>
	where
		F: Fn() -> Result<T, E> + Send + Sync + 'static,
		E: Into<BoxError>,
	{
		let factory: Factory<T> = Box::new(move || factory().map_err(Into::into));
		let initial = factory().map_err(|source| HolderError::InitialBuild {
			type_name: type_name::<T>(),
			source,
		})?;
		Ok(Self {
			factory,
			current: ArcSwap::from_pointee(initial),
		})
	}

	/// Builds a holder from a factory that cannot fail.
	pub fn infallible<F>(factory: F) -> Self
	where
		F: Fn() -> T + Send + Sync + 'static,
	{
		let initial = factory();
		Self {
			factory: Box::new(move || Ok(factory())),
			current: ArcSwap::from_pointee(initial),
		}
	}

	/// Returns the most recently published value.
	#[inline]
	pub fn get(&self) -> Arc<T> {
		self.current.load_full()
	}

	/// Borrows the current value without touching its reference count.
	///
	/// The guard pins the value it was loaded with; hold it only briefly.
	#[inline]
	pub fn load(&self) -> Guard<Arc<T>> {
		self.current.load()
	}

	/// Runs the factory and publishes its value.
	///
	/// On failure the previous value stays published and the error is returned.
	pub fn reload(&self) -> Result<Arc<T>, HolderError> {
		match (self.factory)() {
			Ok(value) => {
				let value = Arc::new(value);
				self.current.store(Arc::clone(&value));
				tracing::debug!(holder = type_name::<T>(), "reloaded value published");
				Ok(value)
			}
			Err(source) => {
				tracing::warn!(
					holder = type_name::<T>(),
					error = %source,
					"reload failed; keeping previous value"
				);
				Err(HolderError::Reload {
					type_name: type_name::<T>(),
					source,
				})
			}
		}
	}
}

impl<T: fmt::Debug> fmt::Debug for ReloadableHolder<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ReloadableHolder")
			.field("current", &**self.current.load())
			.finish_non_exhaustive()
	}
}
