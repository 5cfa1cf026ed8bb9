use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use pretty_assertions::assert_eq;

use super::*;

fn counting_factory() -> (Arc<AtomicUsize>, impl Fn() -> usize + Send + Sync + 'static) {
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&calls);
	(calls, move || counter.fetch_add(1, Ordering::SeqCst) + 1)
}

#[test]
fn construction_builds_once() {
	let (calls, factory) = counting_factory();
	let holder = ReloadableHolder::infallible(factory);

	assert_eq!(calls.load(Ordering::SeqCst), 1);
	assert_eq!(*holder.get(), 1);
	assert_eq!(*holder.get(), 1, "get must not rebuild");
}

#[test]
fn reload_publishes_new_value() {
	let (calls, factory) = counting_factory();
	let holder = ReloadableHolder::infallible(factory);

	let published = holder.reload().expect("infallible factory");
	assert_eq!(*published, 2);
	assert_eq!(*holder.get(), 2);
	assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn failed_initial_build_is_fatal() {
	let result = ReloadableHolder::<String>::of(|| Err(io::Error::other("missing translations")));

	let Err(HolderError::InitialBuild { source, .. }) = result else {
		panic!("expected InitialBuild error");
	};
	assert_eq!(source.to_string(), "missing translations");
}

#[test]
fn failed_reload_keeps_previous_value() {
	let fail = Arc::new(AtomicBool::new(false));
	let flag = Arc::clone(&fail);
	let version = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&version);
	let holder = ReloadableHolder::of(move || {
		if flag.load(Ordering::SeqCst) {
			return Err(io::Error::other("broken config"));
		}
		Ok(format!("v{}", counter.fetch_add(1, Ordering::SeqCst)))
	})
	.expect("initial build succeeds");

	assert_eq!(holder.get().as_str(), "v0");

	fail.store(true, Ordering::SeqCst);
	let err = holder.reload().expect_err("factory fails");
	assert!(matches!(err, HolderError::Reload { .. }));
	assert!(err.to_string().contains("broken config"));
	assert_eq!(holder.get().as_str(), "v0");

	fail.store(false, Ordering::SeqCst);
	holder.reload().expect("factory recovers");
	assert_eq!(holder.get().as_str(), "v1");
}

#[test]
fn readers_keep_their_snapshot_across_reload() {
	let (_, factory) = counting_factory();
	let holder = ReloadableHolder::infallible(factory);

	let before = holder.get();
	holder.reload().expect("infallible factory");

	assert_eq!(*before, 1);
	assert_eq!(**holder.load(), 2);
}

#[test]
fn debug_shows_current_value() {
	let holder = ReloadableHolder::infallible(|| 7_u8);
	assert_eq!(format!("{holder:?}"), "ReloadableHolder { current: 7, .. }");
}
