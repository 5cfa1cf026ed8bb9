use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::*;
use crate::argument::{Opaque, Value};
use crate::config::MessagesConfig;
use crate::declaration::{InterfaceDecl, MethodDecl, MethodId, ParamDecl};
use crate::descriptor::DescriptorCache;
use crate::placeholder::PlaceholderValue;

const IFACE: &str = "tests::Greetings";

#[derive(Debug)]
struct Player {
	name: &'static str,
}

impl Recipient for Player {
	fn send_message(&self, _message: &Component) {}
}

#[derive(Debug, Clone, Copy)]
struct Level(u8);

impl fmt::Display for Level {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "level {}", self.0)
	}
}

const GREET: MethodId = MethodId::new(IFACE, "greet", &["RecipientRef", "&str", "Level"]);

fn cache() -> DescriptorCache {
	let decl = InterfaceDecl::new(IFACE).method(
		MethodDecl::leaf("greet", &["RecipientRef", "&str", "Level"])
			.param(ParamDecl::named("viewer"))
			.param(ParamDecl::named("playerName"))
			.param(ParamDecl::named("level").placeholder("lvl")),
	);
	DescriptorCache::scan(&decl, &MessagesConfig::default()).unwrap()
}

fn arguments(viewer: RecipientRef) -> Arguments {
	Arguments::new()
		.with(viewer)
		.with("Steve")
		.with(Value(Level(3)))
}

fn parsed(value: &str) -> PlaceholderValue {
	PlaceholderValue::Parsed(value.into())
}

fn text(value: &str) -> PlaceholderValue {
	PlaceholderValue::Component(Component::text(value))
}

#[test]
fn structural_fallback_binds_values_by_string_form() {
	let cache = cache();
	let descriptor = cache.get(&GREET).unwrap();
	let context = InvocationContext::new(descriptor, arguments(Arc::new(Player { name: "alex" }))).unwrap();

	let resolved = ArgumentResolver::builder().build().resolve(&context).unwrap();

	assert_eq!(resolved.keys().collect::<Vec<_>>(), ["player_name", "lvl"]);
	assert_eq!(resolved.get("player_name"), Some(&parsed("Steve")));
	assert_eq!(resolved.get("lvl"), Some(&parsed("level 3")));
}

#[test]
fn recipient_is_first_recipient_argument() {
	let cache = cache();
	let descriptor = cache.get(&GREET).unwrap();
	let viewer: RecipientRef = Arc::new(Player { name: "alex" });
	let context = InvocationContext::new(descriptor, arguments(Arc::clone(&viewer))).unwrap();

	assert!(Arc::ptr_eq(context.recipient(), &viewer));
}

#[test]
fn missing_recipient_defaults_to_empty() {
	let decl = InterfaceDecl::new(IFACE).method(MethodDecl::leaf("plain", &[]));
	let cache = DescriptorCache::scan(&decl, &MessagesConfig::default()).unwrap();
	let descriptor = cache.get(&MethodId::new(IFACE, "plain", &[])).unwrap();
	let context = InvocationContext::new(descriptor, Arguments::new()).unwrap();

	assert!(EmptyRecipient::is(&**context.recipient()));
}

#[test]
fn null_slot_is_rejected_with_its_index() {
	let cache = cache();
	let descriptor = cache.get(&GREET).unwrap();
	let args = Arguments::new()
		.with(EmptyRecipient::shared())
		.null()
		.with(Value(Level(1)));

	let err = InvocationContext::new(descriptor, args).err();
	assert_eq!(
		err,
		Some(CallError::NullArgument {
			method: GREET,
			index: 1
		})
	);
}

#[test]
fn arity_is_checked() {
	let cache = cache();
	let descriptor = cache.get(&GREET).unwrap();

	let err = InvocationContext::new(descriptor, Arguments::new().with("x")).err();
	assert_eq!(
		err,
		Some(CallError::ArityMismatch {
			method: GREET,
			expected: 3,
			found: 1
		})
	);
}

#[test]
fn key_resolver_beats_type_resolver() {
	let cache = cache();
	let descriptor = cache.get(&GREET).unwrap();
	let context = InvocationContext::new(descriptor, arguments(EmptyRecipient::shared())).unwrap();

	let mut builder = ArgumentResolver::builder();
	builder
		.type_resolver(|name: &String| Component::text(format!("type:{name}")))
		.key_resolver("player_name", |name: &String| Component::text(format!("key:{name}")));
	let resolved = builder.build().resolve(&context).unwrap();

	assert_eq!(resolved.get("player_name"), Some(&text("key:Steve")));
}

#[test]
fn key_resolver_type_mismatch_rejects_call() {
	let cache = cache();
	let descriptor = cache.get(&GREET).unwrap();
	let context = InvocationContext::new(descriptor, arguments(EmptyRecipient::shared())).unwrap();

	let mut builder = ArgumentResolver::builder();
	builder.key_resolver("lvl", |n: &u32| Component::text(n.to_string()));
	let err = builder.build().resolve(&context).unwrap_err();

	assert_eq!(
		err,
		CallError::KeyResolverType {
			key: "lvl".into(),
			expected: "u32",
			found: std::any::type_name::<Level>(),
		}
	);
}

#[test]
fn exact_type_resolver_wins_over_earlier_matching_resolver() {
	let cache = cache();
	let descriptor = cache.get(&GREET).unwrap();
	let context = InvocationContext::new(descriptor, arguments(EmptyRecipient::shared())).unwrap();

	let mut builder = ArgumentResolver::builder();
	builder
		.type_resolver_matching(
			"any value",
			|argument| matches!(argument, Argument::Value(_)),
			|_| Component::text("matched"),
		)
		.type_resolver(|level: &Level| Component::text(format!("L{}", level.0)));
	let resolved = builder.build().resolve(&context).unwrap();

	assert_eq!(resolved.get("lvl"), Some(&text("L3")));
	assert_eq!(resolved.get("player_name"), Some(&text("matched")));
}

#[test]
fn first_registered_matching_resolver_wins() {
	let cache = cache();
	let descriptor = cache.get(&GREET).unwrap();
	let context = InvocationContext::new(descriptor, arguments(EmptyRecipient::shared())).unwrap();

	let mut builder = ArgumentResolver::builder();
	builder
		.type_resolver_matching("first", |_| true, |_| Component::text("first"))
		.type_resolver_matching("second", |_| true, |_| Component::text("second"));
	let resolved = builder.build().resolve(&context).unwrap();

	assert_eq!(resolved.get("lvl"), Some(&text("first")));
}

#[test]
fn re_registering_a_type_replaces_its_resolver() {
	let cache = cache();
	let descriptor = cache.get(&GREET).unwrap();
	let context = InvocationContext::new(descriptor, arguments(EmptyRecipient::shared())).unwrap();

	let mut builder = ArgumentResolver::builder();
	builder
		.type_resolver(|_: &Level| Component::text("old"))
		.type_resolver(|_: &Level| Component::text("new"));
	let resolver = builder.build();

	assert_eq!(resolver.resolve(&context).unwrap().get("lvl"), Some(&text("new")));
	assert_eq!(format!("{resolver:?}").matches("Level").count(), 1);
}

#[test]
fn type_resolver_sees_concrete_recipient_type() {
	let cache = cache();
	let descriptor = cache.get(&GREET).unwrap();
	let context = InvocationContext::new(descriptor, arguments(Arc::new(Player { name: "alex" }))).unwrap();

	let mut builder = ArgumentResolver::builder();
	builder.type_resolver(|player: &Player| Component::text(player.name));
	let resolved = builder.build().resolve(&context).unwrap();

	assert_eq!(resolved.get("viewer"), Some(&text("alex")));
}

#[test]
fn contextual_placeholders_have_lowest_precedence() {
	let cache = cache();
	let descriptor = cache.get(&GREET).unwrap();
	let context = InvocationContext::new(descriptor, arguments(Arc::new(Player { name: "alex" }))).unwrap();

	let mut builder = ArgumentResolver::builder();
	builder.placeholders(|recipient| {
		TagResolver::from_iter([
			Placeholder::parsed("player_name", "ambient"),
			Placeholder::parsed("server", format!("{recipient:?}")),
		])
	});
	let resolved = builder.build().resolve(&context).unwrap();

	assert_eq!(resolved.get("player_name"), Some(&parsed("Steve")));
	assert_eq!(
		resolved.get("server"),
		Some(&parsed("Player { name: \"alex\" }"))
	);
}

#[test]
fn resolver_arguments_are_spliced_and_components_bound() {
	let decl = InterfaceDecl::new(IFACE).method(
		MethodDecl::leaf("mixed", &["TagResolver", "Component"])
			.param(ParamDecl::named("extra"))
			.param(ParamDecl::named("item")),
	);
	let cache = DescriptorCache::scan(&decl, &MessagesConfig::default()).unwrap();
	let descriptor = cache
		.get(&MethodId::new(IFACE, "mixed", &["TagResolver", "Component"]))
		.unwrap();
	let args = Arguments::new()
		.with(TagResolver::single(Placeholder::parsed("a", "1")))
		.with(Component::text("sword"));
	let context = InvocationContext::new(descriptor, args).unwrap();

	let resolved = ArgumentResolver::builder().build().resolve(&context).unwrap();

	assert_eq!(resolved.keys().collect::<Vec<_>>(), ["a", "item"]);
	assert_eq!(resolved.get("item"), Some(&text("sword")));
}

#[test]
fn custom_key_formatter_applies_to_unnamed_overrides() {
	let cache = cache();
	let descriptor = cache.get(&GREET).unwrap();
	let context = InvocationContext::new(descriptor, arguments(EmptyRecipient::shared())).unwrap();

	let mut builder = ArgumentResolver::builder();
	builder.key_formatter(|name| name.to_uppercase());
	let resolved = builder.build().resolve(&context).unwrap();

	assert_eq!(resolved.keys().collect::<Vec<_>>(), ["PLAYERNAME", "lvl"]);
}

#[test]
fn build_with_uses_style_unless_formatter_set() {
	let cache = cache();
	let descriptor = cache.get(&GREET).unwrap();
	let param = &descriptor.params()[1];

	let styled = ArgumentResolver::builder().build_with(KeyStyle::KebabCase);
	assert_eq!(styled.placeholder_key(param), "player-name");

	let mut builder = ArgumentResolver::builder();
	builder.key_formatter(str::to_owned);
	assert_eq!(builder.build_with(KeyStyle::KebabCase).placeholder_key(param), "playerName");
}

#[derive(Debug, PartialEq)]
struct Stats {
	kills: u32,
}

fn stats_context(descriptor: &MethodDescriptor) -> InvocationContext<'_> {
	let arguments = Arguments::new()
		.with(EmptyRecipient::shared())
		.with("Steve")
		.with(Opaque(Stats { kills: 7 }));
	InvocationContext::new(descriptor, arguments).unwrap()
}

#[test]
fn opaque_values_reach_type_resolvers() {
	let cache = cache();
	let context = stats_context(cache.get(&GREET).unwrap());

	let mut builder = ArgumentResolver::builder();
	builder.type_resolver(|stats: &Stats| Component::text(format!("{} kills", stats.kills)));
	let resolved = builder.build().resolve(&context).unwrap();

	assert_eq!(resolved.get("lvl"), Some(&text("7 kills")));
}

#[test]
fn opaque_values_fall_back_to_their_type_name() {
	let cache = cache();
	let context = stats_context(cache.get(&GREET).unwrap());

	let resolved = ArgumentResolver::builder().build().resolve(&context).unwrap();

	assert_eq!(resolved.get("lvl"), Some(&parsed(type_name::<Stats>())));
	assert_eq!(context.arguments()[2].type_name(), type_name::<Stats>());
	assert_eq!(context.arguments()[2].downcast_ref::<Stats>(), Some(&Stats { kills: 7 }));
}
