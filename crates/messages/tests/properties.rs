use parley_messages::{
	Component, KeyStyle, MessageInterface, MessagesConfig, PlaceholderValue, message_interface,
};
use proptest::prelude::*;

#[allow(unused_imports, reason = "library dependencies linked into this test binary")]
use {
	heck as _, indexmap as _, parley_holder as _, parley_macros as _, rustc_hash as _, serde as _,
	thiserror as _, toml as _, tracing as _,
};
#[allow(unused_imports, reason = "dev-dependencies used by other test targets")]
use {pretty_assertions as _, rstest as _, tracing_subscriber as _};

#[message_interface]
pub trait ShopMessages {
	#[key]
	fn purchased(&self, buyer: String) -> Component;

	#[section(prefix = "cart")]
	fn cart(&self) -> CartMessagesProxy;
}

#[message_interface]
pub trait CartMessages {
	#[key]
	fn checkout_done(&self) -> Component;
}

fn delimiter() -> impl Strategy<Value = char> {
	prop::sample::select(vec!['.', '/', ':', '-', '#'])
}

proptest! {
	#[test]
	fn key_resolvers_outrank_type_resolvers(
		buyer in ".{0,24}",
		key_tag in "[a-z]{1,6}",
		type_tag in "[A-Z]{1,6}",
	) {
		let expected = Component::text(format!("{key_tag}{buyer}"));
		let shop = ShopMessagesProxy::builder()
			.arguments(move |args| {
				args.type_resolver(move |buyer: &String| Component::text(format!("{type_tag}{buyer}")))
					.key_resolver("buyer", move |buyer: &String| Component::text(format!("{key_tag}{buyer}")));
			})
			.build()
			.unwrap();

		let rendered = shop.purchased(buyer);
		let placeholders = rendered.as_translatable().unwrap().placeholders();

		prop_assert_eq!(placeholders.get("buyer"), Some(&PlaceholderValue::Component(expected)));
	}

	#[test]
	fn keys_join_prefix_section_and_fragment(
		root in "[a-z][a-z0-9_]{0,11}",
		delimiter in delimiter(),
		style in prop::sample::select(vec![KeyStyle::SnakeCase, KeyStyle::KebabCase, KeyStyle::LowerCamelCase]),
	) {
		let config = MessagesConfig {
			key_style: style,
			delimiter,
			root_prefix: Some(root.clone()),
		};
		let shop = ShopMessagesProxy::builder().config(config).build().unwrap();

		let key = shop.cart().checkout_done().key().map(str::to_owned);

		let fragment = style.apply("checkout_done");
		prop_assert_eq!(key, Some(format!("{root}{delimiter}cart{delimiter}{fragment}")));
	}

	#[test]
	fn scans_are_deterministic(delimiter in delimiter()) {
		let config = MessagesConfig { delimiter, ..MessagesConfig::default() };
		let first = ShopMessagesProxy::builder().config(config.clone()).build().unwrap();
		let second = ShopMessagesProxy::builder().config(config).build().unwrap();

		let mut left: Vec<_> = first.dispatcher().descriptors().iter().cloned().collect();
		let mut right: Vec<_> = second.dispatcher().descriptors().iter().cloned().collect();
		left.sort_by_key(|d| d.id());
		right.sort_by_key(|d| d.id());

		prop_assert_eq!(left, right);
	}
}
