//! `#[message_interface]` implementation.
//!
//! Turns an annotated trait into:
//! - the trait itself, with message attributes stripped,
//! - a `<Trait>Proxy` struct wrapping a dispatcher,
//! - `MessageInterface` for the proxy, building the interface declaration,
//! - the trait implemented for the proxy, each method delegating to the dispatcher,
//! - identity impls (`PartialEq`, `Eq`, `Hash`, `Debug`, `Display`).

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
	Attribute, FnArg, GenericArgument, Ident, ItemTrait, LitChar, LitStr, Meta, Pat, PathArguments,
	ReturnType, Signature, TraitItem, TraitItemFn, Type, meta::ParseNestedMeta, parse_macro_input,
};

#[derive(Default)]
struct InterfaceArgs {
	prefix: Option<LitStr>,
	delimiter: Option<LitChar>,
	section: bool,
	proxy: Option<Ident>,
}

enum Role {
	Leaf(Option<LitStr>),
	Section {
		prefix: Option<LitStr>,
		delimiter: Option<LitChar>,
	},
}

enum Shape {
	Unit,
	Component,
	Interface(Type),
	Other(String),
}

struct Param {
	name: Option<String>,
	placeholder: Option<LitStr>,
	ty: Type,
}

struct Method {
	sig: Signature,
	role: Role,
	params: Vec<Param>,
	shape: Shape,
	fallible: bool,
}

pub fn message_interface(attr: TokenStream, item: TokenStream) -> TokenStream {
	let mut args = InterfaceArgs::default();
	let parser = syn::meta::parser(|meta| {
		if meta.path.is_ident("prefix") {
			args.prefix = Some(meta.value()?.parse()?);
			Ok(())
		} else if meta.path.is_ident("delimiter") {
			args.delimiter = Some(parse_delimiter(&meta)?);
			Ok(())
		} else if meta.path.is_ident("section") {
			args.section = true;
			Ok(())
		} else if meta.path.is_ident("proxy") {
			args.proxy = Some(meta.value()?.parse()?);
			Ok(())
		} else {
			Err(meta.error("expected `prefix`, `delimiter`, `section` or `proxy`"))
		}
	});
	parse_macro_input!(attr with parser);
	let item = parse_macro_input!(item as ItemTrait);

	match expand(args, item) {
		Ok(tokens) => tokens.into(),
		Err(error) => error.to_compile_error().into(),
	}
}

fn expand(args: InterfaceArgs, mut item: ItemTrait) -> syn::Result<TokenStream2> {
	if !item.generics.params.is_empty() {
		return Err(syn::Error::new_spanned(
			&item.generics,
			"message interfaces cannot be generic",
		));
	}
	if !item.supertraits.is_empty() {
		return Err(syn::Error::new_spanned(
			&item.supertraits,
			"message interfaces cannot declare supertraits; compose them with sections or `InterfaceDecl::extends`",
		));
	}

	let mut methods = Vec::new();
	for trait_item in &mut item.items {
		match trait_item {
			TraitItem::Fn(method) => {
				if let Some(method) = parse_method(method)? {
					methods.push(method);
				}
			}
			other => {
				return Err(syn::Error::new_spanned(
					other,
					"message interfaces may only contain methods",
				));
			}
		}
	}

	let trait_ident = &item.ident;
	let vis = &item.vis;
	let proxy = args
		.proxy
		.clone()
		.unwrap_or_else(|| format_ident!("{}Proxy", trait_ident));
	let private = quote!(::parley_messages::__private);

	let root_section = root_section(&args);
	let decls = methods.iter().map(|method| method_decl(method, &private));
	let impls = methods
		.iter()
		.map(|method| method_impl(method, &proxy, &private));

	Ok(quote! {
		#item

		#[doc = ::core::concat!("Message proxy implementing [`", ::core::stringify!(#trait_ident), "`].")]
		#[derive(Clone)]
		#vis struct #proxy {
			dispatcher: #private::Dispatcher,
		}

		impl #proxy {
			/// Starts building a proxy for this interface.
			#vis fn builder() -> #private::ProxyBuilder<Self> {
				#private::ProxyBuilder::new()
			}
		}

		impl #private::MessageInterface for #proxy {
			const NAME: &'static str =
				::core::concat!(::core::module_path!(), "::", ::core::stringify!(#trait_ident));

			fn declaration() -> #private::InterfaceDecl {
				#private::InterfaceDecl::new(<Self as #private::MessageInterface>::NAME)
					#root_section
					#(.method(#decls))*
			}

			fn from_dispatcher(dispatcher: #private::Dispatcher) -> Self {
				Self { dispatcher }
			}

			fn dispatcher(&self) -> &#private::Dispatcher {
				&self.dispatcher
			}
		}

		impl #trait_ident for #proxy {
			#(#impls)*
		}

		impl ::core::cmp::PartialEq for #proxy {
			fn eq(&self, other: &Self) -> bool {
				self.dispatcher == other.dispatcher
			}
		}

		impl ::core::cmp::Eq for #proxy {}

		impl ::core::hash::Hash for #proxy {
			fn hash<H: ::core::hash::Hasher>(&self, state: &mut H) {
				::core::hash::Hash::hash(&self.dispatcher, state);
			}
		}

		impl ::core::fmt::Debug for #proxy {
			fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
				f.debug_tuple(::core::stringify!(#proxy))
					.field(&self.dispatcher)
					.finish()
			}
		}

		impl ::core::fmt::Display for #proxy {
			fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
				::core::fmt::Display::fmt(&self.dispatcher, f)
			}
		}
	})
}

fn root_section(args: &InterfaceArgs) -> TokenStream2 {
	if args.prefix.is_none() && args.delimiter.is_none() && !args.section {
		return TokenStream2::new();
	}
	let marker = section_marker(args.prefix.as_ref(), args.delimiter.as_ref());
	quote!(.section(#marker))
}

fn section_marker(prefix: Option<&LitStr>, delimiter: Option<&LitChar>) -> TokenStream2 {
	let private = quote!(::parley_messages::__private);
	let base = match prefix {
		Some(prefix) => quote!(#private::SectionMarker::prefixed(#prefix)),
		None => quote!(#private::SectionMarker::derived()),
	};
	match delimiter {
		Some(delimiter) => quote!(#base.delimiter(#delimiter)),
		None => base,
	}
}

/// Classifies one trait method, stripping its message attributes in place.
///
/// Returns `None` for default-bodied methods, which stay on the trait as-is.
fn parse_method(method: &mut TraitItemFn) -> syn::Result<Option<Method>> {
	let mut key = None;
	let mut section = None;
	let mut kept = Vec::with_capacity(method.attrs.len());
	for attr in method.attrs.drain(..) {
		if attr.path().is_ident("key") {
			if key.is_some() {
				return Err(syn::Error::new_spanned(attr, "duplicate #[key]"));
			}
			key = Some(parse_key(&attr)?);
		} else if attr.path().is_ident("section") {
			if section.is_some() {
				return Err(syn::Error::new_spanned(attr, "duplicate #[section]"));
			}
			section = Some(parse_section(&attr)?);
		} else {
			kept.push(attr);
		}
	}
	method.attrs = kept;

	let mut params = Vec::new();
	for input in &mut method.sig.inputs {
		let FnArg::Typed(arg) = input else {
			continue;
		};
		let mut placeholder = None;
		let mut kept = Vec::with_capacity(arg.attrs.len());
		for attr in arg.attrs.drain(..) {
			if attr.path().is_ident("placeholder") {
				placeholder = Some(attr.parse_args::<LitStr>()?);
			} else {
				kept.push(attr);
			}
		}
		arg.attrs = kept;
		let name = match &*arg.pat {
			Pat::Ident(pat) => Some(pat.ident.to_string()),
			_ => None,
		};
		params.push(Param {
			name,
			placeholder,
			ty: (*arg.ty).clone(),
		});
	}

	let sig = &method.sig;
	if method.default.is_some() {
		if key.is_some() || section.is_some() {
			return Err(syn::Error::new_spanned(
				sig,
				"methods with a default body are passed through and cannot carry #[key] or #[section]",
			));
		}
		return Ok(None);
	}

	check_signature(sig)?;

	let role = match (key, section) {
		(Some(key), None) => Role::Leaf(key),
		(None, Some((prefix, delimiter))) => Role::Section { prefix, delimiter },
		(Some(_), Some(_)) => {
			return Err(syn::Error::new_spanned(
				sig,
				"a message method cannot be both #[key] and #[section]",
			));
		}
		(None, None) => {
			return Err(syn::Error::new_spanned(
				sig,
				"message methods need #[key] or #[section], or a default body",
			));
		}
	};

	let (value, fallible) = classify(&sig.output);
	let shape = match (&role, value) {
		(Role::Leaf(_), value) => leaf_shape(value),
		(Role::Section { .. }, _) if !params.is_empty() => {
			return Err(syn::Error::new_spanned(
				&sig.inputs,
				"section methods take no arguments besides &self",
			));
		}
		(Role::Section { .. }, Some(ty)) if !is_unit(ty) && !is_component(ty) => {
			Shape::Interface(ty.clone())
		}
		(Role::Section { .. }, _) => {
			return Err(syn::Error::new_spanned(
				&sig.output,
				"section methods must return a message interface proxy",
			));
		}
	};

	Ok(Some(Method {
		sig: sig.clone(),
		role,
		params,
		shape,
		fallible,
	}))
}

fn parse_key(attr: &Attribute) -> syn::Result<Option<LitStr>> {
	match &attr.meta {
		Meta::Path(_) => Ok(None),
		Meta::List(_) => attr.parse_args::<LitStr>().map(Some),
		Meta::NameValue(_) => Err(syn::Error::new_spanned(
			attr,
			"expected #[key] or #[key(\"message.key\")]",
		)),
	}
}

fn parse_section(attr: &Attribute) -> syn::Result<(Option<LitStr>, Option<LitChar>)> {
	let mut prefix = None;
	let mut delimiter = None;
	if let Meta::Path(_) = attr.meta {
		return Ok((prefix, delimiter));
	}
	attr.parse_nested_meta(|meta| {
		if meta.path.is_ident("prefix") {
			prefix = Some(meta.value()?.parse()?);
			Ok(())
		} else if meta.path.is_ident("delimiter") {
			delimiter = Some(parse_delimiter(&meta)?);
			Ok(())
		} else {
			Err(meta.error("expected `prefix` or `delimiter`"))
		}
	})?;
	Ok((prefix, delimiter))
}

fn parse_delimiter(meta: &ParseNestedMeta<'_>) -> syn::Result<LitChar> {
	let lit: LitChar = meta.value()?.parse()?;
	let delimiter = lit.value();
	if delimiter.is_alphanumeric() || delimiter.is_whitespace() {
		return Err(syn::Error::new_spanned(
			&lit,
			"section delimiters must be punctuation",
		));
	}
	Ok(lit)
}

fn check_signature(sig: &Signature) -> syn::Result<()> {
	if let Some(asyncness) = &sig.asyncness {
		return Err(syn::Error::new_spanned(
			asyncness,
			"message methods cannot be async",
		));
	}
	if sig
		.generics
		.params
		.iter()
		.any(|param| !matches!(param, syn::GenericParam::Lifetime(_)))
	{
		return Err(syn::Error::new_spanned(
			&sig.generics,
			"message methods cannot have type or const parameters",
		));
	}
	match sig.receiver() {
		Some(receiver)
			if receiver.reference.is_some()
				&& receiver.mutability.is_none()
				&& receiver.colon_token.is_none() =>
		{
			Ok(())
		}
		_ => Err(syn::Error::new_spanned(
			sig,
			"message methods must take &self",
		)),
	}
}

/// Splits a return type into its value type and whether it is wrapped in `Result`.
///
/// `None` stands for the implicit unit return.
fn classify(output: &ReturnType) -> (Option<&Type>, bool) {
	let ty = match output {
		ReturnType::Default => return (None, false),
		ReturnType::Type(_, ty) => &**ty,
	};
	match result_ok_type(ty) {
		Some(inner) => (Some(inner), true),
		None => (Some(ty), false),
	}
}

fn leaf_shape(value: Option<&Type>) -> Shape {
	match value {
		None => Shape::Unit,
		Some(ty) if is_unit(ty) => Shape::Unit,
		Some(ty) if is_component(ty) => Shape::Component,
		Some(ty) => Shape::Other(type_string(ty)),
	}
}

fn is_unit(ty: &Type) -> bool {
	matches!(ty, Type::Tuple(tuple) if tuple.elems.is_empty())
}

fn is_component(ty: &Type) -> bool {
	let Type::Path(path) = ty else {
		return false;
	};
	path.qself.is_none()
		&& path
			.path
			.segments
			.last()
			.is_some_and(|last| last.ident == "Component" && last.arguments.is_none())
}

fn result_ok_type(ty: &Type) -> Option<&Type> {
	let Type::Path(path) = ty else {
		return None;
	};
	let last = path.path.segments.last()?;
	if last.ident != "Result" {
		return None;
	}
	let PathArguments::AngleBracketed(args) = &last.arguments else {
		return None;
	};
	match args.args.first()? {
		GenericArgument::Type(ok) => Some(ok),
		_ => None,
	}
}

/// Readable type label, e.g. `&str` rather than `& str`.
fn type_string(ty: &Type) -> String {
	quote!(#ty)
		.to_string()
		.replace("& ", "&")
		.replace(" <", "<")
		.replace("< ", "<")
		.replace(" >", ">")
		.replace(" ,", ",")
		.replace(" :: ", "::")
		.replace(":: ", "::")
}

fn signature(method: &Method) -> Vec<String> {
	method.params.iter().map(|param| type_string(&param.ty)).collect()
}

fn method_decl(method: &Method, private: &TokenStream2) -> TokenStream2 {
	let name = method.sig.ident.to_string();
	let signature = signature(method);
	let marker = match &method.role {
		Role::Leaf(Some(key)) => quote!(.marked_leaf(#private::KeyMarker::explicit(#key))),
		Role::Leaf(None) => quote!(.marked_leaf(#private::KeyMarker::derived())),
		Role::Section { prefix, delimiter } => {
			let marker = section_marker(prefix.as_ref(), delimiter.as_ref());
			quote!(.marked_section(#marker))
		}
	};
	let params = method.params.iter().map(|param| {
		let base = match &param.name {
			Some(name) => quote!(#private::ParamDecl::named(#name)),
			None => quote!(#private::ParamDecl::positional()),
		};
		match &param.placeholder {
			Some(key) => quote!(#base.placeholder(#key)),
			None => base,
		}
	});
	let shape = match &method.shape {
		Shape::Unit => quote!(#private::ReturnShape::Unit),
		Shape::Component => quote!(#private::ReturnShape::Component),
		Shape::Interface(ty) => quote!(#private::ReturnShape::interface::<#ty>()),
		Shape::Other(ty) => quote!(#private::ReturnShape::Other(#ty)),
	};
	quote! {
		#private::MethodDecl::new(#name, &[#(#signature),*])
			#marker
			#(.param(#params))*
			.returns(#shape)
	}
}

fn method_impl(method: &Method, proxy: &Ident, private: &TokenStream2) -> TokenStream2 {
	let mut sig = method.sig.clone();
	let mut idents = Vec::with_capacity(method.params.len());
	for input in &mut sig.inputs {
		if let FnArg::Typed(arg) = input {
			let ident = format_ident!("__arg{}", idents.len());
			*arg.pat = syn::parse_quote!(#ident);
			idents.push(ident);
		}
	}

	let name = method.sig.ident.to_string();
	let signature = signature(method);
	let arguments = quote! {
		#private::Arguments::from_slots(::std::vec![
			#(#private::IntoArgument::into_argument(#idents)),*
		])
	};
	let call = match &method.shape {
		Shape::Unit => quote!(self.dispatcher.send(&__METHOD, #arguments)),
		Shape::Component => quote!(self.dispatcher.render(&__METHOD, #arguments)),
		Shape::Interface(ty) => quote!(self.dispatcher.section::<#ty>(&__METHOD)),
		Shape::Other(_) => quote!(self.dispatcher.invoke(&__METHOD, #arguments)),
	};
	let body = match (&method.shape, method.fallible) {
		(Shape::Other(_), false) => quote!(#private::reject_invocation(#call)),
		(Shape::Other(_), true) => quote! {
			match #call {
				::core::result::Result::Err(error) => {
					::core::result::Result::Err(::core::convert::Into::into(error))
				}
				outcome => #private::reject_invocation(outcome),
			}
		},
		(_, true) => quote!(#call.map_err(::core::convert::Into::into)),
		(_, false) => quote! {
			match #call {
				::core::result::Result::Ok(value) => value,
				::core::result::Result::Err(error) => #private::reject(error),
			}
		},
	};

	quote! {
		#sig {
			const __METHOD: #private::MethodId = #private::MethodId::new(
				<#proxy as #private::MessageInterface>::NAME,
				#name,
				&[#(#signature),*],
			);
			#body
		}
	}
}
