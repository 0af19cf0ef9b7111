//! Caller-side session state: component identity and request-forgery token.

// std
use std::collections::HashMap;
// crates.io
use url::Url;

/// Header carrying the component identity on every request.
pub const COMPONENT_ID_HEADER: &str = "X-Component-Id";
/// Header carrying the request-forgery-protection token on mutating requests.
pub const REQUEST_TOKEN_HEADER: &str = "Request-Token";
/// Cookie the request-forgery-protection token is read from.
pub const REQUEST_TOKEN_COOKIE: &str = "__Secure-Request-Token";
/// Query parameter consulted when no pre-loaded component id exists.
pub const COMPONENT_ID_QUERY_PARAM: &str = "id";

/// Identity and token sources for outbound host requests.
#[derive(Clone, Debug, Default)]
pub struct Session {
	preloaded_component_id: Option<String>,
	location: Option<Url>,
	cookies: HashMap<String, String>,
}
impl Session {
	/// Create an empty session.
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the component id supplied by the pre-loaded configuration object.
	pub fn with_preloaded_component_id(mut self, id: impl Into<String>) -> Self {
		self.preloaded_component_id = Some(id.into());

		self
	}

	/// Set the location the caller was loaded from.
	pub fn with_location(mut self, location: Url) -> Self {
		self.location = Some(location);

		self
	}

	/// Add a single cookie.
	pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.cookies.insert(name.into(), value.into());

		self
	}

	/// Add every cookie found in a raw `Cookie` header value (`a=b; c=d`).
	pub fn with_cookie_header(mut self, raw: &str) -> Self {
		for pair in raw.split(';') {
			let Some((name, value)) = pair.split_once('=') else {
				continue;
			};
			let name = name.trim();

			if name.is_empty() {
				continue;
			}

			self.cookies.insert(name.to_owned(), value.trim().trim_matches('"').to_owned());
		}

		self
	}

	/// Component id: pre-loaded value, then the location's `id` query parameter, then empty.
	pub fn component_id(&self) -> String {
		if let Some(id) = self.preloaded_component_id.as_deref().filter(|id| !id.is_empty()) {
			return id.to_owned();
		}

		self.location
			.as_ref()
			.and_then(|location| {
				location
					.query_pairs()
					.find(|(key, _)| key == COMPONENT_ID_QUERY_PARAM)
					.map(|(_, value)| value.into_owned())
			})
			.unwrap_or_default()
	}

	/// Request-forgery token, when the session cookie is present.
	pub fn request_token(&self) -> Option<&str> {
		self.cookies.get(REQUEST_TOKEN_COOKIE).map(String::as_str).filter(|token| !token.is_empty())
	}
}
