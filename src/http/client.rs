//! Authenticated HTTP client for the host REST API.

// crates.io
use http::{
	HeaderValue, Method, StatusCode,
	header::{ACCEPT, CONTENT_TYPE},
};
use reqwest::Client;
use serde_json::Value;
use url::Url;
// self
use crate::{
	_prelude::*,
	config::HostConfig,
	http::session::{COMPONENT_ID_HEADER, REQUEST_TOKEN_HEADER, Session},
};

/// Successful (2xx) host response with its raw body.
#[derive(Clone, Debug)]
pub struct HostResponse {
	/// Status returned by the host.
	pub status: StatusCode,
	/// Final URL of the exchange.
	pub url: Url,
	/// Raw response body.
	pub body: String,
}
impl HostResponse {
	/// Decode the body as JSON.
	pub fn json(&self) -> Result<Value> {
		serde_json::from_str(&self.body).map_err(|err| Error::Validation {
			field: "response",
			reason: format!("Host returned a non-JSON body from {}: {err}.", self.url),
		})
	}
}

/// Wraps every host call with identity and request-forgery headers.
#[derive(Clone, Debug)]
pub struct HostClient {
	config: Arc<HostConfig>,
	session: Arc<Session>,
	client: Client,
}
impl HostClient {
	/// Build a client with a reqwest backend honouring the configured timeouts.
	pub fn new(config: HostConfig, session: Session) -> Result<Self> {
		config.validate()?;

		let client = Client::builder()
			.user_agent(config.user_agent.clone())
			.connect_timeout(config.connect_timeout)
			.timeout(config.request_timeout)
			.build()?;

		Ok(Self::with_client(config, session, client))
	}

	/// Build a client around an existing reqwest client (primarily for tests).
	pub fn with_client(config: HostConfig, session: Session, client: Client) -> Self {
		Self { config: Arc::new(config), session: Arc::new(session), client }
	}

	/// Host configuration in use.
	pub fn config(&self) -> &HostConfig {
		&self.config
	}

	/// Session the identity and token are drawn from.
	pub fn session(&self) -> &Session {
		&self.session
	}

	/// Issue a request against a host-relative path.
	///
	/// Non-2xx statuses become [`Error::HttpStatus`] carrying the raw body; transport failures
	/// become [`Error::Network`].
	pub async fn send(
		&self,
		method: Method,
		path: &str,
		body: Option<&Value>,
	) -> Result<HostResponse> {
		let url = self.config.endpoint(path)?;

		self.request(method, url, body).await
	}

	/// Issue a request against an absolute URL, typically one built from [`HostConfig::endpoint`].
	pub async fn request(
		&self,
		method: Method,
		url: Url,
		body: Option<&Value>,
	) -> Result<HostResponse> {
		let mut builder = self
			.client
			.request(method.clone(), url)
			.header(ACCEPT, HeaderValue::from_static("application/json"))
			.header(COMPONENT_ID_HEADER, self.session.component_id());

		if is_mutating(&method)
			&& let Some(token) = self.session.request_token()
		{
			builder = builder.header(REQUEST_TOKEN_HEADER, token);
		}
		if let Some(body) = body {
			builder = builder
				.header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
				.body(serde_json::to_vec(body)?);
		}

		let start = Instant::now();
		let response = builder.send().await?;
		let elapsed = start.elapsed();
		let status = response.status();
		let final_url = response.url().clone();
		let text = response.text().await?;

		tracing::debug!(%method, url = %final_url, %status, ?elapsed, "host request complete");

		if !status.is_success() {
			return Err(Error::HttpStatus { status, url: final_url, body: text });
		}

		Ok(HostResponse { status, url: final_url, body: text })
	}

	/// Convenience wrapper for `GET`.
	pub async fn get(&self, path: &str) -> Result<HostResponse> {
		self.send(Method::GET, path, None).await
	}

	/// Convenience wrapper for `PUT` with a JSON body.
	pub async fn put(&self, path: &str, body: &Value) -> Result<HostResponse> {
		self.send(Method::PUT, path, Some(body)).await
	}
}

/// Whether the method changes host state and therefore needs the request-forgery token.
pub fn is_mutating(method: &Method) -> bool {
	!matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}
