//! Host connection and validator configuration.

// std
use std::path::PathBuf;
// crates.io
use serde::{Deserialize, Serialize};
use url::Url;
// self
use crate::_prelude::*;

/// Default path of the component type-detection endpoint, relative to the host base URL.
pub const DEFAULT_COMPONENT_INFO_PATH: &str = "component-info";
/// Default connect timeout for outbound calls.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default total timeout for outbound calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Default size guard (1 MiB) for fetched or read JWKS documents.
pub const DEFAULT_MAX_RESPONSE_BYTES: u64 = 1_048_576;
/// Default redirect depth for JWKS URL fetches.
pub const DEFAULT_MAX_REDIRECTS: u8 = 3;
/// Maximum redirect depth.
pub const MAX_REDIRECTS: u8 = 10;

/// Connection settings for the host REST API.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HostConfig {
	/// Base URL every request path is joined onto (normalised to end with `/`).
	pub base_url: Url,
	/// Path of the type-detection endpoint relative to `base_url`.
	#[serde(default = "default_component_info_path")]
	pub component_info_path: String,
	/// Client id echoed inside revisions on writes, when the host tracks one.
	#[serde(default)]
	pub client_id: Option<String>,
	/// Timeout for establishing connections.
	#[serde(default = "default_connect_timeout")]
	pub connect_timeout: Duration,
	/// Timeout for an entire request/response exchange.
	#[serde(default = "default_request_timeout")]
	pub request_timeout: Duration,
	/// User agent advertised to the host.
	#[serde(default = "default_user_agent")]
	pub user_agent: String,
}
impl HostConfig {
	/// Construct a configuration with default timeouts.
	pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
		let base_url = Url::parse(base_url.as_ref()).map_err(|err| Error::Validation {
			field: "base_url",
			reason: format!("Invalid URL: {err}."),
		})?;

		Ok(Self {
			base_url: with_trailing_slash(base_url),
			component_info_path: default_component_info_path(),
			client_id: None,
			connect_timeout: DEFAULT_CONNECT_TIMEOUT,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			user_agent: default_user_agent(),
		})
	}

	/// Override the type-detection endpoint path.
	pub fn with_component_info_path(mut self, path: impl Into<String>) -> Self {
		self.component_info_path = path.into();

		self
	}

	/// Set the client id echoed in write revisions.
	pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Override both timeouts.
	pub fn with_timeouts(mut self, connect: Duration, request: Duration) -> Self {
		self.connect_timeout = connect;
		self.request_timeout = request;

		self
	}

	/// Resolve a host-relative path against the base URL.
	pub fn endpoint(&self, path: &str) -> Result<Url> {
		with_trailing_slash(self.base_url.clone())
			.join(path.trim_start_matches('/'))
			.map_err(|err| Error::Validation {
				field: "path",
				reason: format!("Cannot join '{path}' onto {}: {err}.", self.base_url),
			})
	}

	/// Validate the configuration against the documented constraints.
	pub fn validate(&self) -> Result<()> {
		if !matches!(self.base_url.scheme(), "http" | "https") {
			return Err(Error::Validation {
				field: "base_url",
				reason: "Must use the http or https scheme.".into(),
			});
		}
		if self.base_url.host_str().is_none() {
			return Err(Error::Validation {
				field: "base_url",
				reason: "Must include a host component.".into(),
			});
		}
		if self.component_info_path.trim().is_empty() {
			return Err(Error::Validation {
				field: "component_info_path",
				reason: "Must not be empty.".into(),
			});
		}

		validate_timeouts(self.connect_timeout, self.request_timeout)
	}
}

/// Settings for the JWKS validation service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidatorConfig {
	/// Directory that every file-backed request must stay inside.
	pub allowed_base_dir: PathBuf,
	/// Timeout for establishing connections to JWKS URLs.
	#[serde(default = "default_connect_timeout")]
	pub connect_timeout: Duration,
	/// Timeout for a whole JWKS URL fetch.
	#[serde(default = "default_request_timeout")]
	pub request_timeout: Duration,
	/// Maximum size accepted for fetched or read JWKS documents.
	#[serde(default = "default_max_response_bytes")]
	pub max_response_bytes: u64,
	/// Maximum number of redirects followed by URL fetches.
	#[serde(default = "default_max_redirects")]
	pub max_redirects: u8,
}
impl ValidatorConfig {
	/// Construct a configuration rooted at the given base directory.
	pub fn new(allowed_base_dir: impl Into<PathBuf>) -> Self {
		Self {
			allowed_base_dir: allowed_base_dir.into(),
			connect_timeout: DEFAULT_CONNECT_TIMEOUT,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
			max_redirects: DEFAULT_MAX_REDIRECTS,
		}
	}

	/// Override the size guard.
	pub fn with_max_response_bytes(mut self, limit: u64) -> Self {
		self.max_response_bytes = limit;

		self
	}

	/// Override both timeouts.
	pub fn with_timeouts(mut self, connect: Duration, request: Duration) -> Self {
		self.connect_timeout = connect;
		self.request_timeout = request;

		self
	}

	/// Validate the configuration against the documented constraints.
	pub fn validate(&self) -> Result<()> {
		if self.allowed_base_dir.as_os_str().is_empty() {
			return Err(Error::Validation {
				field: "allowed_base_dir",
				reason: "Must not be empty.".into(),
			});
		}
		if self.max_response_bytes == 0 {
			return Err(Error::Validation {
				field: "max_response_bytes",
				reason: "Must be greater than zero.".into(),
			});
		}
		if self.max_redirects > MAX_REDIRECTS {
			return Err(Error::Validation {
				field: "max_redirects",
				reason: format!("Must be less than or equal to {MAX_REDIRECTS}."),
			});
		}

		validate_timeouts(self.connect_timeout, self.request_timeout)
	}
}

fn validate_timeouts(connect: Duration, request: Duration) -> Result<()> {
	if connect < Duration::from_millis(100) {
		return Err(Error::Validation {
			field: "connect_timeout",
			reason: "Must be at least 100 ms.".into(),
		});
	}
	if request < connect {
		return Err(Error::Validation {
			field: "request_timeout",
			reason: "Must be greater than or equal to connect_timeout.".into(),
		});
	}

	Ok(())
}

fn with_trailing_slash(mut url: Url) -> Url {
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	url
}

fn default_component_info_path() -> String {
	DEFAULT_COMPONENT_INFO_PATH.into()
}

fn default_connect_timeout() -> Duration {
	DEFAULT_CONNECT_TIMEOUT
}

fn default_request_timeout() -> Duration {
	DEFAULT_REQUEST_TIMEOUT
}

fn default_max_response_bytes() -> u64 {
	DEFAULT_MAX_RESPONSE_BYTES
}

fn default_max_redirects() -> u8 {
	DEFAULT_MAX_REDIRECTS
}

fn default_user_agent() -> String {
	format!("component-jwks-config/{}", env!("CARGO_PKG_VERSION"))
}
