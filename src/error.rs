//! Crate-wide error types and `Result` alias.

// crates.io
use http::StatusCode;
use url::Url;

/// Library-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification used by callers that only care about the failure family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// Malformed or incomplete input; fixable by correcting the input.
	Validation,
	/// Input rejected for safety reasons (path traversal, disallowed scheme).
	Security,
	/// Host unreachable, timed out, or answered with a non-success status.
	Network,
	/// Write rejected because the revision it carried was stale.
	Conflict,
}

/// Unified error type for the configuration resolver and JWKS validator.
#[allow(missing_docs)]
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Validation failed for {field}: {reason}")]
	Validation { field: &'static str, reason: String },
	#[error("Security violation: {0}")]
	Security(String),
	#[error("Network failure reaching {}: {reason}", .url.as_ref().map(Url::as_str).unwrap_or("<unknown>"))]
	Network { url: Option<Url>, reason: String },
	#[error("Upstream HTTP status {status} from {url}: {body}")]
	HttpStatus { status: StatusCode, url: Url, body: String },
	#[error("Revision {revision} of component '{component_id}' is stale: {body}")]
	Conflict { component_id: String, revision: u64, body: String },
	#[error("Metrics error: {0}")]
	Metrics(String),
}
impl Error {
	/// Failure family of this error.
	pub fn kind(&self) -> ErrorKind {
		match self {
			// Recorder setup fails only on caller misconfiguration.
			Self::Validation { .. } | Self::Metrics(_) => ErrorKind::Validation,
			Self::Security(_) => ErrorKind::Security,
			Self::Network { .. } | Self::HttpStatus { .. } => ErrorKind::Network,
			Self::Conflict { .. } => ErrorKind::Conflict,
		}
	}

	/// HTTP status reported by the host, when the failure carried one.
	pub fn status(&self) -> Option<StatusCode> {
		match self {
			Self::HttpStatus { status, .. } => Some(*status),
			_ => None,
		}
	}
}
impl From<reqwest::Error> for Error {
	fn from(value: reqwest::Error) -> Self {
		if value.is_builder() {
			return Self::Validation { field: "request", reason: value.to_string() };
		}

		let url = value.url().cloned();
		let reason = if value.is_timeout() {
			format!("request timed out: {value}")
		} else if value.is_connect() {
			format!("connection failed: {value}")
		} else if value.is_decode() {
			return Self::Validation { field: "response", reason: value.to_string() };
		} else {
			value.to_string()
		};

		Self::Network { url, reason }
	}
}
impl From<serde_json::Error> for Error {
	fn from(value: serde_json::Error) -> Self {
		Self::Validation { field: "json", reason: value.to_string() }
	}
}
impl From<url::ParseError> for Error {
	fn from(value: url::ParseError) -> Self {
		Self::Validation { field: "url", reason: value.to_string() }
	}
}
impl From<std::io::Error> for Error {
	fn from(value: std::io::Error) -> Self {
		Self::Validation { field: "io", reason: value.to_string() }
	}
}
