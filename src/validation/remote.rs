//! JWKS retrieval for URL-backed validation requests.

// crates.io
use http::{
	HeaderValue, StatusCode,
	header::{ACCEPT, CONTENT_LENGTH},
};
use reqwest::{Client, Response};
use url::Url;
// self
use crate::_prelude::*;

/// Most bytes of a non-200 body kept for the error report.
pub const ERROR_BODY_LIMIT: u64 = 1024;

/// Parse a JWKS URL, allowing only the `http` and `https` schemes.
///
/// Runs before any network I/O.
pub fn parse_jwks_url(raw: &str) -> Result<Url> {
	let trimmed = raw.trim();

	if trimmed.is_empty() {
		return Err(Error::Validation {
			field: "jwks_url",
			reason: "JWKS URL must not be empty".into(),
		});
	}

	let url = Url::parse(trimmed).map_err(|err| Error::Validation {
		field: "jwks_url",
		reason: format!("malformed URL: {err}"),
	})?;

	enforce_http_scheme(&url)?;

	if url.host_str().is_none() {
		return Err(Error::Validation {
			field: "jwks_url",
			reason: "URL must include a host".into(),
		});
	}

	Ok(url)
}

/// Ensure the provided URL uses HTTP or HTTPS.
pub fn enforce_http_scheme(url: &Url) -> Result<()> {
	match url.scheme() {
		"http" | "https" => Ok(()),
		scheme => Err(Error::Security(format!(
			"invalid scheme '{scheme}'; only http and https are allowed"
		))),
	}
}

/// Fetch a JWKS document body, enforcing the 200 status and the size guard.
pub async fn fetch_jwks(client: &Client, url: &Url, max_response_bytes: u64) -> Result<String> {
	let start = Instant::now();
	let response = client
		.get(url.clone())
		.header(ACCEPT, HeaderValue::from_static("application/json"))
		.send()
		.await?;
	let status = response.status();

	if status != StatusCode::OK {
		let limit = max_response_bytes.min(ERROR_BODY_LIMIT) as usize;
		let body = error_excerpt(response, limit).await;

		return Err(Error::HttpStatus { status, url: url.clone(), body });
	}

	let advertised = response
		.headers()
		.get(CONTENT_LENGTH)
		.and_then(|value| value.to_str().ok())
		.and_then(|raw| raw.parse::<u64>().ok());

	if let Some(size) = advertised
		&& size > max_response_bytes
	{
		return Err(oversized(size, max_response_bytes));
	}

	let bytes = response.bytes().await?;

	if bytes.len() as u64 > max_response_bytes {
		return Err(oversized(bytes.len() as u64, max_response_bytes));
	}

	tracing::debug!(url = %url, %status, size = bytes.len(), elapsed = ?start.elapsed(), "jwks fetch complete");

	String::from_utf8(bytes.to_vec()).map_err(|err| Error::Validation {
		field: "jwks_content",
		reason: format!("invalid JSON: body is not UTF-8 ({err})"),
	})
}

async fn error_excerpt(mut response: Response, limit: usize) -> String {
	let mut body = Vec::new();

	while body.len() < limit {
		match response.chunk().await {
			Ok(Some(chunk)) => {
				let take = chunk.len().min(limit - body.len());

				body.extend_from_slice(&chunk[..take]);
			},
			Ok(None) => break,
			Err(err) => {
				tracing::debug!(url = %response.url(), error = %err, "error body unreadable");

				break;
			},
		}
	}

	String::from_utf8_lossy(&body).into_owned()
}

fn oversized(size: u64, limit: u64) -> Error {
	Error::Validation {
		field: "max_response_bytes",
		reason: format!("JWKS size {size} bytes exceeds the configured guard of {limit} bytes"),
	}
}
