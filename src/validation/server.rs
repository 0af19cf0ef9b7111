//! HTTP endpoints exposing the JWKS validator.
//!
//! Every recognised endpoint answers with a [`ValidationResult`]: 200 when valid, 400 when not.
//! Malformed bodies and missing fields are reported as invalid verdicts rather than framework
//! rejections. 500 is reserved for a validation task that failed to complete.

// crates.io
use axum::{
	Json, Router,
	body::Bytes,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::post,
};
use serde::Deserialize;
use serde_json::{Value, json};
// self
use crate::{
	_prelude::*,
	validation::{JwksValidator, ValidationRequest, ValidationResult},
};

/// Route of the URL validation endpoint.
pub const VALIDATE_URL_PATH: &str = "/validate-jwks-url";
/// Route of the file validation endpoint.
pub const VALIDATE_FILE_PATH: &str = "/validate-jwks-file";
/// Route of the content validation endpoint.
pub const VALIDATE_CONTENT_PATH: &str = "/validate-jwks-content";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidationBody {
	#[serde(default)]
	jwks_url: Option<Value>,
	#[serde(default)]
	jwks_file_path: Option<Value>,
	#[serde(default)]
	jwks_content: Option<Value>,
}

/// Build the validation router; mount it under whatever prefix the host exposes.
pub fn router(validator: JwksValidator) -> Router {
	Router::new()
		.route(VALIDATE_URL_PATH, post(validate_url))
		.route(VALIDATE_FILE_PATH, post(validate_file))
		.route(VALIDATE_CONTENT_PATH, post(validate_content))
		.fallback(unknown_endpoint)
		.with_state(validator)
}

async fn validate_url(State(validator): State<JwksValidator>, body: Bytes) -> Response {
	let request = parse_body(&body).and_then(|body| {
		required_string(body.jwks_url, "jwksUrl").map(|url| ValidationRequest::Url { url })
	});

	respond(validator, request).await
}

async fn validate_file(State(validator): State<JwksValidator>, body: Bytes) -> Response {
	let request = parse_body(&body).and_then(|body| {
		required_string(body.jwks_file_path, "jwksFilePath")
			.map(|path| ValidationRequest::File { path })
	});

	respond(validator, request).await
}

async fn validate_content(State(validator): State<JwksValidator>, body: Bytes) -> Response {
	let request = parse_body(&body).and_then(|body| match body.jwks_content {
		// Inline documents may arrive already parsed.
		Some(Value::String(content)) if !content.trim().is_empty() =>
			Ok(ValidationRequest::Content { content }),
		Some(value @ (Value::Object(_) | Value::Array(_))) =>
			Ok(ValidationRequest::Content { content: value.to_string() }),
		_ => Err(missing_field("jwksContent")),
	});

	respond(validator, request).await
}

async fn unknown_endpoint() -> Response {
	(StatusCode::NOT_FOUND, Json(json!({ "error": "Unknown validation endpoint" }))).into_response()
}

async fn respond(validator: JwksValidator, request: Result<ValidationRequest>) -> Response {
	let request = match request {
		Ok(request) => request,
		Err(err) => return verdict_response(ValidationResult::failure(&err)),
	};
	let source = request.source();
	let task = tokio::spawn(async move { validator.verdict(&request).await });

	match task.await {
		Ok(verdict) => verdict_response(verdict),
		Err(err) => {
			tracing::error!(source, error = %err, "validation task failed");

			(
				StatusCode::INTERNAL_SERVER_ERROR,
				Json(json!({ "valid": false, "error": "Internal validation failure" })),
			)
				.into_response()
		},
	}
}

fn verdict_response(verdict: ValidationResult) -> Response {
	let status = if verdict.valid { StatusCode::OK } else { StatusCode::BAD_REQUEST };

	(status, Json(verdict)).into_response()
}

fn parse_body(raw: &[u8]) -> Result<ValidationBody> {
	if raw.iter().all(u8::is_ascii_whitespace) {
		return Ok(ValidationBody::default());
	}

	let value: Value = serde_json::from_slice(raw).map_err(|err| Error::Validation {
		field: "body",
		reason: format!("request body is not valid JSON: {err}"),
	})?;

	if !value.is_object() {
		return Err(Error::Validation {
			field: "body",
			reason: "request body must be a JSON object".into(),
		});
	}

	Ok(serde_json::from_value(value)?)
}

fn required_string(value: Option<Value>, field: &'static str) -> Result<String> {
	match value {
		Some(Value::String(value)) if !value.trim().is_empty() => Ok(value),
		_ => Err(missing_field(field)),
	}
}

fn missing_field(field: &'static str) -> Error {
	Error::Validation { field, reason: format!("missing required field '{field}'") }
}
