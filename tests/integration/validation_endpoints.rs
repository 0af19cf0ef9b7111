//! Integration tests for the JWKS validation HTTP endpoints.

// crates.io
use axum::{
	Router,
	body::Body,
	http::{Method, Request, StatusCode},
};
use component_jwks_config::{JwksValidator, ValidatorConfig, router};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const VALID_JWKS: &str = r#"{"keys":[{"kty":"RSA","alg":"RS256","n":"AQAB","e":"AQAB"}]}"#;

fn app() -> (TempDir, Router) {
	let dir = tempfile::tempdir().expect("tempdir");
	let validator = JwksValidator::new(ValidatorConfig::new(dir.path())).expect("validator");

	(dir, router(validator))
}

async fn post(app: Router, uri: &str, body: impl Into<Body>) -> (StatusCode, Value) {
	let request = Request::builder()
		.method(Method::POST)
		.uri(uri)
		.header("content-type", "application/json")
		.body(body.into())
		.expect("request");
	let response = app.oneshot(request).await.expect("response");
	let status = response.status();
	let bytes = response.into_body().collect().await.expect("body").to_bytes();

	(status, serde_json::from_slice(&bytes).expect("json body"))
}

#[tokio::test]
async fn inline_content_is_validated() {
	let (_dir, app) = app();
	let (status, body) =
		post(app, "/validate-jwks-content", json!({ "jwksContent": VALID_JWKS }).to_string()).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["valid"], true);
	assert_eq!(body["keyCount"], 1);
	assert_eq!(body["algorithms"], json!(["RS256"]));
	assert!(body["error"].is_null());
}

#[tokio::test]
async fn inline_content_may_be_an_embedded_object() {
	let (_dir, app) = app();
	let document: Value = serde_json::from_str(VALID_JWKS).expect("document");
	let (status, body) =
		post(app, "/validate-jwks-content", json!({ "jwksContent": document }).to_string()).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["keyCount"], 1);
}

#[tokio::test]
async fn content_without_keys_is_rejected() {
	let (_dir, app) = app();
	let (status, body) =
		post(app, "/validate-jwks-content", json!({ "jwksContent": "{}" }).to_string()).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["valid"], false);
	assert_eq!(body["keyCount"], 0);
	assert!(body["error"].as_str().unwrap_or_default().contains("missing required 'keys' field"));
}

#[tokio::test]
async fn empty_key_set_is_rejected() {
	let (_dir, app) = app();
	let (status, body) = post(
		app,
		"/validate-jwks-content",
		json!({ "jwksContent": r#"{"keys":[]}"# }).to_string(),
	)
	.await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert!(body["error"].as_str().unwrap_or_default().contains("empty keys array"));
}

#[tokio::test]
async fn traversal_is_rejected_even_when_target_exists() {
	let outside = tempfile::tempdir().expect("tempdir");
	let base = outside.path().join("base");

	std::fs::create_dir(&base).expect("mkdir");
	std::fs::write(outside.path().join("secret.json"), VALID_JWKS).expect("write");

	let validator = JwksValidator::new(ValidatorConfig::new(&base)).expect("validator");

	for path in ["../secret.json", "..%2fsecret.json", "%252e%252e%252fsecret.json"] {
		let (status, body) = post(
			router(validator.clone()),
			"/validate-jwks-file",
			json!({ "jwksFilePath": path }).to_string(),
		)
		.await;

		assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
		assert_eq!(body["valid"], false, "{path}");
		assert!(
			body["error"].as_str().unwrap_or_default().contains("within allowed directory"),
			"{path}: {body}"
		);
	}
}

#[tokio::test]
async fn file_inside_base_is_validated() {
	let (dir, app) = app();

	std::fs::create_dir(dir.path().join("keys")).expect("mkdir");
	std::fs::write(dir.path().join("keys/idp.json"), VALID_JWKS).expect("write");

	let (status, body) =
		post(app, "/validate-jwks-file", json!({ "jwksFilePath": "keys/idp.json" }).to_string())
			.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["keyCount"], 1);
}

#[tokio::test]
async fn disallowed_url_scheme_is_rejected() {
	let (_dir, app) = app();
	let (status, body) =
		post(app, "/validate-jwks-url", json!({ "jwksUrl": "ftp://x/jwks" }).to_string()).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["valid"], false);
	assert_eq!(body["accessible"], false);
	assert!(body["error"].as_str().unwrap_or_default().contains("invalid scheme"));
}

#[tokio::test]
async fn missing_fields_and_bad_bodies_are_invalid_verdicts() {
	let cases = [
		("/validate-jwks-url", "{}", "jwksUrl"),
		("/validate-jwks-file", r#"{"jwksFilePath":""}"#, "jwksFilePath"),
		("/validate-jwks-content", "", "jwksContent"),
		("/validate-jwks-content", "{not json", "not valid JSON"),
	];

	for (uri, raw, expected) in cases {
		let (_dir, app) = app();
		let (status, body) = post(app, uri, raw.to_owned()).await;

		assert_eq!(status, StatusCode::BAD_REQUEST, "{uri} {raw}");
		assert_eq!(body["valid"], false, "{uri} {raw}");
		assert!(
			body["error"].as_str().unwrap_or_default().contains(expected),
			"{uri} {raw}: {body}"
		);
	}
}

#[tokio::test]
async fn unknown_endpoint_is_not_found() {
	let (_dir, app) = app();
	let (status, body) = post(app, "/validate-jwks-cert", "{}".to_owned()).await;

	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"], "Unknown validation endpoint");
}
