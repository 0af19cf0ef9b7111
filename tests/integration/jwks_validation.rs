//! Integration tests for URL-backed JWKS validation.

// std
use std::time::Duration;
// crates.io
use component_jwks_config::{
	Error, ErrorKind, JwksValidator, Result, ValidationRequest, ValidatorConfig,
	validation::{URL_SUCCESS_MESSAGE, remote::ERROR_BODY_LIMIT},
};
use tempfile::TempDir;
use wiremock::{
	Mock, MockServer, ResponseTemplate,
	matchers::{header, method, path},
};

const JWKS_BODY: &str = r#"{
    "keys": [
        { "kty": "RSA", "alg": "RS256", "use": "sig", "kid": "primary", "n": "AQAB", "e": "AQAB" },
        { "kty": "EC", "alg": "ES256", "use": "sig", "kid": "secondary", "crv": "P-256" },
        { "kty": "RSA", "alg": "RS256", "use": "sig", "kid": "rotated", "n": "AQAB", "e": "AQAB" }
    ]
}"#;
const JWKS_PATH: &str = "/.well-known/jwks.json";

fn validator() -> (TempDir, JwksValidator) {
	let dir = tempfile::tempdir().expect("tempdir");
	let validator = JwksValidator::new(ValidatorConfig::new(dir.path())).expect("validator");

	(dir, validator)
}

async fn serve(server: &MockServer, template: ResponseTemplate, expected_calls: u64) {
	Mock::given(method("GET"))
		.and(path(JWKS_PATH))
		.and(header("accept", "application/json"))
		.respond_with(template)
		.expect(expected_calls)
		.mount(server)
		.await;
}

#[tokio::test]
async fn reachable_jwks_is_valid_and_accessible() -> Result<()> {
	let _ = tracing_subscriber::fmt::try_init();

	let server = MockServer::start().await;

	serve(
		&server,
		ResponseTemplate::new(200)
			.set_body_string(JWKS_BODY)
			.insert_header("content-type", "application/json"),
		1,
	)
	.await;

	let (_dir, validator) = validator();
	let url = format!("{}{JWKS_PATH}", server.uri());
	let verdict = validator.verdict(&ValidationRequest::Url { url: url.clone() }).await;

	assert!(verdict.valid);
	assert_eq!(verdict.accessible, Some(true));
	assert_eq!(verdict.key_count, 3);
	assert_eq!(verdict.algorithms, Some(vec!["RS256".to_owned(), "ES256".to_owned()]));
	assert_eq!(verdict.message.as_deref(), Some(URL_SUCCESS_MESSAGE));
	assert!(verdict.error.is_none());

	server.verify().await;
	Ok(())
}

#[tokio::test]
async fn non_success_status_is_a_network_failure() {
	let server = MockServer::start().await;

	serve(&server, ResponseTemplate::new(404).set_body_string("no such document"), 2).await;

	let (_dir, validator) = validator();
	let url = format!("{}{JWKS_PATH}", server.uri());
	let err = validator.validate_url(&url).await.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Network);
	assert_eq!(err.status().map(|status| status.as_u16()), Some(404));

	let verdict = validator.verdict(&ValidationRequest::Url { url }).await;

	assert!(!verdict.valid);
	assert_eq!(verdict.accessible, Some(false));
	assert!(verdict.message.is_none());
}

#[tokio::test]
async fn failure_body_is_capped() {
	let server = MockServer::start().await;

	serve(&server, ResponseTemplate::new(502).set_body_string("x".repeat(64 * 1024)), 1).await;

	let (_dir, validator) = validator();
	let err = validator.validate_url(&format!("{}{JWKS_PATH}", server.uri())).await.unwrap_err();

	match err {
		Error::HttpStatus { status, body, .. } => {
			assert_eq!(status.as_u16(), 502);
			assert_eq!(body.len() as u64, ERROR_BODY_LIMIT);
		},
		other => panic!("expected upstream status error, got {other:?}"),
	}
}

#[tokio::test]
async fn reachable_but_malformed_document_is_invalid() {
	let server = MockServer::start().await;

	serve(&server, ResponseTemplate::new(200).set_body_string(r#"{"issuer":"x"}"#), 1).await;

	let (_dir, validator) = validator();
	let verdict = validator
		.verdict(&ValidationRequest::Url { url: format!("{}{JWKS_PATH}", server.uri()) })
		.await;

	assert!(!verdict.valid);
	assert_eq!(verdict.accessible, Some(true));
	assert_eq!(verdict.key_count, 0);
	assert!(verdict.error.as_deref().unwrap_or_default().contains("'keys'"));
}

#[tokio::test]
async fn oversized_document_is_rejected() {
	let server = MockServer::start().await;

	serve(&server, ResponseTemplate::new(200).set_body_string(JWKS_BODY), 1).await;

	let dir = tempfile::tempdir().expect("tempdir");
	let validator =
		JwksValidator::new(ValidatorConfig::new(dir.path()).with_max_response_bytes(64))
			.expect("validator");
	let err = validator.validate_url(&format!("{}{JWKS_PATH}", server.uri())).await.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Validation);
	assert!(err.to_string().contains("exceeds"));
}

#[tokio::test]
async fn slow_endpoint_times_out_as_network_failure() {
	let server = MockServer::start().await;

	serve(
		&server,
		ResponseTemplate::new(200).set_body_string(JWKS_BODY).set_delay(Duration::from_secs(2)),
		1,
	)
	.await;

	let dir = tempfile::tempdir().expect("tempdir");
	let config = ValidatorConfig::new(dir.path())
		.with_timeouts(Duration::from_millis(200), Duration::from_millis(200));
	let validator = JwksValidator::new(config).expect("validator");
	let err = validator.validate_url(&format!("{}{JWKS_PATH}", server.uri())).await.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn disallowed_schemes_are_security_errors() {
	let (_dir, validator) = validator();

	for url in ["ftp://idp.example/jwks.json", "file:///etc/passwd", "javascript:alert(1)"] {
		let err = validator.validate_url(url).await.unwrap_err();

		assert_eq!(err.kind(), ErrorKind::Security, "{url}");
		assert!(err.to_string().contains("invalid scheme"), "{url}");
	}
}

#[tokio::test]
async fn malformed_urls_are_validation_errors() {
	let (_dir, validator) = validator();

	for url in ["", "   ", "not a url", "https://"] {
		let err = validator.validate_url(url).await.unwrap_err();

		assert_eq!(err.kind(), ErrorKind::Validation, "{url:?}");
	}
}
