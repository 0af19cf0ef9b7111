//! JWKS validation service covering URL, file, and inline sources.
//!
//! Every entry point terminates in exactly one of: a [`JwksReport`], a validation error, a
//! security error, or a network error. [`JwksValidator::verdict`] folds that into the uniform
//! [`ValidationResult`] served by the HTTP endpoints.

pub mod content;
pub mod path;
pub mod remote;
pub mod server;

// std
use std::path::{Path, PathBuf};
// crates.io
use reqwest::{Client, redirect::Policy};
use serde::{Deserialize, Serialize};
// self
use crate::{_prelude::*, ErrorKind, config::ValidatorConfig, metrics};

pub use content::JwksReport;

/// Success annotation for URL-backed validations.
pub const URL_SUCCESS_MESSAGE: &str = "JWKS URL is accessible and valid";

/// A single validation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationRequest {
	/// Fetch and validate a remote JWKS.
	Url {
		/// JWKS endpoint.
		url: String,
	},
	/// Read and validate a JWKS file below the allowed base directory.
	File {
		/// Path relative to, or absolute within, the base directory.
		path: String,
	},
	/// Validate inline JWKS content.
	Content {
		/// Raw JWKS document.
		content: String,
	},
}
impl ValidationRequest {
	/// Metric/log label of the request source.
	pub fn source(&self) -> &'static str {
		match self {
			Self::Url { .. } => "url",
			Self::File { .. } => "file",
			Self::Content { .. } => "content",
		}
	}
}

/// Uniform verdict returned for every validation request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
	/// Whether the material is well-formed and safe to accept.
	pub valid: bool,
	/// Whether the remote JWKS could be retrieved (URL requests only).
	pub accessible: Option<bool>,
	/// Failure description; absent when `valid`.
	pub error: Option<String>,
	/// Number of keys found; at least one when `valid`.
	pub key_count: usize,
	/// Recognised algorithms declared by the keys, when any were found.
	pub algorithms: Option<Vec<String>>,
	/// Additional success annotation.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}
impl ValidationResult {
	/// Build a verdict from a validation outcome.
	pub fn from_outcome(outcome: Result<JwksReport>) -> Self {
		match outcome {
			Ok(report) => Self::success(report),
			Err(err) => Self::failure(&err),
		}
	}

	/// Successful verdict; an empty report is downgraded to a failure.
	pub fn success(report: JwksReport) -> Self {
		if report.key_count == 0 {
			return Self::failure(&Error::Validation {
				field: "jwks_content",
				reason: "JWKS contains an empty keys array".into(),
			});
		}

		Self {
			valid: true,
			accessible: None,
			error: None,
			key_count: report.key_count,
			algorithms: (!report.algorithms.is_empty()).then_some(report.algorithms),
			message: None,
		}
	}

	/// Failed verdict carrying the error description.
	pub fn failure(err: &Error) -> Self {
		Self {
			valid: false,
			accessible: None,
			error: Some(err.to_string()),
			key_count: 0,
			algorithms: None,
			message: None,
		}
	}

	/// Record whether the remote document was reachable.
	pub fn with_accessible(mut self, accessible: bool) -> Self {
		self.accessible = Some(accessible);

		self
	}

	/// Attach a success annotation.
	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());

		self
	}
}

/// Stateless JWKS validator; cheap to clone and safe to share across workers.
#[derive(Clone, Debug)]
pub struct JwksValidator {
	config: Arc<ValidatorConfig>,
	base_dir: Arc<PathBuf>,
	client: Client,
}
impl JwksValidator {
	/// Build a validator, canonicalising the base directory and creating an HTTP client with
	/// the configured timeouts.
	pub fn new(config: ValidatorConfig) -> Result<Self> {
		config.validate()?;

		let client = Client::builder()
			.redirect(Policy::limited(config.max_redirects as usize))
			.user_agent(format!("component-jwks-config/{}", env!("CARGO_PKG_VERSION")))
			.connect_timeout(config.connect_timeout)
			.timeout(config.request_timeout)
			.build()?;

		Self::with_client(config, client)
	}

	/// Build a validator around an existing reqwest client (primarily for tests).
	pub fn with_client(config: ValidatorConfig, client: Client) -> Result<Self> {
		let base_dir =
			std::fs::canonicalize(&config.allowed_base_dir).map_err(|err| Error::Validation {
				field: "allowed_base_dir",
				reason: format!(
					"Cannot resolve {}: {err}.",
					config.allowed_base_dir.display()
				),
			})?;

		if !base_dir.is_dir() {
			return Err(Error::Validation {
				field: "allowed_base_dir",
				reason: format!("{} is not a directory.", base_dir.display()),
			});
		}

		Ok(Self { config: Arc::new(config), base_dir: Arc::new(base_dir), client })
	}

	/// Configuration in use.
	pub fn config(&self) -> &ValidatorConfig {
		&self.config
	}

	/// Canonical base directory file requests are confined to.
	pub fn base_dir(&self) -> &Path {
		&self.base_dir
	}

	/// Fetch and validate a remote JWKS.
	#[tracing::instrument(skip(self))]
	pub async fn validate_url(&self, url: &str) -> Result<JwksReport> {
		let started = Instant::now();
		let (_, outcome) = self.check_url(url).await;

		observe("url", started, outcome)
	}

	/// Read and validate a JWKS file confined to the base directory.
	#[tracing::instrument(skip(self))]
	pub async fn validate_file(&self, path: &str) -> Result<JwksReport> {
		let started = Instant::now();
		let outcome = self.check_file(path).await;

		observe("file", started, outcome)
	}

	/// Validate inline JWKS content.
	#[tracing::instrument(skip_all, fields(size = content.len()))]
	pub fn validate_content(&self, content: &str) -> Result<JwksReport> {
		let started = Instant::now();

		observe("content", started, content::inspect(content))
	}

	/// Dispatch a request to the matching entry point.
	pub async fn validate(&self, request: &ValidationRequest) -> Result<JwksReport> {
		match request {
			ValidationRequest::Url { url } => self.validate_url(url).await,
			ValidationRequest::File { path } => self.validate_file(path).await,
			ValidationRequest::Content { content } => self.validate_content(content),
		}
	}

	/// Validate a request and fold the outcome into a verdict.
	pub async fn verdict(&self, request: &ValidationRequest) -> ValidationResult {
		match request {
			ValidationRequest::Url { url } => {
				let started = Instant::now();
				let (accessible, outcome) = self.check_url(url).await;
				let outcome = observe("url", started, outcome);
				let succeeded = outcome.is_ok();
				let verdict = ValidationResult::from_outcome(outcome).with_accessible(accessible);

				if succeeded { verdict.with_message(URL_SUCCESS_MESSAGE) } else { verdict }
			},
			request => ValidationResult::from_outcome(self.validate(request).await),
		}
	}

	async fn check_url(&self, raw: &str) -> (bool, Result<JwksReport>) {
		let url = match remote::parse_jwks_url(raw) {
			Ok(url) => url,
			Err(err) => return (false, Err(err)),
		};
		let body = match remote::fetch_jwks(&self.client, &url, self.config.max_response_bytes).await
		{
			Ok(body) => body,
			Err(err) => return (false, Err(err)),
		};

		(true, content::inspect(&body))
	}

	async fn check_file(&self, raw: &str) -> Result<JwksReport> {
		let candidate = path::resolve_within(&self.base_dir, raw)?;
		let metadata = match tokio::fs::metadata(&candidate).await {
			Ok(metadata) => metadata,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
				return Err(Error::Validation {
					field: "jwks_file_path",
					reason: "JWKS file does not exist".into(),
				});
			},
			Err(err) => {
				return Err(Error::Validation {
					field: "jwks_file_path",
					reason: format!("JWKS file is not readable: {err}"),
				});
			},
		};

		if !metadata.is_file() {
			return Err(Error::Validation {
				field: "jwks_file_path",
				reason: "JWKS path is not a regular file".into(),
			});
		}

		// Symlinks inside the base may still point elsewhere.
		let canonical = tokio::fs::canonicalize(&candidate).await.map_err(|err| {
			Error::Validation {
				field: "jwks_file_path",
				reason: format!("JWKS file is not readable: {err}"),
			}
		})?;

		if !canonical.starts_with(self.base_dir.as_path()) {
			return Err(Error::Security(path::OUTSIDE_BASE_DIR.into()));
		}
		if metadata.len() > self.config.max_response_bytes {
			return Err(Error::Validation {
				field: "max_response_bytes",
				reason: format!(
					"JWKS size {} bytes exceeds the configured guard of {} bytes",
					metadata.len(),
					self.config.max_response_bytes
				),
			});
		}

		let raw = tokio::fs::read_to_string(&canonical).await.map_err(|err| Error::Validation {
			field: "jwks_file_path",
			reason: format!("JWKS file is not readable: {err}"),
		})?;

		content::inspect(&raw)
	}
}

fn observe(
	source: &'static str,
	started: Instant,
	outcome: Result<JwksReport>,
) -> Result<JwksReport> {
	let label = match &outcome {
		Ok(report) => {
			tracing::debug!(source, keys = report.key_count, "jwks validated");

			"valid"
		},
		Err(err) => match err.kind() {
			ErrorKind::Security => {
				tracing::warn!(source, security = true, error = %err, "jwks request rejected");

				"security"
			},
			ErrorKind::Network => {
				tracing::debug!(source, error = %err, "jwks source unreachable");

				"network"
			},
			ErrorKind::Validation | ErrorKind::Conflict => {
				tracing::debug!(source, error = %err, "jwks invalid");

				"invalid"
			},
		},
	};

	metrics::record_validation(source, label, started.elapsed());

	outcome
}
