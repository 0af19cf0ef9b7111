//! Structural inspection of JWKS documents.

// crates.io
use jsonwebtoken::Algorithm;
use serde_json::Value;
// self
use crate::_prelude::*;

/// Summary of a structurally valid JWKS document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JwksReport {
	/// Number of entries in the `keys` array; always at least one.
	pub key_count: usize,
	/// Recognised signing algorithms declared by the keys, in first-seen order.
	pub algorithms: Vec<String>,
}

/// Check that `raw` is a JSON object with a non-empty `keys` array.
///
/// Every entry counts towards `key_count`; malformed entries only lose their algorithm.
pub fn inspect(raw: &str) -> Result<JwksReport> {
	let document: Value = serde_json::from_str(raw).map_err(|err| invalid(format!("invalid JSON: {err}")))?;
	let Some(keys) = document.as_object().and_then(|object| object.get("keys")) else {
		return Err(invalid("JWKS is missing required 'keys' field".into()));
	};
	let Some(keys) = keys.as_array() else {
		return Err(invalid("JWKS 'keys' field must be an array".into()));
	};

	if keys.is_empty() {
		return Err(invalid("JWKS contains an empty keys array".into()));
	}

	let mut algorithms = Vec::new();

	for (index, key) in keys.iter().enumerate() {
		let Some(key) = key.as_object() else {
			tracing::debug!(index, "key entry is not a JSON object");

			continue;
		};

		if !key.get("kty").is_some_and(Value::is_string) {
			tracing::debug!(index, "key entry carries no 'kty'");
		}

		let Some(alg) = key.get("alg").and_then(Value::as_str) else {
			continue;
		};

		if alg.parse::<Algorithm>().is_err() {
			tracing::debug!(index, alg, "skipping unrecognised key algorithm");

			continue;
		}
		if !algorithms.iter().any(|known| known == alg) {
			algorithms.push(alg.to_owned());
		}
	}

	Ok(JwksReport { key_count: keys.len(), algorithms })
}

fn invalid(reason: String) -> Error {
	Error::Validation { field: "jwks_content", reason }
}
