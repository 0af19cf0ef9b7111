//! Path normalisation for file-backed JWKS requests.
//!
//! # Threat Model
//! Request paths are untrusted. Every check here is lexical, so a rejected path never reaches
//! the filesystem and cannot be used to probe for the existence of files outside the base
//! directory. Percent-encoding is peeled repeatedly before inspection to defeat double-encoded
//! traversal sequences.

// std
use std::path::{Component, Path, PathBuf};
// self
use crate::_prelude::*;

/// Message carried by every base-directory violation.
pub const OUTSIDE_BASE_DIR: &str = "path must be within allowed directory";

const MAX_DECODE_ROUNDS: usize = 4;

/// Resolve an untrusted request path against a canonical base directory.
///
/// Rejects `..` components (raw or percent-encoded), NUL bytes, invalid encodings, drive
/// prefixes, and absolute paths that do not live under `base`. Every rejection carries
/// [`OUTSIDE_BASE_DIR`].
pub fn resolve_within(base: &Path, raw: &str) -> Result<PathBuf> {
	if raw.trim().is_empty() {
		return Err(Error::Validation {
			field: "jwks_file_path",
			reason: "JWKS file path must not be empty".into(),
		});
	}

	let decoded = decode_fully(raw)?;
	let unified = decoded.replace('\\', "/");

	if unified.contains('\0')
		|| unified.split('/').any(|segment| segment == "..")
		|| has_drive_prefix(&unified)
	{
		return Err(outside());
	}

	let candidate = Path::new(&unified);
	let mut resolved = if candidate.is_absolute() { PathBuf::new() } else { base.to_path_buf() };

	for component in candidate.components() {
		match component {
			Component::CurDir => {},
			Component::Normal(part) => resolved.push(part),
			Component::RootDir => resolved.push(component.as_os_str()),
			Component::ParentDir | Component::Prefix(_) => return Err(outside()),
		}
	}

	if !resolved.starts_with(base) {
		return Err(outside());
	}

	Ok(resolved)
}

fn decode_fully(raw: &str) -> Result<String> {
	let mut current = raw.to_owned();

	for _ in 0..MAX_DECODE_ROUNDS {
		let decoded = urlencoding::decode(&current).map_err(|_| outside())?.into_owned();

		if decoded == current {
			return Ok(decoded);
		}

		current = decoded;
	}

	// Still changing after the last round.
	Err(outside())
}

fn has_drive_prefix(path: &str) -> bool {
	let bytes = path.as_bytes();

	bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn outside() -> Error {
	Error::Security(OUTSIDE_BASE_DIR.into())
}
