//! Component configuration resolver with revision-checked writes, plus a hardened JWKS
//! validation service for URL, file, and inline key material.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod component;
pub mod config;
pub mod http;
pub mod metrics;
pub mod validation;

mod error;
mod _prelude {
	pub use std::{sync::Arc, time::Duration};

	pub use tokio::time::Instant;

	pub use crate::{Error, Result};
}

pub use crate::{
	component::{
		cache::{CacheStats, DescriptorCache},
		descriptor::{ComponentDescriptor, ComponentKind, ResourceFamily},
		resolver::ComponentResolver,
		store::{PropertyStore, RevisionedConfiguration},
	},
	config::{HostConfig, ValidatorConfig},
	error::{Error, ErrorKind, Result},
	http::{
		client::{HostClient, HostResponse},
		session::Session,
	},
	validation::{JwksReport, JwksValidator, ValidationRequest, ValidationResult, server::router},
};
#[cfg(feature = "prometheus")] pub use crate::metrics::install_default_exporter;
