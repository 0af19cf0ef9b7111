//! Revision-checked property reads and writes.
//!
//! Writes are optimistic: every write re-reads the current revision, merges the caller's
//! changes, and lets the host arbitrate. A stale revision surfaces as [`Error::Conflict`];
//! retrying is left to the caller.

// std
use std::collections::BTreeMap;
// crates.io
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	component::{descriptor::ComponentDescriptor, resolver::ComponentResolver},
};

const STALE_REVISION_MARKER: &str = "not the most up-to-date revision";

/// Properties of a component together with the host revision they were read at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionedConfiguration {
	/// Component the properties belong to.
	pub component_id: String,
	/// Host-issued optimistic concurrency token.
	pub revision: u64,
	/// Current property values.
	pub properties: BTreeMap<String, String>,
}

/// Reads and writes component properties through the host REST API.
#[derive(Clone, Debug)]
pub struct PropertyStore {
	resolver: ComponentResolver,
}
impl PropertyStore {
	/// Create a store on top of a resolver.
	pub fn new(resolver: ComponentResolver) -> Self {
		Self { resolver }
	}

	/// Resolver used to discover component shapes.
	pub fn resolver(&self) -> &ComponentResolver {
		&self.resolver
	}

	/// Read the current properties and revision of a component.
	#[tracing::instrument(skip(self))]
	pub async fn read(&self, component_id: &str) -> Result<RevisionedConfiguration> {
		let descriptor = self.resolver.resolve(component_id).await?;
		let response = self.resolver.client().get(&descriptor.resource_path()).await?;
		let entity = response.json()?;

		decode_entity(&descriptor, &entity)
	}

	/// Merge `changes` into the component's current properties and write them back.
	///
	/// The revision sent is always the one obtained by this call's own read.
	#[tracing::instrument(skip(self, changes), fields(changed = changes.len()))]
	pub async fn write(
		&self,
		component_id: &str,
		changes: &BTreeMap<String, String>,
	) -> Result<RevisionedConfiguration> {
		let current = self.read(component_id).await?;
		let descriptor = self.resolver.resolve(component_id).await?;
		let mut merged = current.properties;

		merged.extend(changes.iter().map(|(key, value)| (key.clone(), value.clone())));

		let body = self.write_body(&descriptor, current.revision, &merged);

		tracing::debug!(revision = current.revision, "writing merged properties");

		let response = match self.resolver.client().put(&descriptor.resource_path(), &body).await
		{
			Ok(response) => response,
			Err(Error::HttpStatus { status, body, .. }) if is_stale_revision(status, &body) => {
				tracing::warn!(revision = current.revision, %status, "write rejected as stale");

				return Err(Error::Conflict {
					component_id: component_id.to_owned(),
					revision: current.revision,
					body,
				});
			},
			Err(err) => return Err(err),
		};
		let entity = response.json()?;

		decode_entity(&descriptor, &entity)
	}

	fn write_body(
		&self,
		descriptor: &ComponentDescriptor,
		revision: u64,
		properties: &BTreeMap<String, String>,
	) -> Value {
		let mut revision_body = Map::new();

		revision_body.insert("version".into(), Value::from(revision));

		if let Some(client_id) = &self.resolver.client().config().client_id {
			revision_body.insert("clientId".into(), Value::String(client_id.clone()));
		}

		let mut body = match descriptor.nest_properties(properties) {
			Value::Object(map) => map,
			_ => Map::new(),
		};

		body.insert("revision".into(), Value::Object(revision_body));

		Value::Object(body)
	}
}

#[derive(Debug, Deserialize)]
struct RevisionDto {
	version: u64,
}

fn decode_entity(
	descriptor: &ComponentDescriptor,
	entity: &Value,
) -> Result<RevisionedConfiguration> {
	let revision = entity
		.get("revision")
		.cloned()
		.map(serde_json::from_value::<RevisionDto>)
		.transpose()
		.map_err(|err| Error::Validation {
			field: "revision",
			reason: format!("Malformed revision: {err}."),
		})?
		.ok_or_else(|| Error::Validation {
			field: "revision",
			reason: "Host entity carries no revision.".into(),
		})?;

	Ok(RevisionedConfiguration {
		component_id: descriptor.id.clone(),
		revision: revision.version,
		properties: descriptor.extract_properties(entity),
	})
}

fn is_stale_revision(status: StatusCode, body: &str) -> bool {
	status == StatusCode::CONFLICT
		|| (status == StatusCode::BAD_REQUEST && body.contains(STALE_REVISION_MARKER))
}
