//! Component kinds, their REST resource families, and resolved descriptors.

// std
use std::{collections::BTreeMap, fmt, str::FromStr};
// crates.io
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
// self
use crate::_prelude::*;

/// REST shape shared by every component of one kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceFamily {
	/// Host-relative collection path; the component id is appended to it.
	pub path: &'static str,
	/// Nested keys leading from the entity document to the property map.
	pub property_path: &'static [&'static str],
}

const PROCESSOR_FAMILY: ResourceFamily =
	ResourceFamily { path: "processors", property_path: &["component", "config", "properties"] };
const CONTROLLER_SERVICE_FAMILY: ResourceFamily =
	ResourceFamily { path: "controller-services", property_path: &["component", "properties"] };

/// Kind of configurable component hosted by the runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentKind {
	/// Flow processor; properties are wrapped in a nested `config` object.
	Processor,
	/// Shared configuration service.
	ControllerService,
}
impl ComponentKind {
	/// Resource family for this kind.
	pub fn resource_family(self) -> &'static ResourceFamily {
		match self {
			Self::Processor => &PROCESSOR_FAMILY,
			Self::ControllerService => &CONTROLLER_SERVICE_FAMILY,
		}
	}

	/// Wire name reported by the host.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Processor => "PROCESSOR",
			Self::ControllerService => "CONTROLLER_SERVICE",
		}
	}
}
impl fmt::Display for ComponentKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for ComponentKind {
	type Err = Error;

	fn from_str(value: &str) -> Result<Self> {
		match value.trim() {
			"PROCESSOR" => Ok(Self::Processor),
			"CONTROLLER_SERVICE" => Ok(Self::ControllerService),
			other => Err(Error::Validation {
				field: "type",
				reason: format!("Unsupported component type '{other}'."),
			}),
		}
	}
}

/// Resolved REST shape of a single component.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
	/// Component identifier.
	pub id: String,
	/// Detected kind.
	pub kind: ComponentKind,
	/// Implementation class reported by the host, if any.
	pub component_class: Option<String>,
	/// Host-relative collection path of the resource family.
	pub resource_family: String,
	/// Keys leading to the property map inside the entity document.
	pub property_path: Vec<String>,
}
impl ComponentDescriptor {
	/// Build a descriptor from a detected kind.
	pub fn new(id: impl Into<String>, kind: ComponentKind, component_class: Option<String>) -> Self {
		let family = kind.resource_family();

		Self {
			id: id.into(),
			kind,
			component_class,
			resource_family: family.path.to_owned(),
			property_path: family.property_path.iter().map(|segment| (*segment).to_owned()).collect(),
		}
	}

	/// Host-relative path of this component's entity.
	pub fn resource_path(&self) -> String {
		format!("{}/{}", self.resource_family, urlencoding::encode(&self.id))
	}

	/// Pull the property map out of an entity document.
	///
	/// A missing path segment yields an empty map. Null values are skipped and non-string
	/// scalars keep their JSON rendering.
	pub fn extract_properties(&self, entity: &Value) -> BTreeMap<String, String> {
		let mut cursor = entity;

		for segment in &self.property_path {
			match cursor.get(segment) {
				Some(next) => cursor = next,
				None => return BTreeMap::new(),
			}
		}

		let Some(map) = cursor.as_object() else {
			return BTreeMap::new();
		};

		map.iter()
			.filter_map(|(key, value)| match value {
				Value::Null => None,
				Value::String(s) => Some((key.clone(), s.clone())),
				other => Some((key.clone(), other.to_string())),
			})
			.collect()
	}

	/// Nest a property map under the property path, producing the `component` portion of a
	/// write body (the leading `component` segment is included).
	pub fn nest_properties(&self, properties: &BTreeMap<String, String>) -> Value {
		let mut value = Value::Object(
			properties.iter().map(|(key, value)| (key.clone(), Value::String(value.clone()))).collect(),
		);

		for (depth, segment) in self.property_path.iter().enumerate().rev() {
			let mut wrapper = Map::new();

			// The component object must name the entity it belongs to.
			if depth == 0
				&& let Value::Object(inner) = &mut value
			{
				inner.insert("id".into(), Value::String(self.id.clone()));
			}

			wrapper.insert(segment.clone(), value);
			value = Value::Object(wrapper);
		}

		value
	}
}
