//! Component type detection backed by the descriptor cache.

// crates.io
use http::Method;
use serde::Deserialize;
// self
use crate::{
	_prelude::*,
	component::{
		cache::DescriptorCache,
		descriptor::{ComponentDescriptor, ComponentKind},
	},
	http::{client::HostClient, session::COMPONENT_ID_QUERY_PARAM},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComponentInfo {
	#[serde(rename = "type")]
	kind: String,
	#[serde(default)]
	component_class: Option<String>,
}

/// Resolves component ids into descriptors, asking the host at most once per id.
#[derive(Clone, Debug)]
pub struct ComponentResolver {
	client: HostClient,
	cache: Arc<DescriptorCache>,
}
impl ComponentResolver {
	/// Create a resolver with a fresh cache.
	pub fn new(client: HostClient) -> Self {
		Self::with_cache(client, Arc::new(DescriptorCache::new()))
	}

	/// Create a resolver sharing an existing cache.
	pub fn with_cache(client: HostClient, cache: Arc<DescriptorCache>) -> Self {
		Self { client, cache }
	}

	/// Host client used for detection and entity calls.
	pub fn client(&self) -> &HostClient {
		&self.client
	}

	/// Cache backing this resolver.
	pub fn cache(&self) -> &Arc<DescriptorCache> {
		&self.cache
	}

	/// Resolve the descriptor for a component id.
	#[tracing::instrument(skip(self))]
	pub async fn resolve(&self, component_id: &str) -> Result<Arc<ComponentDescriptor>> {
		if component_id.trim().is_empty() {
			return Err(Error::Validation {
				field: "component_id",
				reason: "Must not be empty.".into(),
			});
		}
		if let Some(descriptor) = self.cache.get(component_id).await {
			return Ok(descriptor);
		}

		tracing::debug!("descriptor cache miss; detecting component type");

		let config = self.client.config();
		let mut url = config.endpoint(&config.component_info_path)?;

		url.query_pairs_mut().append_pair(COMPONENT_ID_QUERY_PARAM, component_id);

		let response = self.client.request(Method::GET, url, None).await?;
		let info: ComponentInfo = serde_json::from_str(&response.body).map_err(|err| {
			Error::Validation {
				field: "component_info",
				reason: format!("Unexpected component-info body: {err}."),
			}
		})?;
		let kind: ComponentKind = info.kind.parse()?;
		let descriptor = ComponentDescriptor::new(component_id, kind, info.component_class);

		tracing::debug!(%kind, family = %descriptor.resource_family, "component type detected");

		Ok(self.cache.insert(descriptor).await)
	}
}
