//! Memoisation of resolved component descriptors.

// std
use std::{
	collections::HashMap,
	sync::atomic::{AtomicU64, Ordering},
};
// crates.io
use tokio::sync::RwLock;
// self
use crate::{_prelude::*, component::descriptor::ComponentDescriptor, metrics};

/// Explicit descriptor cache owned by a resolver.
///
/// Entries are immutable once inserted; the first insert for an id wins, so a racing
/// detection costs at most one redundant host call.
#[derive(Debug, Default)]
pub struct DescriptorCache {
	entries: RwLock<HashMap<String, Arc<ComponentDescriptor>>>,
	hits: AtomicU64,
	misses: AtomicU64,
}
impl DescriptorCache {
	/// Create an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Look up a descriptor, recording the hit or miss.
	pub async fn get(&self, id: &str) -> Option<Arc<ComponentDescriptor>> {
		let found = { self.entries.read().await.get(id).cloned() };

		if found.is_some() {
			self.hits.fetch_add(1, Ordering::Relaxed);
		} else {
			self.misses.fetch_add(1, Ordering::Relaxed);
		}

		metrics::record_descriptor_lookup(found.is_some());

		found
	}

	/// Insert a descriptor unless one is already cached, returning the retained entry.
	pub async fn insert(&self, descriptor: ComponentDescriptor) -> Arc<ComponentDescriptor> {
		let mut entries = self.entries.write().await;

		entries.entry(descriptor.id.clone()).or_insert_with(|| Arc::new(descriptor)).clone()
	}

	/// Drop a single entry, forcing re-detection on next use.
	pub async fn invalidate(&self, id: &str) -> bool {
		self.entries.write().await.remove(id).is_some()
	}

	/// Drop every entry and zero the counters.
	pub async fn reset(&self) {
		self.entries.write().await.clear();
		self.hits.store(0, Ordering::Relaxed);
		self.misses.store(0, Ordering::Relaxed);

		tracing::debug!("descriptor cache reset");
	}

	/// Number of cached descriptors.
	pub async fn len(&self) -> usize {
		self.entries.read().await.len()
	}

	/// Whether the cache holds no descriptors.
	pub async fn is_empty(&self) -> bool {
		self.entries.read().await.is_empty()
	}

	/// Point-in-time counters.
	pub fn stats(&self) -> CacheStats {
		CacheStats {
			hits: self.hits.load(Ordering::Relaxed),
			misses: self.misses.load(Ordering::Relaxed),
		}
	}
}

/// Read-only snapshot of cache counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
	/// Lookups answered from the cache.
	pub hits: u64,
	/// Lookups that required host detection.
	pub misses: u64,
}
impl CacheStats {
	/// Ratio of hits over all lookups.
	pub fn hit_rate(&self) -> f64 {
		let total = self.hits + self.misses;

		if total == 0 { 0.0 } else { self.hits as f64 / total as f64 }
	}
}
