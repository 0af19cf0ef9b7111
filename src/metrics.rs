//! Metrics helpers for descriptor lookups and JWKS validations.

// crates.io
use metrics::Label;
use smallvec::SmallVec;
// self
use crate::_prelude::*;

type LabelSet = SmallVec<[Label; 2]>;

const METRIC_DESCRIPTOR_LOOKUPS: &str = "component_config_descriptor_lookups_total";
const METRIC_VALIDATIONS_TOTAL: &str = "jwks_validation_total";
const METRIC_VALIDATION_DURATION: &str = "jwks_validation_duration_seconds";

/// Install the default Prometheus recorder backed by `metrics`.
///
/// Multiple invocations are safe; subsequent calls become no-ops once the recorder is installed.
#[cfg(feature = "prometheus")]
pub fn install_default_exporter() -> Result<()> {
	// std
	use std::sync::OnceLock;
	// crates.io
	use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

	static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

	if PROMETHEUS_HANDLE.get().is_some() {
		return Ok(());
	}

	let handle =
		PrometheusBuilder::new().install_recorder().map_err(|err| Error::Metrics(err.to_string()))?;
	let _ = PROMETHEUS_HANDLE.set(handle);

	Ok(())
}

/// Record a descriptor cache lookup.
pub fn record_descriptor_lookup(hit: bool) {
	let mut labels = LabelSet::new();

	labels.push(Label::new("outcome", if hit { "hit" } else { "miss" }));

	metrics::counter!(METRIC_DESCRIPTOR_LOOKUPS, labels.iter()).increment(1);
}

/// Record the verdict of one JWKS validation along with its latency.
pub fn record_validation(source: &'static str, outcome: &'static str, duration: Duration) {
	let mut labels = LabelSet::new();

	labels.push(Label::new("source", source));

	metrics::histogram!(METRIC_VALIDATION_DURATION, labels.iter()).record(duration.as_secs_f64());

	labels.push(Label::new("outcome", outcome));

	metrics::counter!(METRIC_VALIDATIONS_TOTAL, labels.iter()).increment(1);
}
