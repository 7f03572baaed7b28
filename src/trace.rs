use std::{str::FromStr, time::Duration};

use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
	metrics::{
		reader::{DefaultAggregationSelector, DefaultTemporalitySelector},
		Aggregation, Instrument, MeterProviderBuilder, PeriodicReader, SdkMeterProvider, Stream,
	},
	runtime,
	trace::{BatchConfig, Sampler, Tracer},
	Resource,
};
use opentelemetry_semantic_conventions::{
	resource::{DEPLOYMENT_ENVIRONMENT, SERVICE_NAME, SERVICE_VERSION},
	SCHEMA_URL,
};
use tracing::level_filters::LevelFilter;
use tracing_opentelemetry::MetricsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Name of the request latency histogram, see `record_latency` in `main.rs`.
const LATENCY_METRIC: &str = "latency_ms";

const METRICS_INTERVAL: Duration = Duration::from_secs(5);

fn environment() -> &'static str {
	if cfg!(debug_assertions) {
		"development"
	} else {
		"production"
	}
}

fn resource() -> Resource {
	Resource::from_schema_url(
		[
			KeyValue::new(SERVICE_NAME, env!("CARGO_PKG_NAME")),
			KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
			KeyValue::new(DEPLOYMENT_ENVIRONMENT, environment()),
		],
		SCHEMA_URL,
	)
}

/// Keeps the latency histogram under its own name with the default buckets.
fn latency_view(instrument: &Instrument) -> Option<Stream> {
	(instrument.name == LATENCY_METRIC).then(|| {
		Stream::new()
			.name(LATENCY_METRIC)
			.aggregation(Aggregation::Default)
	})
}

/// Pushes metrics to the OTLP collector at `endpoint`. Debug builds also
/// print them to stdout.
fn meter_provider(endpoint: &str) -> SdkMeterProvider {
	let exporter = opentelemetry_otlp::new_exporter()
		.tonic()
		.with_endpoint(endpoint)
		.build_metrics_exporter(
			Box::new(DefaultAggregationSelector::new()),
			Box::new(DefaultTemporalitySelector::new()),
		)
		.expect("failed to build the OTLP metrics exporter");

	let mut builder = MeterProviderBuilder::default()
		.with_resource(resource())
		.with_reader(
			PeriodicReader::builder(exporter, runtime::Tokio)
				.with_interval(METRICS_INTERVAL)
				.build(),
		)
		.with_view(latency_view);

	if cfg!(debug_assertions) {
		builder = builder.with_reader(
			PeriodicReader::builder(
				opentelemetry_stdout::MetricsExporter::default(),
				runtime::Tokio,
			)
			.build(),
		);
	}

	let provider = builder.build();
	global::set_meter_provider(provider.clone());

	provider
}

/// Exports every span to the OTLP collector at `endpoint` in batches.
fn tracer(endpoint: &str) -> Tracer {
	let config = opentelemetry_sdk::trace::Config::default()
		.with_sampler(Sampler::AlwaysOn)
		.with_resource(resource());

	opentelemetry_otlp::new_pipeline()
		.tracing()
		.with_trace_config(config)
		.with_batch_config(BatchConfig::default())
		.with_exporter(
			opentelemetry_otlp::new_exporter()
				.tonic()
				.with_endpoint(endpoint),
		)
		.install_batch(runtime::Tokio)
		.expect("failed to install the OTLP trace pipeline")
}

/// Installs the global subscriber: formatted logs at `LOG_LEVEL`, plus span
/// and metric export when an OTLP endpoint is configured.
///
/// Keep the returned guard alive for the lifetime of the program so pending
/// telemetry is flushed on shutdown.
pub fn init_tracing_subscriber(config: &Config) -> Option<OtelGuard> {
	let level = LevelFilter::from_str(&config.log_level).unwrap_or(LevelFilter::INFO);
	let subscriber = tracing_subscriber::registry()
		.with(level)
		.with(tracing_subscriber::fmt::layer().with_ansi(true));

	let Some(endpoint) = config.otlp_endpoint.as_deref() else {
		subscriber.init();

		return None;
	};

	let meter_provider = meter_provider(endpoint);

	subscriber
		.with(MetricsLayer::new(meter_provider.clone()))
		.with(tracing_opentelemetry::layer().with_tracer(tracer(endpoint)))
		.init();

	tracing::info!(endpoint, "exporting telemetry");

	Some(OtelGuard { meter_provider })
}

/// Flushes and shuts down telemetry export when dropped.
pub struct OtelGuard {
	meter_provider: SdkMeterProvider,
}

impl Drop for OtelGuard {
	fn drop(&mut self) {
		if let Err(error) = self.meter_provider.shutdown() {
			eprintln!("failed to shut down the meter provider: {error:?}");
		}

		global::shutdown_tracer_provider();
	}
}
