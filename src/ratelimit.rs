use std::{sync::Arc, time::Duration};

use governor::{
	clock::QuantaInstant,
	middleware::{RateLimitingMiddleware, StateInformationMiddleware},
};
use tower_governor::{
	governor::{GovernorConfig, GovernorConfigBuilder},
	key_extractor::{KeyExtractor, PeerIpKeyExtractor},
};

/// Requests per second replenished for each client address.
pub const PER_SECOND: u64 = 10;
/// One request is replenished every this many milliseconds.
const REPLENISH_MS: u64 = 1000 / PER_SECOND;
/// Requests a client may burst before being limited.
pub const BURST_SIZE: u32 = 50;

/// How often stale rate limiting entries are dropped.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Limits every client address to [`PER_SECOND`] requests per second,
/// with bursts of up to [`BURST_SIZE`]. Limited clients receive a
/// `429 Too Many Requests` response, and every response carries the
/// `x-ratelimit-*` headers.
pub fn per_ip() -> Arc<GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>> {
	Arc::new(
		GovernorConfigBuilder::default()
			.per_millisecond(REPLENISH_MS)
			.burst_size(BURST_SIZE)
			.use_headers()
			.finish()
			.expect("rate limit period and burst size must be non-zero"),
	)
}

/// Periodically evicts rate limiting state of clients that have not been
/// seen recently, so the key storage doesn't grow without bound.
pub fn cleanup_old_limits<K, M>(configs: &[&Arc<GovernorConfig<K, M>>])
where
	K: KeyExtractor,
	<K as KeyExtractor>::Key: Send + Sync + 'static,
	M: RateLimitingMiddleware<QuantaInstant> + Send + Sync + 'static,
{
	let limiters = configs
		.iter()
		.map(|config| config.limiter().clone())
		.collect::<Vec<_>>();

	std::thread::spawn(move || loop {
		std::thread::sleep(CLEANUP_INTERVAL);

		for limiter in &limiters {
			tracing::debug!(size = limiter.len(), "pruning rate limiting storage");

			limiter.retain_recent();
		}
	});
}
