use crate::catalog::Catalog;
use crate::parser::{CoordinateParser, ParserSettings};
use crate::reproject::Reprojector;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Request counters exported on /metrics.
#[derive(Debug, Default)]
pub struct Metrics {
    pub parse_requests: AtomicU64,
    pub parse_failures: AtomicU64,
    pub relationship_requests: AtomicU64,
    pub searches: AtomicU64,
    pub search_failures: AtomicU64,
    /// Shared with the reprojector, which bumps it on every identity fallback.
    pub degradations: Arc<AtomicU64>,
}

impl Metrics {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn read(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}

/// Everything handlers need. Nothing in here changes after startup apart
/// from the atomic counters, so no lock is involved.
pub struct State {
    pub parser: CoordinateParser,
    pub catalog: Catalog,
    pub metrics: Metrics,
    start_time: Instant,
}

impl State {
    pub fn new(settings: ParserSettings, catalog: Catalog) -> Self {
        let metrics = Metrics::default();
        let reprojector = Reprojector::utm(settings.zone)
            .with_policy(settings.policy)
            .with_degradation_counter(metrics.degradations.clone());
        Self::with_parser(
            CoordinateParser::with_reprojector(settings, reprojector),
            catalog,
            metrics,
        )
    }

    pub fn with_parser(parser: CoordinateParser, catalog: Catalog, metrics: Metrics) -> Self {
        Self {
            parser,
            catalog,
            metrics,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }
}
