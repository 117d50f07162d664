//! Politeness pacing between requests to the same source
//!
//! Every source has a gate remembering when its last request went out. A task
//! passes the gate only once a random `[min, max]` delay has elapsed since that
//! request, then stamps the gate with its own start time. The first request of
//! a source goes out immediately and unrelated sources never wait on each other.
//!
//! Tasks take their concurrency permit before the gate, so the gap is measured
//! between real request starts no matter how scarce permits are.

use crate::config::ScraperConfig;
use rand::Rng;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Delay bounds between consecutive requests to one source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Politeness {
    pub min: Duration,
    pub max: Duration,
}

impl Politeness {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// No delay at all
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(
            Duration::from_millis(config.politeness_min_ms),
            Duration::from_millis(config.politeness_max_ms),
        )
    }

    /// Draws one inter-request delay
    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let min_ms = self.min.as_millis() as u64;
        let max_ms = self.max.as_millis() as u64;
        Duration::from_millis(rand::rng().random_range(min_ms..=max_ms))
    }
}

/// Per-source request gates for one run
#[derive(Debug)]
pub struct SourceGates {
    politeness: Politeness,
    last_request: HashMap<String, Mutex<Option<Instant>>>,
}

impl SourceGates {
    /// Creates one gate per source label
    pub fn new<'a>(politeness: Politeness, sources: impl IntoIterator<Item = &'a str>) -> Self {
        let last_request = sources
            .into_iter()
            .map(|source| (source.to_string(), Mutex::new(None)))
            .collect();

        Self {
            politeness,
            last_request,
        }
    }

    /// Waits until `source` may be requested again and claims the slot
    ///
    /// Returns how long the caller waited. Same-source callers pass the gate
    /// one at a time; a source without a gate is never delayed.
    pub async fn wait_turn(&self, source: &str) -> Duration {
        let Some(gate) = self.last_request.get(source) else {
            return Duration::ZERO;
        };

        let mut last = gate.lock().await;
        let started = Instant::now();

        if let Some(previous) = *last {
            let ready_at = previous + self.politeness.sample();
            if ready_at > started {
                tracing::trace!(
                    "Holding {} for {:?}",
                    source,
                    ready_at.duration_since(started)
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }

        let now = Instant::now();
        *last = Some(now);
        now.duration_since(started)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn fixed(ms: u64) -> Politeness {
        Politeness::new(Duration::from_millis(ms), Duration::from_millis(ms))
    }

    #[test]
    fn test_sample_within_bounds() {
        let politeness = Politeness::new(Duration::from_millis(20), Duration::from_millis(40));
        for _ in 0..100 {
            let d = politeness.sample();
            assert!(d >= Duration::from_millis(20) && d <= Duration::from_millis(40));
        }
    }

    #[test]
    fn test_sample_fixed_when_bounds_equal() {
        assert_eq!(fixed(7).sample(), Duration::from_millis(7));
        assert_eq!(Politeness::none().sample(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_first_request_of_each_source_is_immediate() {
        let gates = SourceGates::new(fixed(200), ["RIA", "TASS"]);

        let started = Instant::now();
        gates.wait_turn("RIA").await;
        gates.wait_turn("TASS").await;
        gates.wait_turn("UNGATED").await;

        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_gap_measured_from_previous_request() {
        let gates = SourceGates::new(fixed(150), ["UA"]);

        let started = Instant::now();
        gates.wait_turn("UA").await;
        let waited = gates.wait_turn("UA").await;

        assert!(started.elapsed() >= Duration::from_millis(150));
        assert!(waited > Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_idle_source_is_not_delayed_again() {
        let gates = SourceGates::new(fixed(50), ["PL"]);

        gates.wait_turn("PL").await;
        tokio::time::sleep(Duration::from_millis(80)).await;
        let waited = gates.wait_turn("PL").await;

        assert!(waited < Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_concurrent_callers_are_spaced_out() {
        let gates = Arc::new(SourceGates::new(fixed(100), ["BY"]));

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let gates = Arc::clone(&gates);
                tokio::spawn(async move {
                    gates.wait_turn("BY").await;
                    Instant::now()
                })
            })
            .collect();

        let mut passed = Vec::new();
        for handle in handles {
            passed.push(handle.await.unwrap());
        }
        passed.sort();

        // Stamps are taken after the gate is released, so allow a little slack
        for pair in passed.windows(2) {
            assert!(pair[1].duration_since(pair[0]) >= Duration::from_millis(90));
        }
    }
}
