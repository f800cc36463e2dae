//! Build statistics for a [`Polyhydra`](crate::Polyhydra) generator.
//!
//! Recording is a no-op unless the crate is built with `--features metrics`
//! and [`COLLECT_METRICS`] is set. The generator records every completed,
//! failed and rejected rebuild; hosts read the public fields for overlays.

use std::collections::VecDeque;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;
use std::sync::atomic::AtomicBool;

use crate::pipeline::ProcessingStats;

/// Builds kept per timing window.
const DEFAULT_WINDOW: usize = 64;

/// Runtime switch, only consulted when the `metrics` feature is on.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// True when the feature is compiled in and the runtime switch is on.
#[inline]
pub fn is_enabled() -> bool {
    #[cfg(feature = "metrics")]
    {
        COLLECT_METRICS.load(Ordering::Relaxed)
    }
    #[cfg(not(feature = "metrics"))]
    {
        false
    }
}

/// Last `capacity` timing samples in microseconds, oldest first.
#[derive(Debug, Clone)]
pub struct TimingWindow {
    samples: VecDeque<u64>,
    capacity: usize,
}

impl TimingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, dropping the oldest once full.
    pub fn push(&mut self, micros: u64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        if self.capacity > 0 {
            self.samples.push_back(micros);
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn total(&self) -> u64 {
        self.samples.iter().sum()
    }

    /// Mean sample, 0 when empty.
    pub fn average(&self) -> f64 {
        match self.samples.len() {
            0 => 0.0,
            n => self.total() as f64 / n as f64,
        }
    }

    /// Fastest and slowest sample.
    pub fn min_max(&self) -> Option<(u64, u64)> {
        let first = *self.samples.front()?;
        Some(
            self.samples
                .iter()
                .fold((first, first), |(lo, hi), &s| (lo.min(s), hi.max(s))),
        )
    }
}

impl Default for TimingWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

/// Per-generator build statistics.
#[derive(Debug, Clone, Default)]
pub struct GenerationMetrics {
    // Timing
    /// Base construction plus chain evaluation, microseconds.
    pub evaluate_timings: TimingWindow,
    /// Tessellation, microseconds.
    pub tessellate_timings: TimingWindow,
    /// Whole build, microseconds.
    pub total_timings: TimingWindow,

    // Outcomes
    pub builds_completed: u64,
    pub builds_failed: u64,
    pub requests_rejected: u64,

    // Cache effectiveness, summed over completed builds
    pub steps_applied: u64,
    pub steps_cached: u64,

    // Last build snapshot (for UI)
    pub last_triangle_count: usize,
    pub last_total_us: u64,
}

impl GenerationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset timings and the snapshot. Outcome counters are cumulative.
    pub fn reset(&mut self) {
        self.evaluate_timings.clear();
        self.tessellate_timings.clear();
        self.total_timings.clear();
        self.last_triangle_count = 0;
        self.last_total_us = 0;
    }

    /// Record a successful build.
    pub fn record_build(&mut self, stats: &ProcessingStats) {
        if !is_enabled() {
            return;
        }
        self.evaluate_timings.push(stats.evaluate_us);
        self.tessellate_timings.push(stats.tessellate_us);
        self.total_timings.push(stats.total_us);
        self.builds_completed += 1;
        self.steps_applied += stats.steps_applied as u64;
        self.steps_cached += stats.steps_cached as u64;
        self.last_triangle_count = stats.triangle_count;
        self.last_total_us = stats.total_us;
    }

    pub fn record_failure(&mut self) {
        if is_enabled() {
            self.builds_failed += 1;
        }
    }

    pub fn record_rejection(&mut self) {
        if is_enabled() {
            self.requests_rejected += 1;
        }
    }

    /// Fraction of operator steps served from the cache.
    pub fn step_hit_ratio(&self) -> f64 {
        let total = self.steps_applied + self.steps_cached;
        if total == 0 {
            0.0
        } else {
            self.steps_cached as f64 / total as f64
        }
    }

    pub fn avg_total_us(&self) -> f64 {
        self.total_timings.average()
    }
}
