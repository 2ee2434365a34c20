//! Fixed-cadence driver for `CruiseController`.
//!
//! `Ticker` paces iterations against absolute deadlines: the wait after a tick is
//! shortened by the time the tick took, and a tick that overruns its slot starts
//! the next one immediately instead of accumulating drift.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use cruise_traits::Clock;

use crate::builder::CruiseController;
use crate::error::Result;
use crate::status::TickReport;
use crate::util::tick_rate_hz;

pub struct Ticker {
    clock: Arc<dyn Clock + Send + Sync>,
    period: Duration,
    next: Instant,
    overruns: u64,
}

impl Ticker {
    pub fn new(clock: Arc<dyn Clock + Send + Sync>, tick_ms: u64) -> Self {
        let period = Duration::from_millis(tick_ms.max(1));
        let next = clock.now() + period;
        Self {
            clock,
            period,
            next,
            overruns: 0,
        }
    }

    /// Block until the next deadline. An already-missed deadline counts as an
    /// overrun and the schedule restarts from now.
    pub fn wait(&mut self) {
        let now = self.clock.now();
        if now > self.next {
            self.overruns += 1;
            tracing::trace!(
                late_ms = now.duration_since(self.next).as_millis() as u64,
                "tick overrun"
            );
            self.next = now + self.period;
            return;
        }
        self.clock.sleep_until(self.next);
        self.next += self.period;
    }

    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Overrides the controller's `LoopCfg::tick_ms` when set.
    pub tick_ms: Option<u64>,
    /// Stop after this many ticks; `None` runs until shutdown.
    pub max_ticks: Option<u64>,
    /// Record per-tick latency for `RunSummary::latency`.
    pub collect_stats: bool,
}

/// Tick latency statistics in microseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyStats {
    pub samples: usize,
    pub min_us: u64,
    pub max_us: u64,
    pub mean_us: f64,
    pub p95_us: u64,
}

impl LatencyStats {
    pub fn from_samples(samples: &mut [u64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        samples.sort_unstable();
        let n = samples.len();
        let sum: u128 = samples.iter().map(|&v| u128::from(v)).sum();
        let p95_idx = ((n * 95).div_ceil(100)).saturating_sub(1).min(n - 1);
        Some(Self {
            samples: n,
            min_us: samples[0],
            max_us: samples[n - 1],
            mean_us: sum as f64 / n as f64,
            p95_us: samples[p95_idx],
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub ticks: u64,
    pub overruns: u64,
    pub failed_ticks: u64,
    pub last_report: Option<TickReport>,
    pub latency: Option<LatencyStats>,
}

/// Run the loop until `shutdown` is set or `max_ticks` is reached.
///
/// A failing tick is logged and counted; the loop keeps going. On the way out
/// the motor is commanded to 0.
pub fn run<F>(
    controller: &mut CruiseController,
    opts: &RunOptions,
    shutdown: &AtomicBool,
    mut on_tick: F,
) -> Result<RunSummary>
where
    F: FnMut(&TickReport),
{
    let tick_ms = opts
        .tick_ms
        .unwrap_or(controller.settings().control.tick_ms)
        .max(1);
    let clock = controller.clock();
    let mut ticker = Ticker::new(Arc::clone(&clock), tick_ms);
    let mut summary = RunSummary::default();
    let mut latencies: Vec<u64> = Vec::new();

    controller.begin();
    tracing::info!(
        tick_ms,
        hz = tick_rate_hz(tick_ms),
        max_ticks = ?opts.max_ticks,
        "control loop start"
    );

    while !shutdown.load(Ordering::Relaxed) {
        if opts.max_ticks.is_some_and(|max| summary.ticks >= max) {
            break;
        }
        let started = clock.now();
        match controller.tick() {
            Ok(report) => {
                on_tick(&report);
                summary.last_report = Some(report);
            }
            Err(e) => {
                summary.failed_ticks += 1;
                tracing::warn!(error = ?e, "tick failed");
            }
        }
        summary.ticks += 1;
        if opts.collect_stats {
            let us = clock.now().saturating_duration_since(started).as_micros();
            latencies.push(u64::try_from(us).unwrap_or(u64::MAX));
        }
        ticker.wait();
    }

    summary.overruns = ticker.overruns();
    summary.latency = LatencyStats::from_samples(&mut latencies);

    if let Err(e) = controller.stop() {
        tracing::warn!(error = ?e, "motor stop failed on exit");
    }
    tracing::info!(
        ticks = summary.ticks,
        overruns = summary.overruns,
        failed_ticks = summary.failed_ticks,
        "control loop stop"
    );
    Ok(summary)
}
