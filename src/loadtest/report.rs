// src/loadtest/report.rs
use crate::domain::models::{RequestKind, TestResult};
use crate::loadtest::driver::{RunOutcome, WarmupSummary};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

const RULE_WIDTH: usize = 60;

/// Latency figures over successful requests, in seconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatencyStats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
}

impl LatencyStats {
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Self {
            avg: sorted.iter().sum::<f64>() / sorted.len() as f64,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            p50: percentile(&sorted, 0.50),
            p95: percentile(&sorted, 0.95),
            p99: percentile(&sorted, 0.99),
        }
    }
}

/// Nearest-rank lookup without interpolation: `sorted[floor(fraction * n)]`.
///
/// `sorted` must be ascending. Returns 0.0 for an empty slice.
pub fn percentile(sorted: &[f64], fraction: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let index = (fraction * sorted.len() as f64) as usize;
    sorted[index.min(sorted.len() - 1)]
}

#[derive(Debug, Clone, PartialEq)]
pub struct KindBreakdown {
    pub kind: RequestKind,
    pub total: usize,
    pub success: usize,
}

/// Aggregated view of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub total: usize,
    pub success_count: usize,
    pub fail_count: usize,
    pub elapsed: Duration,
    pub qps: f64,
    pub latency: LatencyStats,
    /// Failure messages with their counts, most frequent first.
    pub errors: Vec<(String, usize)>,
    pub by_kind: Vec<KindBreakdown>,
    pub warmup: Option<WarmupSummary>,
}

impl Report {
    pub fn from_results(results: &[TestResult], elapsed: Duration) -> Self {
        let total = results.len();
        let success_count = results.iter().filter(|r| r.is_success()).count();

        let latencies: Vec<f64> = results
            .iter()
            .filter(|r| r.is_success())
            .map(|r| r.response_time())
            .collect();

        let elapsed_secs = elapsed.as_secs_f64();
        let qps = if elapsed_secs > 0.0 {
            total as f64 / elapsed_secs
        } else {
            0.0
        };

        Self {
            total,
            success_count,
            fail_count: total - success_count,
            elapsed,
            qps,
            latency: LatencyStats::from_samples(&latencies),
            errors: rank_errors(results),
            by_kind: breakdown(results),
            warmup: None,
        }
    }

    pub fn from_outcome(outcome: &RunOutcome) -> Self {
        let mut report = Self::from_results(&outcome.results, outcome.elapsed);
        report.warmup = outcome.warmup.clone();
        report
    }

    pub fn success_rate(&self) -> f64 {
        rate(self.success_count, self.total)
    }

    pub fn fail_rate(&self) -> f64 {
        rate(self.fail_count, self.total)
    }
}

fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Count failures by message; ties keep the order they were first seen in.
fn rank_errors(results: &[TestResult]) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for result in results.iter().filter(|r| !r.is_success()) {
        let message = match result.error_message() {
            Some(message) if !message.is_empty() => message.to_string(),
            _ => format!("HTTP {}", result.status_code()),
        };
        match index.get(&message) {
            Some(&i) => ranked[i].1 += 1,
            None => {
                index.insert(message.clone(), ranked.len());
                ranked.push((message, 1));
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

fn breakdown(results: &[TestResult]) -> Vec<KindBreakdown> {
    [RequestKind::Place, RequestKind::Cancel]
        .into_iter()
        .filter_map(|kind| {
            let of_kind = results.iter().filter(|r| r.kind() == kind);
            let total = of_kind.clone().count();
            (total > 0).then(|| KindBreakdown {
                kind,
                total,
                success: of_kind.filter(|r| r.is_success()).count(),
            })
        })
        .collect()
}

fn ms(seconds: f64) -> f64 {
    seconds * 1000.0
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(f, "{}", rule)?;
        writeln!(f, "Load test results")?;
        writeln!(f, "{}", rule)?;

        if let Some(warmup) = &self.warmup {
            writeln!(
                f,
                "Warm-up: {}/{} orders created in {:.2}s",
                warmup.created,
                warmup.requested,
                warmup.elapsed.as_secs_f64()
            )?;
        }

        writeln!(f, "Total requests: {}", self.total)?;
        writeln!(f, "Succeeded: {} ({:.2}%)", self.success_count, self.success_rate())?;
        writeln!(f, "Failed: {} ({:.2}%)", self.fail_count, self.fail_rate())?;
        writeln!(f, "Elapsed: {:.2} s", self.elapsed.as_secs_f64())?;
        writeln!(f, "QPS: {:.2}", self.qps)?;

        if self.by_kind.len() > 1 {
            writeln!(f)?;
            writeln!(f, "By request type:")?;
            for kind in &self.by_kind {
                writeln!(f, "  {}: {} ({} succeeded)", kind.kind, kind.total, kind.success)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Response times (successful requests):")?;
        writeln!(f, "  Avg: {:.2} ms", ms(self.latency.avg))?;
        writeln!(f, "  Min: {:.2} ms", ms(self.latency.min))?;
        writeln!(f, "  Max: {:.2} ms", ms(self.latency.max))?;
        writeln!(f, "  P50: {:.2} ms", ms(self.latency.p50))?;
        writeln!(f, "  P95: {:.2} ms", ms(self.latency.p95))?;
        writeln!(f, "  P99: {:.2} ms", ms(self.latency.p99))?;

        if !self.errors.is_empty() {
            writeln!(f)?;
            writeln!(f, "Errors:")?;
            for (message, count) in &self.errors {
                writeln!(f, "  {}: {}", message, count)?;
            }
        }

        write!(f, "{}", rule)
    }
}
