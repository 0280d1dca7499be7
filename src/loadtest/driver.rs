// src/loadtest/driver.rs
use crate::domain::models::{TestResult, TestType};
use crate::exchange::client::OrderApi;
use crate::loadtest::issuer::RequestIssuer;
use futures_util::future::join_all;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;

/// Upper bound on warm-up placements before a cancel-only run.
pub const CANCEL_WARMUP_CAP: usize = 100;

/// Placements made before the measured phase.
#[derive(Debug, Clone, PartialEq)]
pub struct WarmupSummary {
    pub requested: usize,
    pub created: usize,
    pub elapsed: Duration,
}

/// Everything a run produced.
///
/// `results` holds only the measured phase; `elapsed` spans warm-up too.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub test_type: TestType,
    pub results: Vec<TestResult>,
    pub elapsed: Duration,
    pub warmup: Option<WarmupSummary>,
}

/// Fans requests out through the issuer with at most `concurrency` in flight.
pub struct TestDriver<A: OrderApi> {
    issuer: RequestIssuer<A>,
    limiter: Semaphore,
    concurrency: usize,
}

impl<A: OrderApi> TestDriver<A> {
    pub fn new(issuer: RequestIssuer<A>, concurrency: usize) -> Self {
        Self {
            issuer,
            limiter: Semaphore::new(concurrency),
            concurrency,
        }
    }

    pub fn issuer(&self) -> &RequestIssuer<A> {
        &self.issuer
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub async fn run(&self, test_type: TestType, total: usize) -> RunOutcome {
        let started = Instant::now();

        let (results, warmup) = match test_type {
            TestType::Place => (self.place_batch(total).await, None),
            TestType::Cancel => {
                let warmup = self.warm_up(total.min(CANCEL_WARMUP_CAP)).await;
                let cancels = total.min(warmup.created);
                (self.cancel_batch(cancels).await, Some(warmup))
            }
            TestType::Both => {
                // Over-provision so that cancels rarely find the registry empty.
                let warmup = self.warm_up(total + total / 2).await;
                (self.mixed_batch(total).await, Some(warmup))
            }
        };

        let elapsed = started.elapsed();
        log::info!(
            "{} run finished: {} requests in {:.2}s",
            test_type,
            results.len(),
            elapsed.as_secs_f64()
        );

        RunOutcome {
            test_type,
            results,
            elapsed,
            warmup,
        }
    }

    async fn warm_up(&self, count: usize) -> WarmupSummary {
        log::info!("Creating {} warm-up orders...", count);
        let started = Instant::now();
        let results = self.place_batch(count).await;
        let created = results.iter().filter(|r| r.is_success()).count();
        log::info!("Created {} orders during warm-up", created);

        WarmupSummary {
            requested: count,
            created,
            elapsed: started.elapsed(),
        }
    }

    async fn place_batch(&self, count: usize) -> Vec<TestResult> {
        join_all((0..count).map(|_| self.limited_place())).await
    }

    async fn cancel_batch(&self, count: usize) -> Vec<TestResult> {
        join_all((0..count).map(|_| self.limited_cancel())).await
    }

    async fn mixed_batch(&self, count: usize) -> Vec<TestResult> {
        join_all((0..count).map(|_| self.limited_mixed())).await
    }

    async fn limited_place(&self) -> TestResult {
        // The limiter is never closed; the permit is held until return.
        let _permit = self.limiter.acquire().await;
        self.issuer.place_order(None, None).await
    }

    async fn limited_cancel(&self) -> TestResult {
        let _permit = self.limiter.acquire().await;
        self.issuer.cancel_order(None).await
    }

    async fn limited_mixed(&self) -> TestResult {
        let _permit = self.limiter.acquire().await;
        if rand::random::<bool>() && !self.issuer.registry().is_empty().await {
            self.issuer.cancel_order(None).await
        } else {
            self.issuer.place_order(None, None).await
        }
    }
}
