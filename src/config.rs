// src/config.rs
use crate::domain::errors::{AppError, AppResult};
use crate::domain::models::{tick_size_for, TestType};
use clap::Parser;
use dotenv::dotenv;
use std::fmt;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Per-request timeout, covering send and full body read.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Command line, with environment fallbacks for every flag
#[derive(Debug, Clone, Parser)]
#[command(
    name = "order-loadtest",
    version,
    about = "Concurrent place/cancel load test for the order service"
)]
pub struct Cli {
    /// Order service base URL
    #[arg(long, env = "LOADTEST_URL", default_value = "http://localhost:8081")]
    pub url: String,

    /// Maximum number of requests in flight
    #[arg(long, env = "LOADTEST_CONCURRENCY", default_value_t = 10)]
    pub concurrency: usize,

    /// Number of measured requests
    #[arg(long, env = "LOADTEST_TOTAL", default_value_t = 100)]
    pub total: usize,

    /// Workload to run
    #[arg(long, env = "LOADTEST_TEST_TYPE", value_enum, default_value_t = TestType::Both)]
    pub test_type: TestType,

    /// Trading pair
    #[arg(long, env = "LOADTEST_SYMBOL", default_value = "BTCUSDT")]
    pub symbol: String,

    /// Value sent in the userId header
    #[arg(long, env = "LOADTEST_USER_ID", default_value_t = 1_000_000_000_000_000_001)]
    pub user_id: i64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Load test configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub url: String,
    pub concurrency: usize,
    pub total: usize,
    pub test_type: TestType,
    pub symbol: String,
    pub user_id: i64,
    pub log_level: String,
}

impl Config {
    /// Load configuration from the command line, `.env` and the environment
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        Self::from_cli(Cli::parse())
    }

    pub fn from_cli(cli: Cli) -> AppResult<Self> {
        let config = Config {
            url: cli.url.trim_end_matches('/').to_string(),
            concurrency: cli.concurrency,
            total: cli.total,
            test_type: cli.test_type,
            symbol: cli.symbol,
            user_id: cli.user_id,
            log_level: cli.log_level,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.concurrency == 0 {
            return Err(AppError::Config(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.concurrency > Semaphore::MAX_PERMITS {
            return Err(AppError::Config(format!(
                "concurrency must not exceed {}",
                Semaphore::MAX_PERMITS
            )));
        }
        if self.url.is_empty() {
            return Err(AppError::Config("url must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn tick_size(&self) -> i64 {
        tick_size_for(&self.symbol)
    }

    /// Idle connections kept per host
    pub fn pool_size(&self) -> usize {
        self.concurrency * 2
    }

    pub fn request_timeout(&self) -> Duration {
        REQUEST_TIMEOUT
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> AppResult<()> {
        let mut builder = env_logger::Builder::new();

        let log_level = match self.log_level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        };

        builder.filter_level(log_level);
        builder
            .try_init()
            .map_err(|e| AppError::Config(format!("Failed to initialize logger: {}", e)))?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: "http://localhost:8081".to_string(),
            concurrency: 10,
            total: 100,
            test_type: TestType::Both,
            symbol: "BTCUSDT".to_string(),
            user_id: 1_000_000_000_000_000_001,
            log_level: "info".to_string(),
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Target: {}", self.url)?;
        writeln!(f, "Concurrency: {}", self.concurrency)?;
        writeln!(f, "Total requests: {}", self.total)?;
        writeln!(f, "Test type: {}", self.test_type)?;
        writeln!(f, "User ID: {}", self.user_id)?;
        write!(f, "Symbol: {} (tick size {})", self.symbol, self.tick_size())
    }
}
