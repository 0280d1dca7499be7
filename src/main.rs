// src/main.rs
use order_loadtest::config::Config;
use order_loadtest::domain::errors::AppResult;
use order_loadtest::exchange::HttpOrderApi;
use order_loadtest::loadtest::{Report, RequestIssuer, TestDriver};

#[tokio::main(flavor = "current_thread")]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    config.init_logging()?;

    log::info!("Starting order-loadtest v{}", env!("CARGO_PKG_VERSION"));

    let rule = "=".repeat(60);
    println!("{}", rule);
    println!("Starting load test at {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("{}", rule);
    println!("{}", config);
    println!("{}", rule);

    let api = HttpOrderApi::new(
        &config.url,
        config.user_id,
        config.pool_size(),
        config.request_timeout(),
    );
    let issuer = RequestIssuer::new(api, &config.symbol);
    let driver = TestDriver::new(issuer, config.concurrency);

    let outcome = driver.run(config.test_type, config.total).await;

    println!("{}", Report::from_outcome(&outcome));
    Ok(())
}
