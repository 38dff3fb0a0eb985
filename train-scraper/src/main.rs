use std::str::FromStr;
use std::time::Duration;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use train_scraper::publish::{FilePublisher, publish};
use train_scraper::scrape::{
    NavigationConfig, NavigationController, RetryPolicy, RetryScheduler, ScrapeCycle,
    StaticRouteCatalog,
};
use train_scraper::webdriver::{
    SiteConfig, WebDriverClient, WebDriverConfig, WebDriverSessionFactory,
};

/// Read and parse an environment variable, falling back to `default`.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(name, value = %raw, "Ignoring unparseable setting");
            default
        }),
        Err(_) => default,
    }
}

/// Interval between cycles from `SCRAPER_INTERVAL_SECS`.
///
/// `None` means run a single cycle. Zero and unparseable values are
/// rejected with a warning.
fn cycle_interval(raw: Option<&str>) -> Option<Duration> {
    let raw = raw?;
    match raw.parse::<u64>() {
        Ok(0) => {
            warn!("SCRAPER_INTERVAL_SECS must be positive, running once");
            None
        }
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(_) => {
            warn!(value = %raw, "Ignoring unparseable SCRAPER_INTERVAL_SECS, running once");
            None
        }
    }
}

/// Run one cycle and publish its snapshot.
///
/// Returns false only when publishing failed. A cycle that failed on every
/// attempt publishes nothing, leaving the previous output in place.
async fn run_once(cycle: &ScrapeCycle<WebDriverSessionFactory>, publisher: &FilePublisher) -> bool {
    let outcome = cycle.run().await;

    let Some(snapshot) = outcome.value else {
        warn!(
            attempts = outcome.attempts,
            "No snapshot this cycle, keeping previous output"
        );
        return true;
    };

    match publish(publisher, &snapshot).await {
        Ok(()) => true,
        Err(e) => {
            error!(error = %e, "Failed to publish snapshot");
            false
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let Ok(site_url) = std::env::var("SCRAPER_SITE_URL") else {
        error!("SCRAPER_SITE_URL not set; nothing to scrape");
        std::process::exit(2);
    };

    let webdriver_url =
        std::env::var("WEBDRIVER_URL").unwrap_or_else(|_| "http://localhost:4444".to_string());
    let output_dir = std::env::var("SCRAPER_OUTPUT_DIR").unwrap_or_else(|_| "out".to_string());
    let step_timeout = Duration::from_secs(env_or("SCRAPER_STEP_TIMEOUT_SECS", 20));
    let max_attempts = env_or("SCRAPER_MAX_ATTEMPTS", 3);
    let interval = cycle_interval(std::env::var("SCRAPER_INTERVAL_SECS").ok().as_deref());

    // Create WebDriver client
    let driver_config = WebDriverConfig::new()
        .with_server_url(webdriver_url)
        .with_browser(std::env::var("WEBDRIVER_BROWSER").unwrap_or_else(|_| "chrome".to_string()))
        .with_headless(env_or("WEBDRIVER_HEADLESS", true));
    let client = WebDriverClient::new(driver_config).expect("Failed to create WebDriver client");

    // Create the pipeline
    let site = SiteConfig::new(site_url).with_step_timeout(step_timeout);
    let factory = WebDriverSessionFactory::new(client, site);

    // A walk has five bounded waits; leave headroom over their sum.
    let nav_config = NavigationConfig::default().with_iteration_timeout(step_timeout * 6);
    let mut controller = NavigationController::new(nav_config);
    if let Ok(routes) = std::env::var("SCRAPER_STATIC_ROUTES") {
        let fallback = StaticRouteCatalog::parse(&routes);
        info!(routes = fallback.len(), "Loaded static route fallback");
        controller = controller.with_fallback(fallback);
    }

    let scheduler = RetryScheduler::new(RetryPolicy::new(max_attempts, Duration::from_secs(5)));
    let cycle = ScrapeCycle::new(factory, controller, scheduler);
    let publisher = FilePublisher::new(&output_dir);

    info!(output = %output_dir, "Train scraper starting");

    let Some(period) = interval else {
        if !run_once(&cycle, &publisher).await {
            std::process::exit(1);
        }
        return;
    };

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        run_once(&cycle, &publisher).await;
    }
}
