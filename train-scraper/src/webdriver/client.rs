//! WebDriver HTTP client.
//!
//! Speaks the W3C WebDriver protocol to a driver server (chromedriver,
//! geckodriver, or a Selenium grid). Only the handful of commands the
//! status page walk needs are implemented.

use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use super::error::WebDriverError;
use super::types::{ElementRef, ErrorValue, Locator, NavigateTo, NewSession, Reply};

/// Default driver server address (chromedriver/Selenium default port).
const DEFAULT_SERVER_URL: &str = "http://localhost:4444";

/// Default interval between element polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Configuration for the WebDriver client.
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    /// Driver server base URL
    pub server_url: String,
    /// Browser to request (`chrome` or `firefox`)
    pub browser: String,
    /// Run the browser without a window
    pub headless: bool,
    /// Per-command HTTP timeout in seconds
    pub request_timeout_secs: u64,
    /// Interval between polls while waiting for elements
    pub poll_interval: Duration,
}

impl WebDriverConfig {
    /// Create a config with defaults for a local chromedriver.
    pub fn new() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            browser: "chrome".to_string(),
            headless: true,
            request_timeout_secs: 30,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the driver server URL.
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    /// Set the browser name.
    pub fn with_browser(mut self, browser: impl Into<String>) -> Self {
        self.browser = browser.into();
        self
    }

    /// Show or hide the browser window.
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set the per-command HTTP timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Set the interval between element polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Capabilities for the new-session request.
    fn capabilities(&self) -> serde_json::Value {
        let mut always_match = json!({ "browserName": self.browser });
        if self.headless {
            match self.browser.as_str() {
                "firefox" => {
                    always_match["moz:firefoxOptions"] = json!({ "args": ["-headless"] });
                }
                _ => {
                    always_match["goog:chromeOptions"] =
                        json!({ "args": ["--headless=new", "--no-sandbox", "--disable-gpu"] });
                }
            }
        }
        json!({ "capabilities": { "alwaysMatch": always_match } })
    }
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for a WebDriver server.
///
/// Cheap to clone; every session it opens shares the same HTTP pool.
#[derive(Debug, Clone)]
pub struct WebDriverClient {
    http: reqwest::Client,
    config: WebDriverConfig,
}

impl WebDriverClient {
    /// Create a new client with the given configuration.
    pub fn new(config: WebDriverConfig) -> Result<Self, WebDriverError> {
        // Driver servers run next to the scraper; never route them through
        // an HTTP proxy from the environment.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .no_proxy()
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &WebDriverConfig {
        &self.config
    }

    /// Start a new browser session.
    pub async fn new_session(&self) -> Result<BrowserSession, WebDriverError> {
        let url = format!("{}/session", self.config.server_url.trim_end_matches('/'));
        let request = self.http.post(&url).json(&self.config.capabilities());
        let session: NewSession = send(request).await?;

        debug!(session = %session.session_id, "Opened browser session");

        Ok(BrowserSession {
            http: self.http.clone(),
            base_url: format!("{url}/{}", session.session_id),
            id: session.session_id,
        })
    }
}

/// One live browser session.
///
/// Dropping a session does not close the browser; call
/// [`delete`](Self::delete).
#[derive(Debug)]
pub struct BrowserSession {
    http: reqwest::Client,
    base_url: String,
    id: String,
}

impl BrowserSession {
    /// Load a page and wait for the driver's page-load strategy.
    pub async fn navigate(&self, url: &str) -> Result<(), WebDriverError> {
        self.command::<_, serde_json::Value>(Method::POST, "/url", Some(&NavigateTo { url }))
            .await?;
        Ok(())
    }

    /// All elements matching a CSS selector, in document order.
    pub async fn find_all(&self, selector: &str) -> Result<Vec<ElementRef>, WebDriverError> {
        self.command(Method::POST, "/elements", Some(&Locator::css(selector)))
            .await
    }

    /// All descendants of `parent` matching a CSS selector.
    pub async fn find_all_in(
        &self,
        parent: &ElementRef,
        selector: &str,
    ) -> Result<Vec<ElementRef>, WebDriverError> {
        let path = format!("/element/{}/elements", parent.id);
        self.command(Method::POST, &path, Some(&Locator::css(selector)))
            .await
    }

    pub async fn click(&self, element: &ElementRef) -> Result<(), WebDriverError> {
        let path = format!("/element/{}/click", element.id);
        self.command::<_, serde_json::Value>(Method::POST, &path, Some(&json!({})))
            .await?;
        Ok(())
    }

    /// Rendered text of an element.
    pub async fn text(&self, element: &ElementRef) -> Result<String, WebDriverError> {
        let path = format!("/element/{}/text", element.id);
        self.command::<(), _>(Method::GET, &path, None).await
    }

    /// Tag name of an element. Cheap; mostly useful to test whether a
    /// reference is still attached to the page.
    pub async fn tag_name(&self, element: &ElementRef) -> Result<String, WebDriverError> {
        let path = format!("/element/{}/name", element.id);
        self.command::<(), _>(Method::GET, &path, None).await
    }

    /// End the session and close the browser.
    pub async fn delete(self) -> Result<(), WebDriverError> {
        let request = self.http.delete(&self.base_url);
        send::<serde_json::Value>(request).await?;
        debug!(session = %self.id, "Closed browser session");
        Ok(())
    }

    async fn command<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, WebDriverError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        send(request).await
    }
}

/// Send a command and unwrap the `value` envelope.
async fn send<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, WebDriverError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(match serde_json::from_str::<Reply<ErrorValue>>(&body) {
            Ok(reply) => WebDriverError::Command {
                status: status.as_u16(),
                error: reply.value.error,
                message: reply.value.message,
            },
            Err(_) => WebDriverError::Command {
                status: status.as_u16(),
                error: "unknown error".to_string(),
                message: body.chars().take(500).collect(),
            },
        });
    }

    serde_json::from_str::<Reply<T>>(&body)
        .map(|reply| reply.value)
        .map_err(|e| WebDriverError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
}
