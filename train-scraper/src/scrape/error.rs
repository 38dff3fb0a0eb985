//! Scrape pipeline error types.

use std::fmt;
use std::time::Duration;

use crate::webdriver::WebDriverError;

/// One step of the status-page walk for a single route and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavStep {
    LoadPage,
    OpenRouteMenu,
    SelectRoute,
    SelectDirection,
    SubmitRequest,
    AwaitTable,
}

impl NavStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            NavStep::LoadPage => "load page",
            NavStep::OpenRouteMenu => "open route menu",
            NavStep::SelectRoute => "select route",
            NavStep::SelectDirection => "select direction",
            NavStep::SubmitRequest => "submit request",
            NavStep::AwaitTable => "await status table",
        }
    }
}

impl fmt::Display for NavStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while driving the status page.
///
/// Timeouts and element errors inside one route/direction walk are absorbed
/// by the navigation controller. Anything that escapes it (failed session
/// start, failed route discovery) ends the attempt.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// A UI step did not complete within its bound
    #[error("timed out after {after:?} at step: {step}")]
    NavigationTimeout { step: NavStep, after: Duration },

    /// An expected element was not on the page
    #[error("no element matching {selector:?} at step: {step}")]
    ElementMissing { step: NavStep, selector: String },

    /// The browser session is unusable
    #[error("session failure: {0}")]
    Session(String),

    /// WebDriver protocol or transport failure
    #[error("WebDriver error: {0}")]
    WebDriver(#[from] WebDriverError),
}

impl ScrapeError {
    /// Whether this is a bounded wait running out, as opposed to a fault.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ScrapeError::NavigationTimeout { .. })
    }
}
