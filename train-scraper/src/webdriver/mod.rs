//! Browser automation over the W3C WebDriver protocol.
//!
//! This module provides the concrete status page driver used in production:
//! an HTTP client for a WebDriver server, and a session type that walks the
//! status page's route menu and result table.
//!
//! Key characteristics of the status page:
//! - It is one stateful UI; selecting a route or direction changes what
//!   every later step sees, so a session is used by one walk at a time
//! - Menu items are re-rendered when the menu opens, so element references
//!   from an earlier opening go stale
//! - An empty result (no trains, e.g. late at night) shows no table at all

mod client;
mod error;
mod site;
mod types;

pub use client::{BrowserSession, WebDriverClient, WebDriverConfig};
pub use error::WebDriverError;
pub use site::{SiteConfig, SiteSelectors, SiteSession, WebDriverSessionFactory};
pub use types::ElementRef;
