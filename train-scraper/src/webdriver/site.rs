//! The train status page, driven through WebDriver.
//!
//! The page has one route menu, a pair of direction controls, a submit
//! button, and a result table that renders after submission. Reading one
//! route in one direction walks these in a fixed order:
//!
//! 1. open the route menu
//! 2. re-resolve the menu items and click the route's item by position
//! 3. click the direction control
//! 4. submit, then wait for the previous result table to be replaced
//! 5. wait for the result table and read its rows
//!
//! The previous walk's table stays on the page until the new response
//! renders, so its rows must not be read as this walk's result.
//!
//! Every wait polls with its own bound (`step_timeout`); there is no global
//! deadline.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::domain::{Direction, RouteDescriptor};
use crate::scrape::{
    NavStep, RawRow, RouteCatalog, ScrapeError, ScrapeSession, SessionFactory, StatusTable,
    extract_rows,
};

use super::client::{BrowserSession, WebDriverClient};
use super::error::WebDriverError;
use super::types::ElementRef;

/// CSS selectors for every element the walk touches.
#[derive(Debug, Clone)]
pub struct SiteSelectors {
    /// Button that opens the route menu
    pub route_menu: String,
    /// One selectable route inside the open menu
    pub route_item: String,
    pub direction_up: String,
    pub direction_down: String,
    /// Button that requests the status table
    pub submit: String,
    pub result_table: String,
    /// A data row inside the result table
    pub table_row: String,
    /// A cell inside a data row
    pub table_cell: String,
}

impl SiteSelectors {
    fn direction(&self, direction: Direction) -> &str {
        match direction {
            Direction::Up => &self.direction_up,
            Direction::Down => &self.direction_down,
        }
    }
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            route_menu: "#route-select".to_string(),
            route_item: "#route-modal li.route-item".to_string(),
            direction_up: "input[name='direction'][value='up']".to_string(),
            direction_down: "input[name='direction'][value='down']".to_string(),
            submit: "#search-button".to_string(),
            result_table: "#result table".to_string(),
            table_row: "tbody tr".to_string(),
            table_cell: "td".to_string(),
        }
    }
}

/// Where the status page lives and how to drive it.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Page with the route menu
    pub root_url: String,
    pub selectors: SiteSelectors,
    /// Bound for each individual wait
    pub step_timeout: Duration,
}

impl SiteConfig {
    pub fn new(root_url: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into(),
            selectors: SiteSelectors::default(),
            step_timeout: Duration::from_secs(20),
        }
    }

    pub fn with_selectors(mut self, selectors: SiteSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = timeout;
        self
    }
}

/// Opens a browser on the status page for each cycle attempt.
#[derive(Debug, Clone)]
pub struct WebDriverSessionFactory {
    client: WebDriverClient,
    site: Arc<SiteConfig>,
}

impl WebDriverSessionFactory {
    pub fn new(client: WebDriverClient, site: SiteConfig) -> Self {
        Self {
            client,
            site: Arc::new(site),
        }
    }
}

impl SessionFactory for WebDriverSessionFactory {
    type Session = SiteSession;

    /// Start a browser and load the root page.
    ///
    /// The session is deleted again if the root page never shows its route
    /// menu, so a failed open leaves no browser behind.
    async fn open(&self) -> Result<SiteSession, ScrapeError> {
        let browser = self
            .client
            .new_session()
            .await
            .map_err(|e| ScrapeError::Session(format!("could not start browser: {e}")))?;

        let session = SiteSession {
            browser,
            site: Arc::clone(&self.site),
            poll_interval: self.client.config().poll_interval,
        };

        match session.load_root().await {
            Ok(()) => Ok(session),
            Err(e) => {
                if let Err(close_err) = session.close().await {
                    warn!(error = %close_err, "Failed to close session after failed open");
                }
                Err(ScrapeError::Session(format!("root page unavailable: {e}")))
            }
        }
    }
}

/// A browser session on the status page.
#[derive(Debug)]
pub struct SiteSession {
    browser: BrowserSession,
    site: Arc<SiteConfig>,
    poll_interval: Duration,
}

impl SiteSession {
    fn selectors(&self) -> &SiteSelectors {
        &self.site.selectors
    }

    async fn load_root(&self) -> Result<(), ScrapeError> {
        self.browser.navigate(&self.site.root_url).await?;
        self.wait_for(NavStep::LoadPage, &self.selectors().route_menu)
            .await?;
        Ok(())
    }

    /// Poll until `selector` matches at least one element.
    ///
    /// Missing and stale elements count as "not yet"; other driver errors
    /// end the wait.
    async fn wait_for(
        &self,
        step: NavStep,
        selector: &str,
    ) -> Result<Vec<ElementRef>, ScrapeError> {
        let deadline = Instant::now() + self.site.step_timeout;

        loop {
            match self.browser.find_all(selector).await {
                Ok(found) if !found.is_empty() => return Ok(found),
                Ok(_) => {}
                Err(e) if e.is_no_such_element() || e.is_stale() => {}
                Err(e) => return Err(e.into()),
            }

            if Instant::now() >= deadline {
                return Err(ScrapeError::NavigationTimeout {
                    step,
                    after: self.site.step_timeout,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Poll until `element` is detached from the page.
    async fn wait_until_detached(
        &self,
        step: NavStep,
        element: &ElementRef,
    ) -> Result<(), ScrapeError> {
        let deadline = Instant::now() + self.site.step_timeout;

        loop {
            match self.browser.tag_name(element).await {
                Ok(_) => {}
                Err(e) if e.is_stale() || e.is_no_such_element() => return Ok(()),
                Err(e) => return Err(e.into()),
            }

            if Instant::now() >= deadline {
                return Err(ScrapeError::NavigationTimeout {
                    step,
                    after: self.site.step_timeout,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Wait for `selector` and click its first match.
    async fn click_first(&self, step: NavStep, selector: &str) -> Result<(), ScrapeError> {
        let found = self.wait_for(step, selector).await?;
        let element = found.first().ok_or_else(|| ScrapeError::ElementMissing {
            step,
            selector: selector.to_string(),
        })?;
        self.browser.click(element).await?;
        debug!(step = %step, selector, "Clicked");
        Ok(())
    }

    /// Open the route menu and return its current items.
    async fn open_route_menu(&self) -> Result<Vec<ElementRef>, ScrapeError> {
        self.click_first(NavStep::OpenRouteMenu, &self.selectors().route_menu)
            .await?;
        self.wait_for(NavStep::OpenRouteMenu, &self.selectors().route_item)
            .await
    }

    /// Select `route` through the menu, or load its direct page.
    async fn select_route(&self, route: &RouteDescriptor) -> Result<(), ScrapeError> {
        if let Some(url) = &route.url {
            self.browser.navigate(url).await?;
            return Ok(());
        }

        // Items are looked up again on every opening; the menu may have
        // re-rendered since discovery.
        let items = self.open_route_menu().await?;
        let item = items.get(route.index).ok_or_else(|| ScrapeError::ElementMissing {
            step: NavStep::SelectRoute,
            selector: format!("{}[{}]", self.selectors().route_item, route.index),
        })?;
        self.browser.click(item).await?;
        debug!(route = %route.name, index = route.index, "Selected route");
        Ok(())
    }

    fn row_selector(&self) -> String {
        let selectors = self.selectors();
        format!("{} {}", selectors.result_table, selectors.table_row)
    }

    /// Rows of whatever result table is currently shown, if any.
    async fn current_rows(&self) -> Result<Vec<ElementRef>, ScrapeError> {
        match self.browser.find_all(&self.row_selector()).await {
            Ok(rows) => Ok(rows),
            Err(e) if e.is_no_such_element() => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Submit the request and wait until an earlier table is gone.
    async fn submit(&self) -> Result<(), ScrapeError> {
        let previous = self.current_rows().await?;
        self.click_first(NavStep::SubmitRequest, &self.selectors().submit)
            .await?;
        if let Some(row) = previous.first() {
            self.wait_until_detached(NavStep::AwaitTable, row).await?;
        }
        Ok(())
    }

    /// Read every row of the rendered result table.
    async fn read_table(&self) -> Result<Vec<RawRow>, ScrapeError> {
        let selectors = self.selectors();
        let rows = self
            .wait_for(NavStep::AwaitTable, &self.row_selector())
            .await?;

        let mut cells = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut texts = Vec::new();
            for cell in self.browser.find_all_in(row, &selectors.table_cell).await? {
                texts.push(self.browser.text(&cell).await?);
            }
            cells.push(texts);
        }

        Ok(extract_rows(cells))
    }
}

impl RouteCatalog for SiteSession {
    /// Read route names from the live menu, then reload the root page so
    /// the menu is closed again.
    async fn discover(&self) -> Result<Vec<RouteDescriptor>, ScrapeError> {
        let items = self.open_route_menu().await?;

        let mut routes = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let name = self.browser.text(item).await?;
            let name = name.trim();
            if !name.is_empty() {
                routes.push(RouteDescriptor::new(name, index));
            }
        }

        self.load_root().await?;
        Ok(routes)
    }
}

impl StatusTable for SiteSession {
    async fn fetch(
        &self,
        route: &RouteDescriptor,
        direction: Direction,
    ) -> Result<Vec<RawRow>, ScrapeError> {
        self.select_route(route).await?;
        self.click_first(NavStep::SelectDirection, self.selectors().direction(direction))
            .await?;
        self.submit().await?;
        let rows = self.read_table().await?;

        debug!(route = %route.name, direction = %direction, rows = rows.len(), "Read status table");
        Ok(rows)
    }
}

impl ScrapeSession for SiteSession {
    async fn close(self) -> Result<(), ScrapeError> {
        match self.browser.delete().await {
            Ok(()) => Ok(()),
            // Already gone; nothing left to release.
            Err(e) if e.is_invalid_session() => Ok(()),
            Err(e) => Err(session_error(e)),
        }
    }
}

fn session_error(e: WebDriverError) -> ScrapeError {
    ScrapeError::Session(format!("could not close browser: {e}"))
}

#[cfg(test)]
#[path = "site_tests.rs"]
mod walk_tests;
