//! Capabilities the navigation controller needs from the status page.
//!
//! The controller never touches selectors or browser handles directly. It
//! discovers routes through a [`RouteCatalog`] and reads one route/direction
//! table at a time through a [`StatusTable`], so the automation technology
//! behind them can be swapped (or scripted in tests).

use std::future::Future;

use crate::domain::{Direction, RouteDescriptor};

use super::error::ScrapeError;
use super::rows::RawRow;

/// Source of the routes to scrape.
pub trait RouteCatalog {
    /// List the selectable routes, in menu order.
    fn discover(&self) -> impl Future<Output = Result<Vec<RouteDescriptor>, ScrapeError>> + Send;
}

/// Reader for one route/direction status table.
pub trait StatusTable {
    /// Drive the page to show `route` in `direction` and read its rows.
    ///
    /// Returns a [`ScrapeError::NavigationTimeout`] when the table does not
    /// appear in time, which the caller treats as "no trains".
    fn fetch(
        &self,
        route: &RouteDescriptor,
        direction: Direction,
    ) -> impl Future<Output = Result<Vec<RawRow>, ScrapeError>> + Send;
}

/// A fixed route list, used when the live menu cannot be read.
///
/// Each route carries its direct page URL, so the status table reader can
/// navigate straight to it instead of going through the menu.
#[derive(Debug, Clone, Default)]
pub struct StaticRouteCatalog {
    routes: Vec<(String, String)>,
}

impl StaticRouteCatalog {
    /// Create a catalog from `(name, url)` pairs, kept in the given order.
    pub fn new<I, N, U>(routes: I) -> Self
    where
        I: IntoIterator<Item = (N, U)>,
        N: Into<String>,
        U: Into<String>,
    {
        Self {
            routes: routes
                .into_iter()
                .map(|(name, url)| (name.into(), url.into()))
                .collect(),
        }
    }

    /// Parse `name=url` pairs separated by `;`.
    ///
    /// Entries without `=` or with an empty side are ignored.
    ///
    /// ```
    /// use train_scraper::scrape::StaticRouteCatalog;
    ///
    /// let catalog = StaticRouteCatalog::parse("Tokaido=https://x/t; Joetsu=https://x/j;bad");
    /// assert_eq!(catalog.len(), 2);
    /// ```
    pub fn parse(spec: &str) -> Self {
        Self::new(spec.split(';').filter_map(|entry| {
            let (name, url) = entry.split_once('=')?;
            let (name, url) = (name.trim(), url.trim());
            (!name.is_empty() && !url.is_empty()).then_some((name, url))
        }))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// The routes as descriptors, indexed by position.
    pub fn descriptors(&self) -> Vec<RouteDescriptor> {
        self.routes
            .iter()
            .enumerate()
            .map(|(index, (name, url))| RouteDescriptor::new(name.clone(), index).with_url(url.clone()))
            .collect()
    }
}

impl RouteCatalog for StaticRouteCatalog {
    async fn discover(&self) -> Result<Vec<RouteDescriptor>, ScrapeError> {
        Ok(self.descriptors())
    }
}
