//! Scripted status page for testing without a browser.
//!
//! A [`MockSite`] serves a fixed route list and a scripted table (or
//! failure) per route and direction. It records every table request so
//! tests can check walk order and session handling.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::{Direction, RouteDescriptor};

use super::catalog::{RouteCatalog, StatusTable};
use super::error::{NavStep, ScrapeError};
use super::rows::{RawRow, extract_rows};
use super::session::{ScrapeSession, SessionFactory};

/// What the mock page does when asked for one route/direction table.
#[derive(Debug, Clone)]
pub enum MockTable {
    /// Table cells, row by row.
    Cells(Vec<Vec<String>>),
    /// The table never renders.
    TimedOut,
    /// The walk fails with a non-timeout error.
    Fails(String),
    /// The page driver panics.
    Panics,
    /// The walk never completes.
    Hangs,
}

/// A scripted status page.
#[derive(Debug, Default)]
pub struct MockSite {
    routes: Vec<String>,
    tables: HashMap<(String, Direction), MockTable>,
    discovery_broken: bool,
    discovery_panics: bool,
    failing_opens: AtomicU32,
    failing_discoveries: AtomicU32,
    fetches: Mutex<Vec<(String, Direction)>>,
    opened: AtomicU32,
    closed: AtomicU32,
}

impl MockSite {
    /// A site whose route menu lists `routes` in order.
    pub fn new<I, S>(routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            routes: routes.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Script a two-column table of (train name, status) rows.
    pub fn with_rows(self, route: &str, direction: Direction, rows: &[(&str, &str)]) -> Self {
        let cells = rows
            .iter()
            .map(|(name, status)| vec![name.to_string(), status.to_string()])
            .collect();
        self.with_table(route, direction, MockTable::Cells(cells))
    }

    /// Script the behaviour for one route and direction.
    ///
    /// Unscripted pairs behave as [`MockTable::TimedOut`].
    pub fn with_table(mut self, route: &str, direction: Direction, table: MockTable) -> Self {
        self.tables.insert((route.to_string(), direction), table);
        self
    }

    /// Make route discovery fail when the site is used directly.
    pub fn with_broken_discovery(mut self) -> Self {
        self.discovery_broken = true;
        self
    }

    /// Make route discovery panic in every session.
    pub fn with_panicking_discovery(mut self) -> Self {
        self.discovery_panics = true;
        self
    }

    /// Make the first `n` session opens fail.
    pub fn with_failing_opens(self, n: u32) -> Self {
        self.failing_opens.store(n, Ordering::SeqCst);
        self
    }

    /// Make route discovery fail in the first `n` opened sessions.
    pub fn with_failing_discoveries(self, n: u32) -> Self {
        self.failing_discoveries.store(n, Ordering::SeqCst);
        self
    }

    /// Every table request so far, in order.
    pub fn fetches(&self) -> Vec<(String, Direction)> {
        self.fetch_log().clone()
    }

    /// Number of sessions opened successfully.
    pub fn opened(&self) -> u32 {
        self.opened.load(Ordering::SeqCst)
    }

    /// Number of sessions closed.
    pub fn closed(&self) -> u32 {
        self.closed.load(Ordering::SeqCst)
    }

    fn fetch_log(&self) -> MutexGuard<'_, Vec<(String, Direction)>> {
        self.fetches.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn routes(&self, broken: bool) -> Result<Vec<RouteDescriptor>, ScrapeError> {
        if self.discovery_panics {
            panic!("scripted route menu panic");
        }
        if broken {
            return Err(ScrapeError::ElementMissing {
                step: NavStep::OpenRouteMenu,
                selector: "route menu".to_string(),
            });
        }
        Ok(self
            .routes
            .iter()
            .enumerate()
            .map(|(index, name)| RouteDescriptor::new(name.clone(), index))
            .collect())
    }

    async fn table(
        &self,
        route: &RouteDescriptor,
        direction: Direction,
    ) -> Result<Vec<RawRow>, ScrapeError> {
        self.fetch_log().push((route.name.clone(), direction));

        let table = self
            .tables
            .get(&(route.name.clone(), direction))
            .cloned()
            .unwrap_or(MockTable::TimedOut);

        match table {
            MockTable::Cells(cells) => Ok(extract_rows(cells)),
            MockTable::TimedOut => Err(ScrapeError::NavigationTimeout {
                step: NavStep::AwaitTable,
                after: std::time::Duration::from_secs(20),
            }),
            MockTable::Fails(message) => Err(ScrapeError::Session(message)),
            MockTable::Panics => panic!("scripted page driver panic"),
            MockTable::Hangs => std::future::pending().await,
        }
    }

    /// Decrement `counter` if positive, reporting whether it was.
    fn take(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl RouteCatalog for MockSite {
    async fn discover(&self) -> Result<Vec<RouteDescriptor>, ScrapeError> {
        self.routes(self.discovery_broken)
    }
}

impl StatusTable for MockSite {
    async fn fetch(
        &self,
        route: &RouteDescriptor,
        direction: Direction,
    ) -> Result<Vec<RawRow>, ScrapeError> {
        self.table(route, direction).await
    }
}

/// Opens [`MockSession`]s onto a shared [`MockSite`].
#[derive(Debug, Clone)]
pub struct MockSessionFactory {
    site: Arc<MockSite>,
}

impl MockSessionFactory {
    pub fn new(site: Arc<MockSite>) -> Self {
        Self { site }
    }
}

impl SessionFactory for MockSessionFactory {
    type Session = MockSession;

    async fn open(&self) -> Result<MockSession, ScrapeError> {
        if MockSite::take(&self.site.failing_opens) {
            return Err(ScrapeError::Session("browser failed to start".to_string()));
        }
        self.site.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockSession {
            site: Arc::clone(&self.site),
            discovery_broken: MockSite::take(&self.site.failing_discoveries),
        })
    }
}

/// One session onto a [`MockSite`].
#[derive(Debug)]
pub struct MockSession {
    site: Arc<MockSite>,
    discovery_broken: bool,
}

impl RouteCatalog for MockSession {
    async fn discover(&self) -> Result<Vec<RouteDescriptor>, ScrapeError> {
        self.site.routes(self.discovery_broken)
    }
}

impl StatusTable for MockSession {
    async fn fetch(
        &self,
        route: &RouteDescriptor,
        direction: Direction,
    ) -> Result<Vec<RawRow>, ScrapeError> {
        self.site.table(route, direction).await
    }
}

impl ScrapeSession for MockSession {
    async fn close(self) -> Result<(), ScrapeError> {
        self.site.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
