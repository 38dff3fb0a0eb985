//! Route/direction navigation.
//!
//! The status page is a single stateful UI: one route menu, one set of
//! direction controls, one result table. The controller walks it strictly
//! one (route, direction) pair at a time:
//!
//! ```text
//! Idle -> discover routes
//!   for each route:
//!     for each direction:
//!       fetch(route, direction)      // menu, route, direction, submit, table
//!         -> rows | timed out | failed
//! -> Idle
//! ```
//!
//! A failure inside one pair (timeout, missing element, even a panic in the
//! page driver) is recorded for that pair and the walk moves on. Only route
//! discovery failing is fatal to the run.

use std::panic::AssertUnwindSafe;

use chrono::{DateTime, Local, NaiveTime, Timelike};
use futures::FutureExt;
use tracing::{debug, info, warn};

use crate::domain::{Direction, RouteDescriptor, TrainRecord};
use crate::parse::{ParsedStatus, collapse_whitespace, parse_status};

use super::catalog::{RouteCatalog, StaticRouteCatalog, StatusTable};
use super::config::NavigationConfig;
use super::error::ScrapeError;
use super::rows::RawRow;

/// How one route/direction walk ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The table was read; `rows` counts raw rows before parsing.
    Table { rows: usize },
    /// The table never appeared. Normal when no trains are running.
    TimedOut,
    /// The walk failed for another reason.
    Failed(String),
}

/// Records scraped for one route in one direction.
#[derive(Debug, Clone)]
pub struct RouteScrape {
    pub route: String,
    pub direction: Direction,
    pub records: Vec<TrainRecord>,
    pub outcome: StepOutcome,
}

/// Drives a status page through every route and direction.
#[derive(Debug, Clone, Default)]
pub struct NavigationController {
    config: NavigationConfig,
    fallback: Option<StaticRouteCatalog>,
}

impl NavigationController {
    pub fn new(config: NavigationConfig) -> Self {
        Self {
            config,
            fallback: None,
        }
    }

    /// Use a static route list when live discovery fails.
    pub fn with_fallback(mut self, catalog: StaticRouteCatalog) -> Self {
        self.fallback = (!catalog.is_empty()).then_some(catalog);
        self
    }

    /// Scrape every discovered route in every configured direction.
    ///
    /// Results come back in walk order, one entry per (route, direction).
    /// `observed_at` supplies the event time for records whose status text
    /// carries none.
    ///
    /// Fails only when no route list can be obtained.
    pub async fn run<S>(
        &self,
        session: &S,
        observed_at: DateTime<Local>,
    ) -> Result<Vec<RouteScrape>, ScrapeError>
    where
        S: RouteCatalog + StatusTable,
    {
        let routes = self.discover(session).await?;
        info!(routes = routes.len(), "Discovered routes");

        let fallback_time = minute_of(observed_at);
        let mut results = Vec::with_capacity(routes.len() * self.config.directions.len());

        for route in &routes {
            for &direction in &self.config.directions {
                let (outcome, rows) = self.walk(session, route, direction).await;
                let records = to_records(route, direction, rows, fallback_time);

                debug!(
                    route = %route.name,
                    direction = %direction,
                    records = records.len(),
                    outcome = ?outcome,
                    "Route step finished"
                );

                results.push(RouteScrape {
                    route: route.name.clone(),
                    direction,
                    records,
                    outcome,
                });
            }
        }

        Ok(results)
    }

    async fn discover<S: RouteCatalog>(
        &self,
        session: &S,
    ) -> Result<Vec<RouteDescriptor>, ScrapeError> {
        match session.discover().await {
            Ok(routes) => Ok(routes),
            Err(e) => match &self.fallback {
                Some(fallback) => {
                    warn!(error = %e, "Route discovery failed, using static route list");
                    fallback.discover().await
                }
                None => Err(e),
            },
        }
    }

    /// Fetch one table, absorbing every failure into the outcome.
    async fn walk<S: StatusTable>(
        &self,
        session: &S,
        route: &RouteDescriptor,
        direction: Direction,
    ) -> (StepOutcome, Vec<RawRow>) {
        let fetch = AssertUnwindSafe(session.fetch(route, direction)).catch_unwind();

        match tokio::time::timeout(self.config.iteration_timeout, fetch).await {
            Ok(Ok(Ok(rows))) => (StepOutcome::Table { rows: rows.len() }, rows),
            Ok(Ok(Err(e))) if e.is_timeout() => {
                info!(
                    route = %route.name,
                    direction = %direction,
                    error = %e,
                    "No status table, recording no trains"
                );
                (StepOutcome::TimedOut, Vec::new())
            }
            Ok(Ok(Err(e))) => {
                warn!(
                    route = %route.name,
                    direction = %direction,
                    error = %e,
                    "Route step failed, skipping"
                );
                (StepOutcome::Failed(e.to_string()), Vec::new())
            }
            Ok(Err(_)) => {
                warn!(
                    route = %route.name,
                    direction = %direction,
                    "Route step panicked, skipping"
                );
                (StepOutcome::Failed("page driver panicked".to_string()), Vec::new())
            }
            Err(_) => {
                warn!(
                    route = %route.name,
                    direction = %direction,
                    timeout = ?self.config.iteration_timeout,
                    "Route step exceeded its bound, skipping"
                );
                (StepOutcome::TimedOut, Vec::new())
            }
        }
    }
}

/// Parse raw rows into records, dropping finished services.
fn to_records(
    route: &RouteDescriptor,
    direction: Direction,
    rows: Vec<RawRow>,
    fallback_time: NaiveTime,
) -> Vec<TrainRecord> {
    rows.into_iter()
        .filter_map(|row| match parse_status(&row.raw_status) {
            ParsedStatus::ServiceEnded => {
                debug!(route = %route.name, train = %row.raw_name, "Service ended, dropping row");
                None
            }
            ParsedStatus::Located {
                position,
                reported_at,
            } => {
                if position.is_unknown() {
                    debug!(
                        route = %route.name,
                        train = %row.raw_name,
                        status = %row.raw_status,
                        "Unrecognised status text"
                    );
                }
                Some(TrainRecord {
                    route: route.name.clone(),
                    direction,
                    name: collapse_whitespace(&row.raw_name),
                    position,
                    event_time: reported_at.unwrap_or(fallback_time),
                })
            }
        })
        .collect()
}

/// Local time of day truncated to the minute.
fn minute_of(at: DateTime<Local>) -> NaiveTime {
    let time = at.time();
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
