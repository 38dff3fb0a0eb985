//! The scrape pipeline.
//!
//! One cycle opens a browser session, discovers the routes on the status
//! page, walks every route in both directions reading the status table,
//! parses each row into a [`TrainRecord`](crate::domain::TrainRecord), and
//! folds the results into a [`Snapshot`](crate::domain::Snapshot). The whole
//! cycle is retried with a fresh session if it cannot get started.
//!
//! Failures are contained at two levels:
//! - one route/direction walk failing (timeout, missing element, panic)
//!   yields an empty result for that pair and the walk continues;
//! - the session or route discovery failing ends the attempt, and the
//!   [`RetryScheduler`] starts over with a new session.

mod aggregate;
mod catalog;
mod config;
mod controller;
mod cycle;
mod error;
pub mod mock;
mod retry;
mod rows;
mod session;

pub use aggregate::{SnapshotBuilder, aggregate, aggregate_at};
pub use catalog::{RouteCatalog, StaticRouteCatalog, StatusTable};
pub use config::{NavigationConfig, RetryPolicy};
pub use controller::{NavigationController, RouteScrape, StepOutcome};
pub use cycle::ScrapeCycle;
pub use error::{NavStep, ScrapeError};
pub use retry::{RetryOutcome, RetryScheduler};
pub use rows::{RawRow, extract_rows};
pub use session::{ScrapeSession, SessionFactory};
