//! One full scrape cycle: session, navigation, aggregation, retry.

use std::panic::AssertUnwindSafe;

use chrono::Local;
use futures::FutureExt;
use tracing::{info, warn};

use crate::domain::Snapshot;

use super::aggregate::aggregate;
use super::controller::NavigationController;
use super::error::ScrapeError;
use super::retry::{RetryOutcome, RetryScheduler};
use super::session::{ScrapeSession, SessionFactory};

/// Runs discovery through aggregation as one retryable unit.
///
/// Each attempt opens a fresh session and always closes it before the next
/// attempt starts. A failed attempt's partial results are discarded; only a
/// complete snapshot is ever returned.
pub struct ScrapeCycle<F> {
    factory: F,
    controller: NavigationController,
    scheduler: RetryScheduler,
}

impl<F: SessionFactory> ScrapeCycle<F> {
    pub fn new(factory: F, controller: NavigationController, scheduler: RetryScheduler) -> Self {
        Self {
            factory,
            controller,
            scheduler,
        }
    }

    pub async fn run(&self) -> RetryOutcome<Snapshot> {
        let factory = &self.factory;
        let controller = &self.controller;

        let outcome = self
            .scheduler
            .run(|attempt| async move {
                info!(attempt, "Starting scrape attempt");
                let session = factory.open().await?;

                // The session is closed even if navigation panics.
                let result = AssertUnwindSafe(controller.run(&session, Local::now()))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        Err(ScrapeError::Session("navigation panicked".to_string()))
                    });

                if let Err(e) = session.close().await {
                    warn!(attempt, error = %e, "Failed to close session");
                }

                Ok::<_, ScrapeError>(aggregate(result?))
            })
            .await;

        match &outcome.value {
            Some(snapshot) => info!(
                attempts = outcome.attempts,
                failures = outcome.failures.len(),
                routes = snapshot.routes().len(),
                records = snapshot.len(),
                "Scrape cycle complete"
            ),
            None => warn!(
                attempts = outcome.attempts,
                "Scrape cycle failed on every attempt"
            ),
        }

        outcome
    }
}
