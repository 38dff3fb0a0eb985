//! Consolidated capture of all routes for one scrape cycle.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};

use super::{Direction, TrainRecord};

/// One complete, timestamped capture of every route's train positions.
///
/// Built once per cycle by the aggregator and never modified afterwards.
/// Every route that was visited has an entry, even when no trains were
/// found on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    timestamp: DateTime<Local>,
    routes: BTreeMap<String, Vec<TrainRecord>>,
}

impl Snapshot {
    pub(crate) fn new(
        timestamp: DateTime<Local>,
        routes: BTreeMap<String, Vec<TrainRecord>>,
    ) -> Self {
        Self { timestamp, routes }
    }

    /// The shared capture instant of every record in this snapshot.
    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// Records keyed by route name.
    pub fn routes(&self) -> &BTreeMap<String, Vec<TrainRecord>> {
        &self.routes
    }

    /// Records for one route and direction, in table order.
    pub fn records_for<'a>(
        &'a self,
        route: &str,
        direction: Direction,
    ) -> impl Iterator<Item = &'a TrainRecord> + 'a {
        self.routes
            .get(route)
            .into_iter()
            .flatten()
            .filter(move |r| r.direction == direction)
    }

    /// All records in route order.
    pub fn records(&self) -> impl Iterator<Item = &TrainRecord> {
        self.routes.values().flatten()
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
