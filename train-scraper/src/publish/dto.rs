//! Published document shapes.
//!
//! Two projections of a [`Snapshot`]: the full document read by the
//! dashboard, and the compact feed read by the LED display, whose field
//! names are kept to one or two letters to fit its memory.

use std::collections::BTreeMap;

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::domain::{Action, Direction, Snapshot, TrainRecord};

/// The full snapshot document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    /// ISO-8601 capture time
    pub timestamp: String,
    pub routes: BTreeMap<String, Vec<RecordDocument>>,
}

/// One train in the full document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDocument {
    pub name: String,
    pub direction: Direction,
    pub station_a: String,
    pub station_b: Option<String>,
    pub is_between: bool,
    pub action: Action,
    /// `HH:MM`, local time
    pub event_time: String,
}

impl From<&TrainRecord> for RecordDocument {
    fn from(record: &TrainRecord) -> Self {
        Self {
            name: record.name.clone(),
            direction: record.direction,
            station_a: record.position.station_a().to_string(),
            station_b: record.position.station_b().map(str::to_string),
            is_between: record.position.is_between(),
            action: record.position.action(),
            event_time: record.event_time_hhmm(),
        }
    }
}

impl From<&Snapshot> for SnapshotDocument {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            timestamp: snapshot
                .timestamp()
                .to_rfc3339_opts(SecondsFormat::Secs, false),
            routes: snapshot
                .routes()
                .iter()
                .map(|(route, records)| {
                    (route.clone(), records.iter().map(RecordDocument::from).collect())
                })
                .collect(),
        }
    }
}

/// One train in the compact feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactRecord {
    /// Train name
    pub n: String,
    /// Primary station
    pub s: String,
    /// Between stations
    pub b: bool,
    /// Direction
    pub d: Direction,
    /// Second station, only when between
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s_b: Option<String>,
}

impl From<&TrainRecord> for CompactRecord {
    fn from(record: &TrainRecord) -> Self {
        Self {
            n: record.name.clone(),
            s: record.position.station_a().to_string(),
            b: record.position.is_between(),
            d: record.direction,
            s_b: record.position.station_b().map(str::to_string),
        }
    }
}

/// Project a snapshot onto the compact feed, in route order.
pub fn compact_feed(snapshot: &Snapshot) -> Vec<CompactRecord> {
    snapshot.records().map(CompactRecord::from).collect()
}
