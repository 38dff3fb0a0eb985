//! Parsed train position.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Station placeholder used when a position could not be determined.
pub const UNKNOWN_STATION: &str = "Unknown";

/// What the train was doing when its status was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Running,
    Stopped,
    Departed,
    Arrived,
    Unknown,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Running => "Running",
            Action::Stopped => "Stopped",
            Action::Departed => "Departed",
            Action::Arrived => "Arrived",
            Action::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A train's position relative to the stations on its route.
///
/// Either the train is at (or last seen at) one station, or it is between
/// two. The second station is only ever present for the latter, so
/// [`is_between`](Self::is_between) and [`station_b`](Self::station_b)
/// cannot disagree. The first station is never empty: a missing name is
/// replaced with [`UNKNOWN_STATION`].
///
/// # Examples
///
/// ```
/// use train_scraper::domain::{Action, ParsedPosition};
///
/// let pos = ParsedPosition::between("KYOTO", "MAIBARA", Action::Running);
/// assert!(pos.is_between());
/// assert_eq!(pos.station_b(), Some("MAIBARA"));
///
/// let pos = ParsedPosition::unknown();
/// assert_eq!(pos.station_a(), "Unknown");
/// assert!(!pos.is_between());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPosition {
    station_a: String,
    station_b: Option<String>,
    action: Action,
}

impl ParsedPosition {
    /// A train at (or last reported at) a single station.
    pub fn at(station: impl Into<String>, action: Action) -> Self {
        Self {
            station_a: non_empty(station.into()),
            station_b: None,
            action,
        }
    }

    /// A train between two stations.
    pub fn between(from: impl Into<String>, to: impl Into<String>, action: Action) -> Self {
        Self {
            station_a: non_empty(from.into()),
            station_b: Some(non_empty(to.into())),
            action,
        }
    }

    /// The sentinel position for status text that matched no rule.
    pub fn unknown() -> Self {
        Self::at(UNKNOWN_STATION, Action::Unknown)
    }

    pub fn station_a(&self) -> &str {
        &self.station_a
    }

    pub fn station_b(&self) -> Option<&str> {
        self.station_b.as_deref()
    }

    pub fn is_between(&self) -> bool {
        self.station_b.is_some()
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Whether this is the unmatched-text sentinel.
    pub fn is_unknown(&self) -> bool {
        self.action == Action::Unknown
    }
}

fn non_empty(name: String) -> String {
    if name.is_empty() {
        UNKNOWN_STATION.to_string()
    } else {
        name
    }
}
