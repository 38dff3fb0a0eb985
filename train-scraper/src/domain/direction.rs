//! Direction of travel on a route.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Up/Down orientation of traffic on a route.
///
/// The status page exposes one control per direction; a full scrape visits
/// both for every route, always in the order given by [`Direction::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Both directions in scrape order.
    pub const ALL: [Direction; 2] = [Direction::Up, Direction::Down];

    /// Returns the direction as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
