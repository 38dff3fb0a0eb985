//! A single train observation.

use chrono::NaiveTime;

use super::{Direction, ParsedPosition};

/// One train's parsed position on a route, in one direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainRecord {
    pub route: String,
    pub direction: Direction,
    /// Train name as displayed (e.g. "Nozomi 21").
    pub name: String,
    pub position: ParsedPosition,
    /// Local time of the reported event, or the capture time when the
    /// status text carries none.
    pub event_time: NaiveTime,
}

impl TrainRecord {
    /// Event time formatted as `HH:MM`.
    pub fn event_time_hhmm(&self) -> String {
        self.event_time.format("%H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Action;

    #[test]
    fn event_time_is_zero_padded() {
        let record = TrainRecord {
            route: "Tokaido".into(),
            direction: Direction::Up,
            name: "Hikari 503".into(),
            position: ParsedPosition::at("TOKYO", Action::Stopped),
            event_time: NaiveTime::from_hms_opt(7, 5, 0).unwrap(),
        };
        assert_eq!(record.event_time_hhmm(), "07:05");
    }
}
