//! Status text parser.
//!
//! The status page describes each train with free text that has changed
//! format over time. Every known format is one entry in an ordered rule
//! table; rules are tried in order and the first match wins. Text that no
//! rule recognises still yields a position (the [`ParsedPosition::unknown`]
//! sentinel), so a row is never lost because its wording changed.
//!
//! Recognised formats, in precedence order:
//!
//! | Text                               | Action   | Between |
//! |------------------------------------|----------|---------|
//! | `... service ended ...`            | (row dropped)      ||
//! | `Running between A and B`          | Running  | yes     |
//! | `Stopped at A`                     | Stopped  | no      |
//! | `Departed A at HH:MM`              | Departed | yes     |
//! | `Arrived at A at HH:MM`            | Arrived  | no      |
//! | `(between A and B)`                | Running  | yes     |
//! | `(at A)`                           | Stopped  | no      |
//! | anything else                      | Unknown  | no      |
//!
//! Matching is case-insensitive and tolerant of extra whitespace.

use chrono::NaiveTime;

use crate::domain::{Action, ParsedPosition, UNKNOWN_STATION};

use super::station::{collapse_whitespace, normalize_station};

/// Phrase marking a train that has finished running for the day.
const SERVICE_ENDED: &str = "service ended";

/// Result of parsing one status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedStatus {
    /// The train has finished for the day; no record should be emitted.
    ServiceEnded,
    /// The train's position, plus the event time when the text gave one.
    Located {
        position: ParsedPosition,
        reported_at: Option<NaiveTime>,
    },
}

/// Parse a status string, including the service-ended check.
///
/// Never fails: unrecognised text produces the unknown sentinel position.
///
/// # Examples
///
/// ```
/// use train_scraper::parse::{ParsedStatus, parse_status};
///
/// assert_eq!(parse_status("Service Ended"), ParsedStatus::ServiceEnded);
///
/// match parse_status("Departed NAGOYA at 10:42") {
///     ParsedStatus::Located { position, reported_at } => {
///         assert_eq!(position.station_a(), "NAGOYA");
///         assert_eq!(reported_at.unwrap().to_string(), "10:42:00");
///     }
///     ParsedStatus::ServiceEnded => unreachable!(),
/// }
/// ```
pub fn parse_status(text: &str) -> ParsedStatus {
    let text = collapse_whitespace(text);

    if text.to_lowercase().contains(SERVICE_ENDED) {
        return ParsedStatus::ServiceEnded;
    }

    let (position, reported_at) = match RULES.iter().find_map(|rule| rule.apply(&text)) {
        Some(m) => (m.position, m.time),
        None => (ParsedPosition::unknown(), None),
    };

    ParsedStatus::Located {
        position,
        reported_at,
    }
}

/// Parse a status string into a position.
///
/// This applies the position rules only; callers that need to drop
/// finished services should use [`parse_status`].
///
/// # Examples
///
/// ```
/// use train_scraper::domain::Action;
/// use train_scraper::parse::parse;
///
/// let pos = parse("Running between KYOTO and MAIBARA");
/// assert_eq!(pos.station_a(), "KYOTO");
/// assert_eq!(pos.station_b(), Some("MAIBARA"));
/// assert_eq!(pos.action(), Action::Running);
///
/// assert!(parse("").is_unknown());
/// ```
pub fn parse(text: &str) -> ParsedPosition {
    let text = collapse_whitespace(text);
    RULES
        .iter()
        .find_map(|rule| rule.apply(&text))
        .map(|m| m.position)
        .unwrap_or_else(ParsedPosition::unknown)
}

/// One recognised status format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    RunningBetween,
    StoppedAt,
    DepartedAt,
    ArrivedAt,
    BracketedBetween,
    BracketedAt,
}

/// Rules in precedence order.
const RULES: [Rule; 6] = [
    Rule::RunningBetween,
    Rule::StoppedAt,
    Rule::DepartedAt,
    Rule::ArrivedAt,
    Rule::BracketedBetween,
    Rule::BracketedAt,
];

struct Match {
    position: ParsedPosition,
    time: Option<NaiveTime>,
}

impl Rule {
    /// Try this rule against whitespace-collapsed text.
    fn apply(self, text: &str) -> Option<Match> {
        match self {
            Rule::RunningBetween => {
                let rest = after_ci(text, "running between ")?;
                let (a, b) = station_pair(rest)?;
                Some(Match {
                    position: ParsedPosition::between(a, b, Action::Running),
                    time: None,
                })
            }
            Rule::StoppedAt => {
                let rest = after_ci(text, "stopped at ")?;
                let (name, time) = split_trailing_time(rest);
                Some(Match {
                    position: ParsedPosition::at(station(name)?, Action::Stopped),
                    time,
                })
            }
            Rule::DepartedAt => {
                let rest = after_ci(text, "departed ")?;
                let rest = after_ci(rest, "from ").unwrap_or(rest);
                // "Departed at HH:MM" names no station.
                if rest.to_ascii_lowercase().starts_with("at ") {
                    return None;
                }
                let (name, time) = split_trailing_time(rest);
                // Next station is not part of the text.
                Some(Match {
                    position: ParsedPosition::between(
                        station(name)?,
                        UNKNOWN_STATION,
                        Action::Departed,
                    ),
                    time,
                })
            }
            Rule::ArrivedAt => {
                let rest = after_ci(text, "arrived at ")?;
                let (name, time) = split_trailing_time(rest);
                Some(Match {
                    position: ParsedPosition::at(station(name)?, Action::Arrived),
                    time,
                })
            }
            Rule::BracketedBetween => {
                let inner = bracketed_ci(text, "(between ")?;
                let (a, b) = station_pair(inner)?;
                Some(Match {
                    position: ParsedPosition::between(a, b, Action::Running),
                    time: None,
                })
            }
            Rule::BracketedAt => {
                let inner = bracketed_ci(text, "(at ")?;
                Some(Match {
                    position: ParsedPosition::at(station(inner)?, Action::Stopped),
                    time: None,
                })
            }
        }
    }
}

/// Byte offset of `needle` in `haystack`, ignoring ASCII case.
///
/// `needle` must be lowercase ASCII. ASCII lowercasing keeps byte offsets,
/// so the result indexes the original text.
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    haystack.to_ascii_lowercase().find(needle)
}

/// Text following the first case-insensitive occurrence of `marker`.
fn after_ci<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    find_ci(text, marker).map(|idx| &text[idx + marker.len()..])
}

/// Contents of a bracketed clause opened by `open`, up to the closing `)`.
fn bracketed_ci<'a>(text: &'a str, open: &str) -> Option<&'a str> {
    let rest = after_ci(text, open)?;
    let end = rest.find(')')?;
    Some(&rest[..end])
}

/// Split `"A and B"` into two normalized, non-empty station names.
fn station_pair(text: &str) -> Option<(String, String)> {
    let idx = find_ci(text, " and ")?;
    let a = station(&text[..idx])?;
    let b = station(&text[idx + " and ".len()..])?;
    Some((a, b))
}

fn station(raw: &str) -> Option<String> {
    let name = normalize_station(raw);
    (!name.is_empty()).then_some(name)
}

/// Split `"NAME at HH:MM ..."` into the name and the time.
///
/// The time is taken from the last ` at ` followed by an `H:MM` or `HH:MM`
/// token; anything after that token is ignored. When no such token exists
/// the whole text is the name.
fn split_trailing_time(text: &str) -> (&str, Option<NaiveTime>) {
    let lower = text.to_ascii_lowercase();
    let mut end = lower.len();

    while let Some(idx) = lower[..end].rfind(" at ") {
        if let Some(time) = leading_time(&text[idx + " at ".len()..]) {
            return (&text[..idx], Some(time));
        }
        end = idx;
    }
    (text, None)
}

/// A time of day at the very start of `text`.
fn leading_time(text: &str) -> Option<NaiveTime> {
    let hour_len = text.bytes().take_while(u8::is_ascii_digit).count();
    if !(1..=2).contains(&hour_len) {
        return None;
    }
    let minutes = text[hour_len..].strip_prefix(':')?;
    let digits = minutes.bytes().take_while(u8::is_ascii_digit).count();
    if digits != 2 {
        return None;
    }

    let hour = text[..hour_len].parse().ok()?;
    let minute = minutes[..2].parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn located(text: &str) -> (ParsedPosition, Option<NaiveTime>) {
        match parse_status(text) {
            ParsedStatus::Located {
                position,
                reported_at,
            } => (position, reported_at),
            ParsedStatus::ServiceEnded => panic!("unexpected service ended for {text:?}"),
        }
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn service_ended_any_casing() {
        for text in [
            "Service ended",
            "SERVICE ENDED",
            "service ended",
            "Nozomi 99: Service  Ended for today",
        ] {
            assert_eq!(parse_status(text), ParsedStatus::ServiceEnded, "{text:?}");
        }
    }

    #[test]
    fn service_ended_wins_over_position() {
        assert_eq!(
            parse_status("Stopped at TOKYO (service ended)"),
            ParsedStatus::ServiceEnded
        );
    }

    #[test]
    fn running_between() {
        let pos = parse("Running between KYOTO and MAIBARA");
        assert_eq!(pos, ParsedPosition::between("KYOTO", "MAIBARA", Action::Running));
    }

    #[test]
    fn running_between_mixed_case_and_spacing() {
        let pos = parse("  running   BETWEEN  Shin-Osaka and  kyoto. ");
        assert_eq!(pos.station_a(), "SHIN-OSAKA");
        assert_eq!(pos.station_b(), Some("KYOTO"));
        assert_eq!(pos.action(), Action::Running);
    }

    #[test]
    fn running_between_missing_second_station_falls_through() {
        assert!(parse("Running between KYOTO and").is_unknown());
        assert!(parse("Running between KYOTO").is_unknown());
    }

    #[test]
    fn stopped_at() {
        let pos = parse("Stopped at TOKYO");
        assert_eq!(pos, ParsedPosition::at("TOKYO", Action::Stopped));
        assert_eq!(pos.station_b(), None);
        assert!(!pos.is_between());
    }

    #[test]
    fn departed_is_in_transit() {
        let (pos, time) = located("Departed SHIN-YOKOHAMA at 09:12");
        assert_eq!(pos.station_a(), "SHIN-YOKOHAMA");
        assert_eq!(pos.station_b(), Some(UNKNOWN_STATION));
        assert!(pos.is_between());
        assert_eq!(pos.action(), Action::Departed);
        assert_eq!(time, Some(hm(9, 12)));
    }

    #[test]
    fn departed_from() {
        let (pos, _) = located("Departed from Nagoya at 11:00");
        assert_eq!(pos.station_a(), "NAGOYA");
    }

    #[test]
    fn departed_without_time() {
        let (pos, time) = located("Departed Odawara");
        assert_eq!(pos.station_a(), "ODAWARA");
        assert_eq!(time, None);
    }

    #[test]
    fn arrived_at() {
        let (pos, time) = located("Arrived at HAKATA at 23:59");
        assert_eq!(pos, ParsedPosition::at("HAKATA", Action::Arrived));
        assert_eq!(time, Some(hm(23, 59)));
    }

    #[test]
    fn station_named_at_is_not_split_without_time() {
        let (pos, time) = located("Arrived at Station at Noon");
        assert_eq!(pos.station_a(), "STATION AT NOON");
        assert_eq!(time, None);
    }

    #[test]
    fn trailing_text_after_time_is_ignored() {
        let (pos, time) = located("Arrived at KYOTO at 10:42 (5 min late)");
        assert_eq!(pos, ParsedPosition::at("KYOTO", Action::Arrived));
        assert_eq!(time, Some(hm(10, 42)));

        let (pos, time) = located("Departed Nagoya at 9:05, on time");
        assert_eq!(pos.station_a(), "NAGOYA");
        assert_eq!(time, Some(hm(9, 5)));
    }

    #[test]
    fn invalid_time_is_part_of_the_name() {
        let (pos, time) = located("Stopped at KYOTO at 25:61");
        assert_eq!(pos.station_a(), "KYOTO AT 25:61");
        assert_eq!(time, None);

        let (pos, time) = located("Stopped at KYOTO at 123:45");
        assert_eq!(pos.station_a(), "KYOTO AT 123:45");
        assert_eq!(time, None);
    }

    #[test]
    fn departed_without_station_is_unknown() {
        let (pos, time) = located("Departed at 10:42");
        assert!(pos.is_unknown());
        assert_eq!(time, None);

        assert!(parse("Departed from at 10:42").is_unknown());
    }

    #[test]
    fn bracketed_between() {
        let pos = parse("Hikari 503 (between Atami and Mishima)");
        assert_eq!(pos, ParsedPosition::between("ATAMI", "MISHIMA", Action::Running));
    }

    #[test]
    fn bracketed_at() {
        let pos = parse("Kodama 700 (at Hamamatsu)");
        assert_eq!(pos, ParsedPosition::at("HAMAMATSU", Action::Stopped));
    }

    #[test]
    fn unclosed_bracket_is_unknown() {
        assert!(parse("(at Hamamatsu").is_unknown());
    }

    #[test]
    fn precedence_stopped_before_bracketed() {
        let pos = parse("Stopped at KYOTO (between Kyoto and Maibara)");
        assert_eq!(pos, ParsedPosition::at("KYOTO (BETWEEN KYOTO AND MAIBARA", Action::Stopped));
    }

    #[test]
    fn empty_and_garbage_are_unknown() {
        for text in ["", "   ", "Delayed", "運転見合わせ", "at", "()"] {
            let pos = parse(text);
            assert_eq!(pos, ParsedPosition::unknown(), "{text:?}");
            let (pos, time) = located(text);
            assert!(pos.is_unknown());
            assert_eq!(time, None);
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// "service ended" with each letter's case chosen independently
    fn service_ended_any_case() -> impl Strategy<Value = String> {
        proptest::collection::vec(any::<bool>(), SERVICE_ENDED.len()).prop_map(|upper| {
            SERVICE_ENDED
                .chars()
                .zip(upper)
                .map(|(c, u)| if u { c.to_ascii_uppercase() } else { c })
                .collect()
        })
    }

    proptest! {
        /// Parsing never panics and always upholds the position invariants
        #[test]
        fn total_and_consistent(s in "\\PC{0,80}") {
            let pos = parse(&s);
            prop_assert!(!pos.station_a().is_empty());
            prop_assert_eq!(pos.is_between(), pos.station_b().is_some());
        }

        /// Same for text built from the grammar's own vocabulary
        #[test]
        fn grammar_fragments(parts in proptest::collection::vec(
            prop_oneof![
                Just("Running between "), Just("Stopped at "), Just("Departed "),
                Just("Arrived at "), Just(" and "), Just(" at "), Just("(between "),
                Just("(at "), Just(")"), Just("12:34"), Just("KYOTO"), Just(" "),
            ],
            0..8,
        )) {
            let text: String = parts.concat();
            match parse_status(&text) {
                ParsedStatus::Located { position, .. } => {
                    prop_assert!(!position.station_a().is_empty());
                    prop_assert_eq!(position.is_between(), position.station_b().is_some());
                }
                ParsedStatus::ServiceEnded => prop_assert!(false, "no service ended in {:?}", text),
            }
        }

        /// Any casing of the phrase, anywhere in the text, drops the row
        #[test]
        fn service_ended_dropped(
            prefix in "[a-zA-Z0-9 ]{0,20}",
            phrase in service_ended_any_case(),
            suffix in "[a-zA-Z0-9 ]{0,20}",
        ) {
            let text = format!("{prefix}{phrase}{suffix}");
            prop_assert_eq!(parse_status(&text), ParsedStatus::ServiceEnded);
        }
    }
}
