//! Station name normalization.

/// Normalize a station name into its canonical grouping key.
///
/// Runs of whitespace collapse to a single space, punctuation and brackets
/// around the name are removed, and the result is upper-cased. Punctuation
/// inside the name (e.g. the hyphen in "Shin-Osaka") is kept.
///
/// Returns an empty string when nothing name-like remains.
///
/// # Examples
///
/// ```
/// use train_scraper::parse::normalize_station;
///
/// assert_eq!(normalize_station(" Shin-Osaka  "), "SHIN-OSAKA");
/// assert_eq!(normalize_station("(Kyoto)."), "KYOTO");
/// assert_eq!(normalize_station("Shin   Yokohama"), "SHIN YOKOHAMA");
/// ```
pub fn normalize_station(raw: &str) -> String {
    let collapsed = collapse_whitespace(raw);
    collapsed
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_uppercase()
}

/// Collapse every whitespace run to one space and trim the ends.
pub(crate) fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Normalizing twice is the same as normalizing once
        #[test]
        fn idempotent(s in "[ a-zA-Z0-9\\-().,\\t]{0,40}") {
            let once = normalize_station(&s);
            prop_assert_eq!(normalize_station(&once), once.clone());
        }

        /// The key never has surrounding or doubled whitespace
        #[test]
        fn no_stray_whitespace(s in "[ a-zA-Z\\-\\t()]{0,40}") {
            let key = normalize_station(&s);
            prop_assert_eq!(key.trim(), key.as_str());
            prop_assert!(!key.contains("  "));
        }
    }
}
