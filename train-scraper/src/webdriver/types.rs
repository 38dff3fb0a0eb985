//! WebDriver wire types.
//!
//! Every W3C WebDriver response wraps its payload in `{"value": ...}`.
//! Errors use the same envelope with an `error` code and a `message`.

use serde::{Deserialize, Serialize};

/// Response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct Reply<T> {
    pub value: T,
}

/// Error payload inside the envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorValue {
    pub error: String,
    #[serde(default)]
    pub message: String,
}

/// Payload of a successful new-session command.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewSession {
    pub session_id: String,
}

/// Element-finding strategy and selector.
#[derive(Debug, Serialize)]
pub(crate) struct Locator<'a> {
    pub using: &'static str,
    pub value: &'a str,
}

impl<'a> Locator<'a> {
    pub fn css(selector: &'a str) -> Self {
        Self {
            using: "css selector",
            value: selector,
        }
    }
}

/// Navigation command body.
#[derive(Debug, Serialize)]
pub(crate) struct NavigateTo<'a> {
    pub url: &'a str,
}

/// A reference to an element in the current page.
///
/// Only valid until the page re-renders the element; commands using an
/// outdated reference fail with `stale element reference`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ElementRef {
    #[serde(rename = "element-6066-11e4-a52e-4f735466cecf")]
    pub id: String,
}
