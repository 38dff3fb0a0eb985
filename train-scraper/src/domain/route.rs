//! Route identity as exposed by the status page.

/// A selectable route in the status page's route menu.
///
/// `index` is the route's position in the menu at discovery time. The menu
/// is re-queried every time it is opened, so the index is resolved against
/// the live menu rather than a cached element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub name: String,
    pub index: usize,
    /// Direct page URL, when the route came from a static map rather than
    /// from the live menu.
    pub url: Option<String>,
}

impl RouteDescriptor {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}
