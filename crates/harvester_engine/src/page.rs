//! Capability interface of the browsing surface.
//!
//! The harvester never drives a browser itself; it talks to a [`PageDriver`]
//! through CSS selectors and reads back [`PageElement`]s.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct AutomationError {
    pub kind: AutomationFailure,
    pub message: String,
}

impl AutomationError {
    pub fn new(kind: AutomationFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(selector: &str) -> Self {
        Self::new(
            AutomationFailure::ElementNotFound,
            format!("no element matches {selector}"),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationFailure {
    Timeout,
    ElementNotFound,
    Navigation,
    Protocol,
}

impl fmt::Display for AutomationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutomationFailure::Timeout => write!(f, "timeout"),
            AutomationFailure::ElementNotFound => write!(f, "element not found"),
            AutomationFailure::Navigation => write!(f, "navigation failed"),
            AutomationFailure::Protocol => write!(f, "automation protocol error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    End,
    Enter,
}

pub trait PageElement {
    fn attribute(&self, name: &str) -> Result<Option<String>, AutomationError>;
    fn inner_markup(&self) -> Result<String, AutomationError>;
    fn tag_name(&self) -> Result<String, AutomationError>;
}

pub trait PageDriver {
    type Element: PageElement;

    fn navigate(&mut self, url: &str) -> Result<(), AutomationError>;
    fn query_all(&mut self, selector: &str) -> Result<Vec<Self::Element>, AutomationError>;
    fn click(&mut self, selector: &str) -> Result<(), AutomationError>;
    fn fill(&mut self, selector: &str, text: &str) -> Result<(), AutomationError>;
    fn press_key(&mut self, key: Key) -> Result<(), AutomationError>;
    fn is_visible(&mut self, selector: &str) -> Result<bool, AutomationError>;
}

/// CSS selectors for the parts of the feed the harvester reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selectors {
    pub login_username: String,
    pub login_password: String,
    pub login_submit: String,
    pub feed_links: String,
    pub post_time: String,
    pub caption_spans: String,
    pub media: String,
    pub next_media: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            login_username: r#"input[name="username"]"#.to_string(),
            login_password: r#"input[name="password"]"#.to_string(),
            login_submit: r#"button[type="submit"]"#.to_string(),
            feed_links: r#"article a[href^="/p/"]"#.to_string(),
            post_time: "article time".to_string(),
            caption_spans: "article ul span".to_string(),
            media: "article img, article video".to_string(),
            next_media: r#"button[aria-label="Next"]"#.to_string(),
        }
    }
}
