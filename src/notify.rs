//! Transient, dismissible messages shown on top of the explorer.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Input rejected before any request was issued.
    Validation,
    /// A request against the API failed.
    Fetch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

const TITLE: &str = "Error";

impl Notification {
    pub fn validation(description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Validation,
            title: TITLE.to_string(),
            description: description.into(),
        }
    }

    pub fn fetch(description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Fetch,
            title: TITLE.to_string(),
            description: description.into(),
        }
    }
}
