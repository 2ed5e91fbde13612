//! Page and element descriptions supplied by the host
//!
//! The tracker never touches a live document. Hosts describe the page
//! and the elements involved in an interaction with these plain types.

use serde::{Deserialize, Serialize};

use super::newtypes::Dimensions;

/// Snapshot of the page and device the session runs in
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageContext {
    /// Current document URL
    pub url: String,
    /// Current document title
    pub title: String,
    /// Referrer of the current document (empty when there is none)
    pub referrer: String,
    /// User agent string of the host
    pub user_agent: String,
    /// Physical screen size
    pub screen: Dimensions,
    /// Inner window size
    pub viewport: Dimensions,
}

impl PageContext {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = referrer.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_screen(mut self, screen: Dimensions) -> Self {
        self.screen = screen;
        self
    }

    pub fn with_viewport(mut self, viewport: Dimensions) -> Self {
        self.viewport = viewport;
        self
    }
}

/// Descriptive attributes of an element a user interacted with
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementInfo {
    /// Tag name as reported by the host (any case)
    pub tag_name: String,
    pub id: Option<String>,
    pub class_name: Option<String>,
    /// Full text content; truncated by the tracker
    pub text_content: Option<String>,
}

impl ElementInfo {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    /// Trimmed text content limited to `limit` characters.
    ///
    /// Empty text (after trimming) is reported as absent.
    pub fn text_excerpt(&self, limit: usize) -> Option<String> {
        let text = self.text_content.as_deref()?.trim();
        if text.is_empty() {
            return None;
        }
        Some(text.chars().take(limit).collect())
    }
}

/// Identity of a form whose fields are being reported
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormInfo {
    pub id: Option<String>,
}

impl FormInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()) }
    }

    pub fn anonymous() -> Self {
        Self { id: None }
    }
}
