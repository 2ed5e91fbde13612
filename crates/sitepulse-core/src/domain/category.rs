//! Event categories and the name-based classifier

use serde::{Deserialize, Serialize};

/// Coarse category attached to every event forwarded to the analytics sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// Moving between pages or opening menus
    Navigation,
    /// Clicks, hovers and other direct manipulation
    Interaction,
    /// Form submissions, signups and logins
    Conversion,
    /// Scrolling and visibility of content
    Engagement,
    /// Load timings and web vitals
    Performance,
    /// Assistive technology usage (never inferred from a name)
    Accessibility,
}

impl EventCategory {
    /// All categories, in declaration order.
    pub const ALL: [EventCategory; 6] = [
        EventCategory::Navigation,
        EventCategory::Interaction,
        EventCategory::Conversion,
        EventCategory::Engagement,
        EventCategory::Performance,
        EventCategory::Accessibility,
    ];

    /// Classify an event by substring matching on its name.
    ///
    /// Rules are checked in a fixed order and the first match wins, so a
    /// composite name like `menu_form_open` is a conversion, not navigation.
    /// Names matching nothing fall back to [`EventCategory::Interaction`].
    pub fn classify(event_name: &str) -> Self {
        const RULES: &[(&[&str], EventCategory)] = &[
            (&["click", "button"], EventCategory::Interaction),
            (&["form", "signup", "login"], EventCategory::Conversion),
            (&["nav", "menu"], EventCategory::Navigation),
            (&["scroll", "visible"], EventCategory::Engagement),
            (&["load", "performance"], EventCategory::Performance),
        ];

        RULES
            .iter()
            .find(|(needles, _)| needles.iter().any(|n| event_name.contains(n)))
            .map(|(_, category)| *category)
            .unwrap_or(EventCategory::Interaction)
    }

    /// Wire name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Navigation => "navigation",
            EventCategory::Interaction => "interaction",
            EventCategory::Conversion => "conversion",
            EventCategory::Engagement => "engagement",
            EventCategory::Performance => "performance",
            EventCategory::Accessibility => "accessibility",
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
