//! Domain entities
//!
//! This module contains the core domain types for SitePulse:
//! - Newtypes for session identifiers and screen dimensions
//! - Event categories and the name-based classifier
//! - Event envelopes and page views
//! - Page, element and form descriptions supplied by the host
//! - The session and its append-only log
//! - Domain-specific error types

pub mod category;
pub mod envelope;
pub mod errors;
pub mod newtypes;
pub mod page;
pub mod session;

// Re-export commonly used types
pub use category::EventCategory;
pub use envelope::{EventEnvelope, PageView, Parameters, RESERVED_FIELDS};
pub use errors::DomainError;
pub use newtypes::*;
pub use page::{ElementInfo, FormInfo, PageContext};
pub use session::{Session, SessionLog};
