//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! such as parsing identifiers and validating tracking settings.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// ID parsing error
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// Screen or viewport dimensions that are not `<width>x<height>`
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Scroll milestone set that is empty, unordered or out of range
    #[error("Invalid scroll milestones: {0}")]
    InvalidMilestones(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}
