//! Integration tests for sitepulse-telemetry
//!
//! Drives full page sessions through host events and verifies the
//! session-level guarantees, the export artifact and the HTTP collector
//! sink (against a wiremock collector).

mod common;

mod test_collector_sink;
mod test_export;
mod test_session_properties;
