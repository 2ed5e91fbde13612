//! Artifact target port (driven/secondary port)
//!
//! Receives files offered to the user, such as the user study export.
//! In a browser this is a download prompt; the telemetry crate ships a
//! directory-backed implementation.

/// Port trait for offering a generated file to the user
pub trait IArtifactTarget {
    /// Offers `contents` under `file_name` with the given MIME type
    fn offer(&self, file_name: &str, mime_type: &str, contents: &[u8]) -> anyhow::Result<()>;
}
