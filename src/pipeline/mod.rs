//! Pipeline stages shared by every built-in extractor.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ postprocess
//! (path)    (format)    (cleanup)
//! ```
//!
//! 1. [`input`]: validate the source path and read it (existence,
//!    directory check, read permission, UTF-8 decoding)
//! 2. extraction is format-specific and lives in [`crate::converter`]
//! 3. [`postprocess`]: deterministic whitespace / invisible-character cleanup

pub mod input;
pub mod postprocess;
