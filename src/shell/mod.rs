//! Shell startup-file metadata
//!
//! Knows which startup files each supported shell reads and in what role,
//! and derives the destination file name for a target bucket.

mod profile;

pub use profile::{current_platform, ShellKind, StartupFile, StartupRole};
