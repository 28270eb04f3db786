//! rcweave - assemble shell startup files from small modules
//!
//! Users keep many tiny shell snippets instead of one monolithic rc file;
//! rcweave stitches them back together deterministically for a given OS and
//! shell, honoring declared load-order dependencies.

pub mod cli;
pub mod domain;
pub mod shell;
pub mod storage;

pub use domain::{build, resolve, validate, BuildError, BuildOutput, Manifest, Module};
pub use shell::ShellKind;
