//! Common utilities for tapdeploy
//!
//! This crate contains the pieces shared across the workspace that are not
//! effect abstractions themselves: terminal UI implementations and the
//! Maven packaging wrapper used to produce a deployable artifact before
//! `cf push`.

pub mod build;
pub mod ui;

// Re-export commonly used utilities at the crate root
pub use build::{BuildDependencies, MavenBuilder};
pub use ui::{RealUserInterface, TestUserInterface};
