//! Core abstractions for the tapdeploy helper library
//!
//! This crate contains the foundational pieces shared by the rest of the
//! workspace: the dependency injection traits for external effects (process
//! execution, file system access, time, user interaction) together with
//! their production implementations, and the configuration constants.

/// Configuration constants and environment variable names
pub mod config;
/// Dependency injection traits and implementations
pub mod deps;
/// Errors raised by the command runner
pub mod error;

// Re-export commonly used types at the crate root
pub use config::{
    CF_BIN_ENV_VAR, DEFAULT_CF_BIN, DEFAULT_MVN_BIN, DEFAULT_PUSH_ATTEMPTS,
    DEFAULT_PUSH_RETRY_DELAY_SECS,
};
pub use deps::{
    AsyncRuntime, CommandExecutor, CommandOutput, CommandSpec, FileSystem, MessageStyle,
    ProgressIndicator, RealAsyncRuntime, RealCommandExecutor, RealFileSystem, UserInterface,
};
pub use error::CommandError;
