//! Centralized configuration for tapdeploy
//!
//! This module provides a single source of truth for the configuration
//! values used throughout the workspace.
//!
//! # Environment Variables
//!
//! The following environment variables can be used to override defaults:
//! - `TAPDEPLOY_CF_BIN`: name or path of the Cloud Foundry CLI binary

/// Environment variable name for overriding the cf CLI binary
pub const CF_BIN_ENV_VAR: &str = "TAPDEPLOY_CF_BIN";

/// Default Cloud Foundry CLI binary name
pub const DEFAULT_CF_BIN: &str = "cf";

/// Default Maven binary name used for packaging
pub const DEFAULT_MVN_BIN: &str = "mvn";

/// Default number of attempts for `cf push` before giving up
pub const DEFAULT_PUSH_ATTEMPTS: u32 = 3;

/// Default delay between push attempts, in seconds
pub const DEFAULT_PUSH_RETRY_DELAY_SECS: u64 = 5;
