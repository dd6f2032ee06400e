//! Cloud Foundry CLI façade for tapdeploy
//!
//! Translates high-level deployment intents (login, push, create-service,
//! bind-service, ...) into `cf` invocations, classifies the captured
//! output, and retries the transient failures `cf push` is prone to.
//! Everything semantic lives here; the actual process execution is behind
//! `tapdeploy_runtime::deps::CommandExecutor`.

/// REST helper built on `cf curl`
pub mod api;
/// Output classification rules shared by all operations
pub mod classify;
/// The command façade itself
pub mod cli;
/// Error taxonomy
pub mod error;
/// Retry policy for transient push failures
pub mod retry;
/// Deployment target types
pub mod target;

#[cfg(test)]
pub mod test_helpers;

// Re-export the façade surface at the crate root
pub use api::CfApi;
pub use classify::{classify, Outcome, Rule};
pub use cli::{CfCli, CfDependencies};
pub use error::CfError;
pub use retry::RetryPolicy;
pub use target::{CfTarget, CurrentTarget};
