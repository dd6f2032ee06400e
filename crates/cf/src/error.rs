//! Error taxonomy of the CF command façade
//!
//! Every non-success outcome either resolves to an idempotent success in
//! the classifier or surfaces here with the raw captured output attached.

use thiserror::Error;

use tapdeploy_runtime::error::CommandError;

/// Failures surfaced by the CF façade.
#[derive(Debug, Error)]
pub enum CfError {
    /// The command could not be invoked at all (missing executable, bad
    /// working directory).
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The CLI rejected the supplied credentials.
    #[error("authentication failed: {output}")]
    Authentication {
        /// Captured CLI output
        output: String,
    },

    /// `create-service` failed for a reason other than the instance
    /// already existing.
    #[error("failed to create service instance `{instance}`: {output}")]
    ServiceCreation {
        /// Name of the service instance
        instance: String,
        /// Captured CLI output
        output: String,
    },

    /// `cf push` exhausted its retry budget.
    #[error("push failed after {attempts} attempt(s): {output}")]
    Push {
        /// Number of attempts made
        attempts: u32,
        /// Output captured from the last attempt
        output: String,
    },

    /// Fatal, unclassified non-zero exit.
    #[error("command `{command}` failed: {output}")]
    CommandFailed {
        /// The command line that was issued
        command: String,
        /// Captured CLI output
        output: String,
    },

    /// A `cf curl` response carried an `error_code`, or was structurally
    /// not what the endpoint promises.
    #[error("CF API call to `{path}` failed: {body}")]
    Api {
        /// The API path that was requested
        path: String,
        /// Response body or a description of the problem
        body: String,
    },

    /// A `cf curl` response was not valid JSON.
    #[error("malformed CF API response: {0}")]
    Json(#[from] serde_json::Error),
}
