//! Errors raised by the command runner
//!
//! The runner is purely mechanical: a process that started and exited with
//! a non-zero code is *not* an error here. Only failures to start the
//! process at all are reported through this type; semantic interpretation
//! of exit codes happens in `tapdeploy-cf`.

use std::io;

use thiserror::Error;

/// Failure to invoke an external command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The executable could not be located on the PATH.
    #[error("executable `{program}` not found in PATH")]
    ExecutableNotFound {
        /// Name of the program that was looked up
        program: String,
    },

    /// The process could not be spawned, e.g. the working directory does
    /// not exist or the OS refused the invocation.
    #[error("failed to invoke `{program}`: {source}")]
    Invocation {
        /// Name of the program that was invoked
        program: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}
