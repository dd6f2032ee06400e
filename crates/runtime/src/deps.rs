//! Dependency injection traits for external effects
//!
//! Every side effect the workspace performs (spawning processes, touching
//! the file system, sleeping, talking to a terminal) goes through a trait
//! defined here, so the command façade and the deployment helpers can be
//! tested against mocks.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::error::CommandError;

/// A single external command invocation.
///
/// Created per call and never mutated afterwards; one spec produces exactly
/// one [`CommandOutput`].
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    /// Executable name or path
    pub program: String,
    /// Ordered argument list
    pub args: Vec<String>,
    /// Working directory for the child process, if any
    pub working_dir: Option<PathBuf>,
    /// Environment variables merged over the ambient process environment
    pub env: HashMap<String, String>,
}

impl CommandSpec {
    /// Create a spec for the given program with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Append a single argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory of the child process.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Override an environment variable for the child process.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// Output captured from a finished command.
///
/// stdout and stderr are kept separate; [`CommandOutput::text`] gives the
/// merged view the output classifier scans.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code of the process, `None` if it was killed by a signal
    pub exit_code: Option<i32>,
    /// Captured standard output
    pub stdout: Vec<u8>,
    /// Captured standard error
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Whether the command exited with code zero.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Captured standard output as lossy UTF-8.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Captured standard error as lossy UTF-8.
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Combined output, stdout first then stderr.
    pub fn text(&self) -> String {
        let mut text = self.stdout_text();
        let err = String::from_utf8_lossy(&self.stderr);
        if !err.is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&err);
        }
        text
    }
}

/// Command execution operations
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Check if a command exists in PATH
    async fn check_command_exists(&self, command: &str) -> Result<(), CommandError>;

    /// Execute a command and capture its output.
    ///
    /// A non-zero exit code is reported as data in the returned
    /// [`CommandOutput`], never as an error.
    async fn execute(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError>;
}

/// File system operations
pub trait FileSystem: Send + Sync {
    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Read a file to string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Write string to file
    fn write_string(&self, path: &Path, content: &str) -> Result<()>;

    /// List the entries of a directory
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// Async runtime operations
#[async_trait]
pub trait AsyncRuntime: Send + Sync {
    /// Sleep for a duration
    async fn sleep(&self, duration: Duration);
}

/// Message styling options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStyle {
    /// Bold text style
    Bold,
    /// Cyan colored text
    Cyan,
    /// Green colored text
    Green,
    /// Red colored text
    Red,
    /// Yellow colored text
    Yellow,
    /// Warning style (typically yellow)
    Warning,
    /// Error style (typically red)
    Error,
    /// Success style (typically green)
    Success,
}

/// User interface operations
pub trait UserInterface: Send + Sync {
    /// Create a spinner progress indicator
    fn create_spinner(&self) -> Box<dyn ProgressIndicator>;

    /// Print a message
    fn print(&self, message: &str);

    /// Print a styled message
    fn print_styled(&self, message: &str, style: MessageStyle);

    /// Check if running in interactive mode
    fn is_interactive(&self) -> bool;

    /// Prompt for text input
    fn prompt_input(&self, prompt: &str, default: Option<&str>) -> Result<String>;

    /// Prompt for hidden input, e.g. a password
    fn prompt_password(&self, prompt: &str) -> Result<String>;
}

/// Progress indicator trait
pub trait ProgressIndicator: Send + Sync {
    /// Set the message
    fn set_message(&self, message: &str);

    /// Finish and clear the progress
    fn finish_and_clear(&self);

    /// Enable steady tick
    fn enable_steady_tick(&self, duration: Duration);

    /// Finish with a message
    fn finish_with_message(&self, message: String);
}

// Production implementations

/// Production command executor implementation
pub struct RealCommandExecutor;

#[async_trait]
impl CommandExecutor for RealCommandExecutor {
    async fn check_command_exists(&self, command: &str) -> Result<(), CommandError> {
        which::which(command)
            .map(|_| ())
            .map_err(|_| CommandError::ExecutableNotFound {
                program: command.to_string(),
            })
    }

    async fn execute(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        if let Some(dir) = &spec.working_dir {
            if !dir.is_dir() {
                return Err(CommandError::Invocation {
                    program: spec.program.clone(),
                    source: io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("working directory `{}` does not exist", dir.display()),
                    ),
                });
            }
        }

        let mut command = tokio::process::Command::new(&spec.program);
        command.args(&spec.args).envs(&spec.env);
        if let Some(dir) = &spec.working_dir {
            command.current_dir(dir);
        }

        tracing::debug!(program = %spec.program, args = spec.args.len(), "spawning external command");

        let output = command.output().await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                CommandError::ExecutableNotFound {
                    program: spec.program.clone(),
                }
            } else {
                CommandError::Invocation {
                    program: spec.program.clone(),
                    source: e,
                }
            }
        })?;

        tracing::debug!(program = %spec.program, code = ?output.status.code(), "external command finished");

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Production file system implementation
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
    }

    fn write_string(&self, path: &Path, content: &str) -> Result<()> {
        std::fs::write(path, content)
            .map_err(|e| anyhow::anyhow!("Failed to write file {}: {}", path.display(), e))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)
            .map_err(|e| anyhow::anyhow!("Failed to list directory {}: {}", path.display(), e))?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        Ok(paths)
    }
}

/// Production async runtime
pub struct RealAsyncRuntime;

#[async_trait]
impl AsyncRuntime for RealAsyncRuntime {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
#[path = "deps_tests.rs"]
mod tests;
