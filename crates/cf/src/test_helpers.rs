//! Test helper utilities and mock implementations for tapdeploy-cf
//!
//! The command executor mock is written by hand: mockall does not get on
//! with async traits taking borrowed arguments, and ordered expectations
//! are what the façade tests need anyway.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use tapdeploy_runtime::deps::{AsyncRuntime, CommandExecutor, CommandOutput, CommandSpec};
use tapdeploy_runtime::error::CommandError;

/// Test implementation of `UserInterface` that captures all output.
pub use tapdeploy_common::ui::TestUserInterface;

type ExecFn = Box<dyn Fn(&CommandSpec) -> Result<CommandOutput, CommandError> + Send + Sync>;
type SpecMatcher = Box<dyn Fn(&CommandSpec) -> bool + Send + Sync>;

/// Manual mock for `CommandExecutor` with ordered expectations.
///
/// Each `expect_execute()` call queues one response; invocations consume
/// the queue in order and are recorded so tests can assert exactly which
/// command lines were issued. Invocations beyond the queue succeed with
/// empty output.
pub struct MockCommandExecutor {
    execute_fns: Mutex<Vec<(Option<SpecMatcher>, ExecFn)>>,
    call_count: Mutex<usize>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl Default for MockCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCommandExecutor {
    /// Creates a new mock with an empty expectation queue.
    pub fn new() -> Self {
        Self {
            execute_fns: Mutex::new(Vec::new()),
            call_count: Mutex::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue an expectation for the next `execute` call.
    pub fn expect_execute(&mut self) -> ExecuteExpectation<'_> {
        ExecuteExpectation {
            mock: self,
            matcher: None,
        }
    }

    /// All command specs executed so far, in order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }
}

/// Builder for one ordered `execute` expectation.
pub struct ExecuteExpectation<'a> {
    mock: &'a mut MockCommandExecutor,
    matcher: Option<SpecMatcher>,
}

impl<'a> ExecuteExpectation<'a> {
    /// Require the spec of this invocation to satisfy `f`.
    #[must_use]
    pub fn withf<F>(mut self, f: F) -> Self
    where
        F: Fn(&CommandSpec) -> bool + Send + Sync + 'static,
    {
        self.matcher = Some(Box::new(f));
        self
    }

    /// Set the response for this invocation.
    pub fn returning<F>(self, f: F) -> &'a mut MockCommandExecutor
    where
        F: Fn(&CommandSpec) -> Result<CommandOutput, CommandError> + Send + Sync + 'static,
    {
        self.mock
            .execute_fns
            .lock()
            .unwrap()
            .push((self.matcher, Box::new(f)));
        self.mock
    }
}

#[async_trait]
impl CommandExecutor for MockCommandExecutor {
    async fn check_command_exists(&self, _command: &str) -> Result<(), CommandError> {
        Ok(())
    }

    async fn execute(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        self.calls.lock().unwrap().push(spec.clone());

        let mut count = self.call_count.lock().unwrap();
        let index = *count;
        *count += 1;

        let fns = self.execute_fns.lock().unwrap();
        if index < fns.len() {
            let (matcher, f) = &fns[index];
            if let Some(matcher) = matcher {
                assert!(
                    matcher(spec),
                    "invocation #{index} did not match expectation: {} {:?}",
                    spec.program,
                    spec.args
                );
            }
            f(spec)
        } else {
            Ok(ok_output(""))
        }
    }
}

/// Async runtime whose sleeps return immediately but are counted.
pub struct ImmediateAsyncRuntime {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl Default for ImmediateAsyncRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ImmediateAsyncRuntime {
    /// Create a runtime that records requested sleep durations.
    pub fn new() -> Self {
        Self {
            sleeps: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Durations requested so far.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl AsyncRuntime for ImmediateAsyncRuntime {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// A successful output with the given stdout text.
pub fn ok_output(stdout: &str) -> CommandOutput {
    CommandOutput {
        exit_code: Some(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

/// A failed output with the given exit code and stdout text.
pub fn failed_output(exit_code: i32, stdout: &str) -> CommandOutput {
    CommandOutput {
        exit_code: Some(exit_code),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}
