//! The CF command façade
//!
//! Builds concrete `cf` command lines for each deployment intent, runs
//! them through the injected [`CommandExecutor`], and classifies the
//! captured output via the rule tables in [`crate::classify`].

use std::path::Path;
use std::sync::Arc;

use tapdeploy_runtime::config::{CF_BIN_ENV_VAR, DEFAULT_CF_BIN};
use tapdeploy_runtime::deps::{
    AsyncRuntime, CommandExecutor, CommandOutput, CommandSpec, MessageStyle, UserInterface,
};

use crate::classify::{classify, rules, Outcome, Rule};
use crate::error::CfError;
use crate::retry::RetryPolicy;
use crate::target::{CfTarget, CurrentTarget};

/// Dependencies for the CF façade
pub struct CfDependencies {
    /// Command executor for running the cf CLI
    pub command_executor: Arc<dyn CommandExecutor>,
    /// Async runtime for the retry delays
    pub async_runtime: Arc<dyn AsyncRuntime>,
    /// User interface for progress output
    pub ui: Arc<dyn UserInterface>,
}

/// Typed façade over the Cloud Foundry CLI.
///
/// One instance per deployment script; it holds no session state of its
/// own — the login/target context lives in the external CLI.
pub struct CfCli {
    deps: Arc<CfDependencies>,
    binary: String,
    retry: RetryPolicy,
}

impl CfCli {
    /// Create a façade using the `cf` binary (or the
    /// `TAPDEPLOY_CF_BIN` override) and the default retry policy.
    pub fn new(deps: Arc<CfDependencies>) -> Self {
        let binary =
            std::env::var(CF_BIN_ENV_VAR).unwrap_or_else(|_| DEFAULT_CF_BIN.to_string());
        Self {
            deps,
            binary,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the CLI binary name or path.
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Override the push retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn spec<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new(&self.binary).args(args)
    }

    async fn exec(&self, spec: &CommandSpec) -> Result<CommandOutput, CfError> {
        Ok(self.deps.command_executor.execute(spec).await?)
    }

    /// Run an invocation that has no special output handling: zero exit or
    /// [`CfError::CommandFailed`].
    async fn expect_success(&self, args: &[&str]) -> Result<CommandOutput, CfError> {
        self.classified(args, rules::GENERIC).await
    }

    /// Run an invocation and apply a rule table; `Retry` outcomes are
    /// treated as fatal here (only `push` retries).
    async fn classified(
        &self,
        args: &[&str],
        rules: &[Rule],
    ) -> Result<CommandOutput, CfError> {
        tracing::debug!(command = %format!("{} {}", self.binary, args.join(" ")), "cf invocation");
        let output = self.exec(&self.spec(args.iter().copied())).await?;
        match classify(output.exit_code, &output.text(), rules) {
            Outcome::Success => Ok(output),
            Outcome::Retry | Outcome::Fatal => Err(CfError::CommandFailed {
                command: format!("{} {}", self.binary, args.join(" ")),
                output: output.text(),
            }),
        }
    }

    /// Point the CLI at an API endpoint.
    pub async fn api(&self, api_url: &str, skip_ssl_validation: bool) -> Result<(), CfError> {
        let mut args = vec!["api", api_url];
        if skip_ssl_validation {
            args.push("--skip-ssl-validation");
        }
        self.expect_success(&args).await?;
        Ok(())
    }

    /// Authenticate. The password never reaches the logs.
    pub async fn auth(&self, user: &str, password: &str) -> Result<(), CfError> {
        tracing::debug!(command = %format!("{} auth {user} <redacted>", self.binary), "cf invocation");
        let spec = self.spec(["auth", user, password]);
        let output = self.exec(&spec).await?;
        match classify(output.exit_code, &output.text(), rules::AUTH) {
            Outcome::Success => Ok(()),
            Outcome::Retry | Outcome::Fatal => Err(CfError::Authentication {
                output: output.text(),
            }),
        }
    }

    /// Target an org and space.
    pub async fn target(&self, org: &str, space: &str) -> Result<(), CfError> {
        self.expect_success(&["target", "-o", org, "-s", space])
            .await?;
        Ok(())
    }

    /// Full login sequence: `api`, `auth`, `target`.
    ///
    /// Aborts at the first failing step; a rejected `auth` never reaches
    /// the `target` call.
    pub async fn login(&self, target: &CfTarget) -> Result<(), CfError> {
        self.deps
            .ui
            .print_styled(&format!("→ Logging in to {}", target.api_url), MessageStyle::Cyan);
        self.api(&target.api_url, true).await?;
        self.auth(&target.user, &target.password).await?;
        self.target(&target.org, &target.space).await
    }

    /// Create a managed service instance. An instance that already exists
    /// is a success, not an error.
    pub async fn create_service(
        &self,
        offering: &str,
        plan: &str,
        instance: &str,
    ) -> Result<(), CfError> {
        let args = ["create-service", offering, plan, instance];
        tracing::debug!(command = %format!("{} {}", self.binary, args.join(" ")), "cf invocation");
        let output = self.exec(&self.spec(args)).await?;
        match classify(output.exit_code, &output.text(), rules::CREATE) {
            Outcome::Success => {
                if !output.success() {
                    self.deps.ui.print_styled(
                        &format!("  service instance `{instance}` already exists"),
                        MessageStyle::Yellow,
                    );
                }
                Ok(())
            }
            Outcome::Retry | Outcome::Fatal => Err(CfError::ServiceCreation {
                instance: instance.to_string(),
                output: output.text(),
            }),
        }
    }

    /// Create a user-provided service instance carrying the given
    /// credentials document. Idempotent like [`CfCli::create_service`].
    pub async fn create_user_provided_service(
        &self,
        instance: &str,
        credentials: &serde_json::Value,
    ) -> Result<(), CfError> {
        let payload = credentials.to_string();
        let args = [
            "create-user-provided-service",
            instance,
            "-p",
            payload.as_str(),
        ];
        tracing::debug!(command = %format!("{} create-user-provided-service {instance} -p <credentials>", self.binary), "cf invocation");
        let output = self.exec(&self.spec(args)).await?;
        match classify(output.exit_code, &output.text(), rules::CREATE) {
            Outcome::Success => Ok(()),
            Outcome::Retry | Outcome::Fatal => Err(CfError::ServiceCreation {
                instance: instance.to_string(),
                output: output.text(),
            }),
        }
    }

    /// Push an application from `work_dir`.
    ///
    /// The longest-running, most failure-prone operation: staging
    /// timeouts and gateway hiccups inside the platform are retried up to
    /// the policy's attempt count with a fixed delay. Exhaustion returns
    /// [`CfError::Push`] carrying the last captured output.
    pub async fn push(
        &self,
        work_dir: &Path,
        manifest: Option<&Path>,
        options: &[&str],
    ) -> Result<(), CfError> {
        let mut args: Vec<String> = vec!["push".to_string()];
        if let Some(manifest) = manifest {
            args.push("-f".to_string());
            args.push(manifest.display().to_string());
        }
        args.extend(options.iter().map(|s| (*s).to_string()));

        let mut attempts = 0;
        loop {
            attempts += 1;
            tracing::debug!(
                command = %format!("{} {}", self.binary, args.join(" ")),
                attempt = attempts,
                "cf invocation"
            );
            let spec = self.spec(args.iter().cloned()).current_dir(work_dir);
            let output = self.exec(&spec).await?;

            match classify(output.exit_code, &output.text(), rules::PUSH) {
                Outcome::Success => return Ok(()),
                Outcome::Retry if attempts < self.retry.max_attempts => {
                    self.deps.ui.print_styled(
                        &format!(
                            "  push attempt {attempts} hit a transient failure, retrying in {}s",
                            self.retry.delay.as_secs()
                        ),
                        MessageStyle::Warning,
                    );
                    tracing::warn!(attempt = attempts, "transient push failure, retrying");
                    self.deps.async_runtime.sleep(self.retry.delay).await;
                }
                Outcome::Retry | Outcome::Fatal => {
                    return Err(CfError::Push {
                        attempts,
                        output: output.text(),
                    });
                }
            }
        }
    }

    /// Bind a service instance to an application. Binding twice is a
    /// no-op.
    pub async fn bind_service(&self, app: &str, instance: &str) -> Result<(), CfError> {
        let args = ["bind-service", app, instance];
        tracing::debug!(command = %format!("{} {}", self.binary, args.join(" ")), "cf invocation");
        let output = self.exec(&self.spec(args)).await?;
        match classify(output.exit_code, &output.text(), rules::BIND) {
            Outcome::Success => Ok(()),
            Outcome::Retry | Outcome::Fatal => Err(CfError::CommandFailed {
                command: format!("{} bind-service {app} {instance}", self.binary),
                output: output.text(),
            }),
        }
    }

    /// Create an organization; an existing org is a success.
    pub async fn create_org(&self, org: &str) -> Result<(), CfError> {
        self.classified(&["create-org", org], rules::CREATE).await?;
        Ok(())
    }

    /// Create a space in an organization; an existing space is a success.
    pub async fn create_space(&self, org: &str, space: &str) -> Result<(), CfError> {
        self.classified(&["create-space", space, "-o", org], rules::CREATE)
            .await?;
        Ok(())
    }

    /// Restage an application.
    pub async fn restage(&self, app: &str) -> Result<(), CfError> {
        self.expect_success(&["restage", app]).await?;
        Ok(())
    }

    /// Restart an application.
    pub async fn restart(&self, app: &str) -> Result<(), CfError> {
        self.expect_success(&["restart", app]).await?;
        Ok(())
    }

    /// Run an arbitrary CLI command and return the captured output.
    pub async fn run(&self, args: &[&str]) -> Result<String, CfError> {
        let output = self.expect_success(args).await?;
        Ok(output.text())
    }

    /// OAuth token of the current session, suitable for an
    /// `Authorization` header.
    pub async fn oauth_token(&self) -> Result<String, CfError> {
        let text = self.run(&["oauth-token"]).await?;
        // Newer CLIs print the bare token, older ones prepend a
        // "Getting OAuth token..." line; the token is the last line.
        let token = text
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default();
        if token.is_empty() {
            return Err(CfError::CommandFailed {
                command: format!("{} oauth-token", self.binary),
                output: text,
            });
        }
        Ok(token.to_string())
    }

    /// GUID of an organization.
    pub async fn org_guid(&self, org: &str) -> Result<String, CfError> {
        let text = self.run(&["org", org, "--guid"]).await?;
        Ok(text.trim().to_string())
    }

    /// What the ambient CLI session currently targets. Returns an empty
    /// target when the CLI is not pointed anywhere yet.
    pub async fn current_target(&self) -> Result<CurrentTarget, CfError> {
        let spec = self.spec(["target"]);
        let output = self.exec(&spec).await?;
        // `cf target` exits non-zero when nothing is set; that is still a
        // usable (empty) answer for defaulting purposes.
        Ok(CurrentTarget::parse(&output.text()))
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
