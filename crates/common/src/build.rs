//! Maven packaging wrapper
//!
//! Deployable applications are packaged with `mvn clean package` before
//! they are pushed. A build only counts as successful when Maven exits
//! with code zero *and* the expected assembly jar shows up under
//! `target/`; Maven is happy to exit zero for modules that produce nothing
//! deployable.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use tapdeploy_runtime::config::DEFAULT_MVN_BIN;
use tapdeploy_runtime::deps::{
    CommandExecutor, CommandSpec, FileSystem, MessageStyle, UserInterface,
};

/// Suffix of the assembly jar produced by the deployment projects.
const ARTIFACT_SUFFIX: &str = "-with-dependencies.jar";

/// Dependencies for the Maven builder
pub struct BuildDependencies {
    /// Command executor for running Maven
    pub command_executor: Arc<dyn CommandExecutor>,
    /// File system used to locate the built artifact
    pub file_system: Arc<dyn FileSystem>,
    /// User interface for displaying progress
    pub ui: Arc<dyn UserInterface>,
}

/// Wrapper around the Maven build invocation
pub struct MavenBuilder {
    deps: Arc<BuildDependencies>,
    binary: String,
}

impl MavenBuilder {
    /// Create a builder using the default `mvn` binary.
    pub fn new(deps: Arc<BuildDependencies>) -> Self {
        Self {
            deps,
            binary: DEFAULT_MVN_BIN.to_string(),
        }
    }

    /// Override the Maven binary name or path.
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Run `mvn clean package` in `work_dir` and return the path of the
    /// produced assembly jar.
    pub async fn prepare_package(&self, work_dir: &Path) -> Result<PathBuf> {
        self.deps
            .command_executor
            .check_command_exists(&self.binary)
            .await
            .context("Maven is required to package the application")?;

        self.deps
            .ui
            .print_styled("→ Packaging application...", MessageStyle::Cyan);

        let spec = CommandSpec::new(&self.binary)
            .args(["clean", "package"])
            .current_dir(work_dir);

        let output = self.deps.command_executor.execute(&spec).await?;
        if !output.success() {
            tracing::warn!(code = ?output.exit_code, "maven build failed");
            anyhow::bail!(
                "Maven build failed in {}:\n{}",
                work_dir.display(),
                output.text()
            );
        }

        let artifact = self.find_artifact(work_dir)?;
        self.deps.ui.print_styled(
            &format!("✓ Packaged {}", artifact.display()),
            MessageStyle::Success,
        );
        Ok(artifact)
    }

    /// Locate the assembly jar under `<work_dir>/target`.
    pub fn find_artifact(&self, work_dir: &Path) -> Result<PathBuf> {
        let target = work_dir.join("target");
        let entries = self
            .deps
            .file_system
            .read_dir(&target)
            .with_context(|| format!("no build output in {}", target.display()))?;

        entries
            .into_iter()
            .find(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.ends_with(ARTIFACT_SUFFIX))
            })
            .with_context(|| {
                format!(
                    "build succeeded but no `*{}` artifact found in {}",
                    ARTIFACT_SUFFIX,
                    target.display()
                )
            })
    }
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
