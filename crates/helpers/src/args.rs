//! Deployment-script arguments and interactive target completion
//!
//! Every deployment script takes the same set of optional flags; whatever
//! is missing is filled in interactively, defaulting to what the ambient
//! `cf` session already targets. The flag names keep underscores so
//! existing scripts built around the platform keep working unchanged.

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches, Parser};

use tapdeploy_cf::{CfCli, CfTarget};
use tapdeploy_runtime::deps::UserInterface;

/// Command-line arguments shared by every deployment script.
#[derive(Debug, Clone, Parser)]
pub struct DeployArgs {
    /// CF API URL, e.g. https://api.example.com
    #[arg(long = "api_url")]
    pub api_url: Option<String>,

    /// CF username
    #[arg(long)]
    pub user: Option<String>,

    /// CF password
    #[arg(long)]
    pub password: Option<String>,

    /// Organization name in which the application will be deployed
    #[arg(long)]
    pub org: Option<String>,

    /// Space name in which the application will be deployed
    #[arg(long)]
    pub space: Option<String>,

    /// Application name override
    #[arg(long = "app_name")]
    pub app_name: Option<String>,

    /// Directory containing the application manifest
    #[arg(long = "project_dir")]
    pub project_dir: Option<PathBuf>,
}

impl DeployArgs {
    /// Parse process arguments for a deployment script, with the help
    /// text and default application name customized to `app_name`.
    pub fn parse_for(app_name: &str) -> Self {
        let command =
            Self::command().about(format!("Deployment script for {app_name}"));
        let mut args = match Self::from_arg_matches(&command.get_matches()) {
            Ok(args) => args,
            Err(err) => err.exit(),
        };
        if args.app_name.is_none() {
            args.app_name = Some(app_name.to_string());
        }
        args
    }
}

/// A fully resolved login target plus the work it implies.
///
/// `login_required` means the credentials or endpoint differ from the
/// ambient session; `target_required` means at least `cf target` must be
/// re-issued before deploying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPlan {
    /// Complete target ready to hand to [`CfCli::login`]
    pub target: CfTarget,
    /// Whether a fresh `api`/`auth` sequence is needed
    pub login_required: bool,
    /// Whether `target -o .. -s ..` must be issued
    pub target_required: bool,
}

/// Fill in whatever [`DeployArgs`] left unset by prompting, defaulting to
/// the ambient `cf target` session.
///
/// The password is always read hidden when not passed as a flag. Any
/// value differing from the current session marks a login (and therefore
/// a retarget) as required; a changed org or space alone only requires a
/// retarget.
pub async fn resolve_target(
    args: &DeployArgs,
    cli: &CfCli,
    ui: &dyn UserInterface,
) -> Result<TargetPlan> {
    let current = cli.current_target().await?;
    let mut login_required = false;

    let api_url = match &args.api_url {
        Some(value) => value.clone(),
        None => ui.prompt_input("CF API URL", current.api_url.as_deref())?,
    };
    if current.api_url.as_deref() != Some(api_url.as_str()) {
        login_required = true;
    }

    let user = match &args.user {
        Some(value) => value.clone(),
        None => ui.prompt_input("Username", current.user.as_deref())?,
    };
    if current.user.as_deref() != Some(user.as_str()) {
        login_required = true;
    }

    let password = match &args.password {
        Some(value) => value.clone(),
        None => ui.prompt_password("Password")?,
    };
    if !password.is_empty() {
        login_required = true;
    }

    let org = match &args.org {
        Some(value) => value.clone(),
        None => ui.prompt_input("Organization", current.org.as_deref())?,
    };
    let space = match &args.space {
        Some(value) => value.clone(),
        None => ui.prompt_input("Space", current.space.as_deref())?,
    };

    let mut target_required = current.org.as_deref() != Some(org.as_str())
        || current.space.as_deref() != Some(space.as_str());
    if login_required {
        target_required = true;
    }

    Ok(TargetPlan {
        target: CfTarget {
            api_url,
            user,
            password,
            org,
            space,
        },
        login_required,
        target_required,
    })
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
