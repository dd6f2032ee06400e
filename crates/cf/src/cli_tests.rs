//! Unit tests for the CF command façade

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::error::CfError;
use crate::retry::RetryPolicy;
use crate::target::CfTarget;
use crate::test_helpers::*;
use tapdeploy_runtime::error::CommandError;

fn build_cli(
    executor: MockCommandExecutor,
    retry: RetryPolicy,
) -> (
    CfCli,
    Arc<MockCommandExecutor>,
    Arc<ImmediateAsyncRuntime>,
    Arc<TestUserInterface>,
) {
    let executor = Arc::new(executor);
    let runtime = Arc::new(ImmediateAsyncRuntime::new());
    let ui = Arc::new(TestUserInterface::new());
    let cli = CfCli::new(Arc::new(CfDependencies {
        command_executor: executor.clone(),
        async_runtime: runtime.clone(),
        ui: ui.clone(),
    }))
    .with_binary("cf")
    .with_retry(retry);
    (cli, executor, runtime, ui)
}

fn test_target() -> CfTarget {
    CfTarget {
        api_url: "https://api.example.com".to_string(),
        user: "u".to_string(),
        password: "p".to_string(),
        org: "o".to_string(),
        space: "s".to_string(),
    }
}

#[tokio::test]
async fn test_run_returns_captured_text() {
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_execute()
        .withf(|spec| spec.program == "cf" && spec.args == vec!["apps"])
        .returning(|_| Ok(ok_output("ok")));

    let (cli, _, _, _) = build_cli(executor, RetryPolicy::none());
    let text = cli.run(&["apps"]).await.unwrap();
    assert_eq!(text, "ok");
}

#[tokio::test]
async fn test_run_failure_carries_output() {
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_execute()
        .returning(|_| Ok(failed_output(1, "No such app")));

    let (cli, _, _, _) = build_cli(executor, RetryPolicy::none());
    match cli.run(&["app", "missing"]).await.unwrap_err() {
        CfError::CommandFailed { command, output } => {
            assert_eq!(command, "cf app missing");
            assert_eq!(output, "No such app");
        }
        other => panic!("expected CommandFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_runner_errors_propagate() {
    let mut executor = MockCommandExecutor::new();
    executor.expect_execute().returning(|_| {
        Err(CommandError::ExecutableNotFound {
            program: "cf".to_string(),
        })
    });

    let (cli, _, _, _) = build_cli(executor, RetryPolicy::none());
    match cli.run(&["apps"]).await.unwrap_err() {
        CfError::Command(CommandError::ExecutableNotFound { program }) => {
            assert_eq!(program, "cf");
        }
        other => panic!("expected Command, got {other:?}"),
    }
}

#[tokio::test]
async fn test_login_issues_api_auth_target_in_order() {
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_execute()
        .withf(|spec| {
            spec.args
                == vec!["api", "https://api.example.com", "--skip-ssl-validation"]
        })
        .returning(|_| Ok(ok_output("OK")));
    executor
        .expect_execute()
        .withf(|spec| spec.args == vec!["auth", "u", "p"])
        .returning(|_| Ok(ok_output("Authenticating...\nOK")));
    executor
        .expect_execute()
        .withf(|spec| spec.args == vec!["target", "-o", "o", "-s", "s"])
        .returning(|_| Ok(ok_output("OK")));

    let (cli, executor, _, _) = build_cli(executor, RetryPolicy::none());
    cli.login(&test_target()).await.unwrap();
    assert_eq!(executor.calls().len(), 3);
}

#[tokio::test]
async fn test_login_short_circuits_on_rejected_auth() {
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_execute()
        .withf(|spec| spec.args.first().map(String::as_str) == Some("api"))
        .returning(|_| Ok(ok_output("OK")));
    executor
        .expect_execute()
        .withf(|spec| spec.args.first().map(String::as_str) == Some("auth"))
        .returning(|_| Ok(failed_output(1, "Credentials were rejected, please try again.")));

    let (cli, executor, _, _) = build_cli(executor, RetryPolicy::none());
    match cli.login(&test_target()).await.unwrap_err() {
        CfError::Authentication { output } => {
            assert!(output.contains("Credentials were rejected"));
        }
        other => panic!("expected Authentication, got {other:?}"),
    }

    // The target step must never run after a failed auth.
    let calls = executor.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls
        .iter()
        .all(|spec| spec.args.first().map(String::as_str) != Some("target")));
}

#[tokio::test]
async fn test_create_service_success_on_zero_exit() {
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_execute()
        .withf(|spec| spec.args == vec!["create-service", "postgresql93", "free", "my-db"])
        .returning(|_| Ok(ok_output("Creating service instance my-db... OK")));

    let (cli, _, _, ui) = build_cli(executor, RetryPolicy::none());
    cli.create_service("postgresql93", "free", "my-db")
        .await
        .unwrap();
    assert!(ui.get_styled_output().is_empty());
}

#[tokio::test]
async fn test_create_service_already_exists_is_success() {
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_execute()
        .returning(|_| Ok(failed_output(1, "FAILED\nService my-db already exists")));

    let (cli, _, _, ui) = build_cli(executor, RetryPolicy::none());
    cli.create_service("postgresql93", "free", "my-db")
        .await
        .unwrap();

    let output = ui.get_output();
    assert!(output.iter().any(|s| s.contains("already exists")));
}

#[tokio::test]
async fn test_create_service_other_failure_is_error() {
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_execute()
        .returning(|_| Ok(failed_output(1, "FAILED\nService offering not found")));

    let (cli, _, _, _) = build_cli(executor, RetryPolicy::none());
    match cli
        .create_service("postgresql93", "free", "my-db")
        .await
        .unwrap_err()
    {
        CfError::ServiceCreation { instance, output } => {
            assert_eq!(instance, "my-db");
            assert!(output.contains("offering not found"));
        }
        other => panic!("expected ServiceCreation, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_user_provided_service_passes_credentials() {
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_execute()
        .withf(|spec| {
            spec.args.first().map(String::as_str) == Some("create-user-provided-service")
                && spec.args.contains(&"-p".to_string())
                && spec.args.iter().any(|a| a.contains("\"uri\""))
        })
        .returning(|_| Ok(ok_output("OK")));

    let (cli, _, _, _) = build_cli(executor, RetryPolicy::none());
    cli.create_user_provided_service("my-upsi", &serde_json::json!({"uri": "http://x"}))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_push_runs_in_work_dir_with_manifest() {
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_execute()
        .withf(|spec| {
            spec.working_dir.as_deref() == Some(Path::new("/proj"))
                && spec.args[..3] == ["push", "-f", "/proj/manifest.yml"]
                && spec.args[3..] == ["--no-start"]
        })
        .returning(|_| Ok(ok_output("Pushing app...\nOK")));

    let (cli, executor, runtime, _) = build_cli(executor, RetryPolicy::none());
    cli.push(
        Path::new("/proj"),
        Some(Path::new("/proj/manifest.yml")),
        &["--no-start"],
    )
    .await
    .unwrap();

    assert_eq!(executor.calls().len(), 1);
    assert!(runtime.sleeps().is_empty());
}

#[tokio::test]
async fn test_push_retries_transient_failures_exactly_max_attempts() {
    let mut executor = MockCommandExecutor::new();
    for _ in 0..3 {
        executor
            .expect_execute()
            .returning(|_| Ok(failed_output(1, "Error staging application: staging time expired")));
    }

    let retry = RetryPolicy::new(3, Duration::from_secs(5));
    let (cli, executor, runtime, _) = build_cli(executor, retry);

    match cli.push(Path::new("/proj"), None, &[]).await.unwrap_err() {
        CfError::Push { attempts, output } => {
            assert_eq!(attempts, 3);
            assert!(output.contains("staging time expired"));
        }
        other => panic!("expected Push, got {other:?}"),
    }

    // Three attempts were made, with a delay after each of the first two.
    assert_eq!(executor.calls().len(), 3);
    assert_eq!(runtime.sleeps(), vec![Duration::from_secs(5); 2]);
}

#[tokio::test]
async fn test_push_recovers_on_a_retry() {
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_execute()
        .returning(|_| Ok(failed_output(1, "request timed out")));
    executor
        .expect_execute()
        .returning(|_| Ok(ok_output("OK")));

    let (cli, executor, _, _) = build_cli(executor, RetryPolicy::default());
    cli.push(Path::new("/proj"), None, &[]).await.unwrap();
    assert_eq!(executor.calls().len(), 2);
}

#[tokio::test]
async fn test_push_fatal_failure_does_not_retry() {
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_execute()
        .returning(|_| Ok(failed_output(1, "FAILED\nNo manifest found")));

    let (cli, executor, runtime, _) = build_cli(executor, RetryPolicy::default());
    match cli.push(Path::new("/proj"), None, &[]).await.unwrap_err() {
        CfError::Push { attempts, .. } => assert_eq!(attempts, 1),
        other => panic!("expected Push, got {other:?}"),
    }
    assert_eq!(executor.calls().len(), 1);
    assert!(runtime.sleeps().is_empty());
}

#[tokio::test]
async fn test_bind_service_is_idempotent() {
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_execute()
        .withf(|spec| spec.args == vec!["bind-service", "my-app", "my-db"])
        .returning(|_| Ok(failed_output(1, "Service my-db is already bound to app my-app")));

    let (cli, _, _, _) = build_cli(executor, RetryPolicy::none());
    cli.bind_service("my-app", "my-db").await.unwrap();
}

#[tokio::test]
async fn test_create_org_and_space_are_idempotent() {
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_execute()
        .withf(|spec| spec.args == vec!["create-org", "seedorg"])
        .returning(|_| Ok(failed_output(1, "Org seedorg already exists")));
    executor
        .expect_execute()
        .withf(|spec| spec.args == vec!["create-space", "seedspace", "-o", "seedorg"])
        .returning(|_| Ok(failed_output(1, "Space seedspace already exists")));

    let (cli, _, _, _) = build_cli(executor, RetryPolicy::none());
    cli.create_org("seedorg").await.unwrap();
    cli.create_space("seedorg", "seedspace").await.unwrap();
}

#[tokio::test]
async fn test_restage_failure_is_fatal() {
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_execute()
        .withf(|spec| spec.args == vec!["restage", "my-app"])
        .returning(|_| Ok(failed_output(1, "App my-app not found")));

    let (cli, _, _, _) = build_cli(executor, RetryPolicy::none());
    match cli.restage("my-app").await.unwrap_err() {
        CfError::CommandFailed { output, .. } => assert!(output.contains("not found")),
        other => panic!("expected CommandFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_oauth_token_takes_last_line() {
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_execute()
        .withf(|spec| spec.args == vec!["oauth-token"])
        .returning(|_| Ok(ok_output("Getting OAuth token...\nOK\n\nbearer abc.def.ghi\n")));

    let (cli, _, _, _) = build_cli(executor, RetryPolicy::none());
    assert_eq!(cli.oauth_token().await.unwrap(), "bearer abc.def.ghi");
}

#[tokio::test]
async fn test_org_guid_is_trimmed() {
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_execute()
        .withf(|spec| spec.args == vec!["org", "seedorg", "--guid"])
        .returning(|_| Ok(ok_output("8b89a54b-b292-49eb-a8c4-2396ec038120\n")));

    let (cli, _, _, _) = build_cli(executor, RetryPolicy::none());
    assert_eq!(
        cli.org_guid("seedorg").await.unwrap(),
        "8b89a54b-b292-49eb-a8c4-2396ec038120"
    );
}

#[tokio::test]
async fn test_current_target_tolerates_nonzero_exit() {
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_execute()
        .withf(|spec| spec.args == vec!["target"])
        .returning(|_| Ok(failed_output(1, "No api endpoint set.")));

    let (cli, _, _, _) = build_cli(executor, RetryPolicy::none());
    let target = cli.current_target().await.unwrap();
    assert_eq!(target, CurrentTarget::default());
}

#[tokio::test]
async fn test_current_target_parses_session() {
    let mut executor = MockCommandExecutor::new();
    executor.expect_execute().returning(|_| {
        Ok(ok_output(
            "API endpoint: https://api.example.com\nuser: jdoe\norg: o\nspace: s\n",
        ))
    });

    let (cli, _, _, _) = build_cli(executor, RetryPolicy::none());
    let target = cli.current_target().await.unwrap();
    assert_eq!(target.api_url.as_deref(), Some("https://api.example.com"));
    assert_eq!(target.space.as_deref(), Some("s"));
}
