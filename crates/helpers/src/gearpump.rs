//! Gearpump application submission client
//!
//! Gearpump instances on the platform expose a REST API behind a login
//! endpoint. The session cookie handed out at login is kept in the HTTP
//! client's in-memory cookie store and rides along on the submit request
//! automatically. Instances sit behind self-signed certificates, so
//! certificate validation is disabled for this client only.

use std::path::Path;

use anyhow::{bail, Context, Result};
use reqwest::multipart;
use serde_json::{json, Map, Value};

use tapdeploy_cf::CfApi;

/// HTTP client for one Gearpump instance.
pub struct GearpumpClient {
    http: reqwest::Client,
    base_url: String,
}

impl GearpumpClient {
    /// Create a client for a Gearpump instance. A bare host gets an
    /// `http://` scheme prepended.
    pub fn new(gearpump_url: &str) -> Result<Self> {
        let base_url = if gearpump_url.contains("://") {
            gearpump_url.trim_end_matches('/').to_string()
        } else {
            format!("http://{gearpump_url}")
        };
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(true)
            .build()
            .context("failed to build Gearpump HTTP client")?;
        Ok(Self { http, base_url })
    }

    /// Log in to the instance. The session cookie is retained for
    /// subsequent requests from this client.
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let url = format!("{}/login", self.base_url);
        tracing::debug!(%url, %username, "logging in to Gearpump");
        let response = self
            .http
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .with_context(|| format!("Gearpump login request to {url} failed"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read Gearpump login response")?;
        if !status.is_success() {
            bail!("Gearpump login returned {status}: {body}");
        }
        Ok(body)
    }

    /// Submit an application jar together with its deploy request (see
    /// [`deploy_request`]). Requires a prior [`GearpumpClient::login`].
    pub async fn submit_app(&self, jar: &Path, request: &Value) -> Result<String> {
        let jar_name = jar
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("app.jar")
            .to_string();
        let bytes = tokio::fs::read(jar)
            .await
            .with_context(|| format!("failed to read jar {}", jar.display()))?;

        let url = format!("{}/api/v1.0/master/submitapp", self.base_url);
        tracing::debug!(%url, jar = %jar_name, "submitting application to Gearpump");
        let form = multipart::Form::new()
            .part("jar", multipart::Part::bytes(bytes).file_name(jar_name))
            .text("configstring", format!("tap={request}"));

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("Gearpump submit request to {url} failed"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read Gearpump submit response")?;
        if !status.is_success() {
            bail!("Gearpump submit returned {status}: {body}");
        }
        Ok(body)
    }
}

/// Build the `tap=` deploy request document for a set of service
/// instances the submitted application should be wired to.
///
/// For each instance the label, plan, tags and credentials are gathered
/// through the CF REST helper (credentials via a short-lived service
/// key), keyed by service label. `user_args` lands in the `usersArgs`
/// section verbatim.
pub async fn deploy_request(
    api: &CfApi,
    instances: &[&str],
    user_args: &Value,
) -> Result<Value> {
    let mut body = Map::new();
    for instance in instances {
        let (properties, credentials) = instance_data(api, instance).await?;
        body.insert(
            properties.label.clone(),
            json!([{
                "label": properties.label,
                "name": instance,
                "plan": properties.plan,
                "tags": properties.tags,
                "credentials": credentials,
            }]),
        );
    }
    body.insert("usersArgs".to_string(), user_args.clone());
    Ok(Value::Object(body))
}

struct InstanceProperties {
    label: String,
    plan: String,
    tags: Value,
}

/// Walk instance → plan → service through the CF API to collect the
/// request fields, and mint a temporary service key for the credentials.
async fn instance_data(api: &CfApi, instance_name: &str) -> Result<(InstanceProperties, Value)> {
    let instance = api.service_instance(instance_name).await?;

    let plan_url = instance
        .pointer("/entity/service_plan_url")
        .and_then(Value::as_str)
        .with_context(|| format!("service instance `{instance_name}` has no service plan URL"))?;
    let plan = api.curl_get(plan_url).await?;

    let service_url = plan
        .pointer("/entity/service_url")
        .and_then(Value::as_str)
        .with_context(|| format!("service plan of `{instance_name}` has no service URL"))?;
    let service = api.curl_get(service_url).await?;

    let label = service
        .pointer("/entity/label")
        .and_then(Value::as_str)
        .with_context(|| format!("service of `{instance_name}` has no label"))?
        .to_string();
    let plan_name = plan
        .pointer("/entity/name")
        .and_then(Value::as_str)
        .with_context(|| format!("service plan of `{instance_name}` has no name"))?
        .to_string();
    let tags = instance
        .pointer("/entity/tags")
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));

    let key = api.temporary_key_data(instance_name).await?;
    let credentials = key
        .pointer("/entity/credentials")
        .cloned()
        .with_context(|| format!("service key for `{instance_name}` has no credentials"))?;

    Ok((
        InstanceProperties {
            label,
            plan: plan_name,
            tags,
        },
        credentials,
    ))
}

#[cfg(test)]
#[path = "gearpump_tests.rs"]
mod tests;
