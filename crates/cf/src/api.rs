//! Cloud Foundry REST helper built on `cf curl`
//!
//! The uploader and Gearpump helpers need details the plain CLI does not
//! print (service instance GUIDs, user-provided service credentials,
//! bindings). `cf curl` reuses the ambient CLI session, so no separate
//! authentication is needed here.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::cli::CfCli;
use crate::error::CfError;

/// Name used for the short-lived key created by
/// [`CfApi::temporary_key_data`].
const TEMPORARY_KEY_NAME: &str = "tapdeploy-temp-key";

/// REST client over `cf curl`.
pub struct CfApi {
    cli: Arc<CfCli>,
}

impl CfApi {
    /// Wrap a façade instance.
    pub fn new(cli: Arc<CfCli>) -> Self {
        Self { cli }
    }

    /// GET a CF API path and parse the JSON response.
    pub async fn curl_get(&self, path: &str) -> Result<Value, CfError> {
        let body = self.cli.run(&["curl", path]).await?;
        Self::parse_response(path, &body)
    }

    async fn curl_send(&self, path: &str, method: &str, payload: &str) -> Result<String, CfError> {
        self.cli
            .run(&["curl", path, "-X", method, "-d", payload])
            .await
    }

    fn parse_response(path: &str, body: &str) -> Result<Value, CfError> {
        let response: Value = serde_json::from_str(body)?;
        if response.get("error_code").is_some() {
            return Err(CfError::Api {
                path: path.to_string(),
                body: response.to_string(),
            });
        }
        Ok(response)
    }

    /// Create a service key for a service instance (managed or
    /// user-provided) and return the key document.
    pub async fn create_service_key(
        &self,
        service_guid: &str,
        key_name: &str,
    ) -> Result<Value, CfError> {
        let path = "/v2/service_keys";
        let payload = json!({
            "service_instance_guid": service_guid,
            "name": key_name,
        });
        let body = self.curl_send(path, "POST", &payload.to_string()).await?;
        Self::parse_response(path, &body)
    }

    /// Delete a service key by GUID.
    pub async fn delete_service_key(&self, key_guid: &str) -> Result<(), CfError> {
        let path = format!("/v2/service_keys/{key_guid}");
        self.curl_send(&path, "DELETE", "").await?;
        Ok(())
    }

    /// Create a short-lived service key for an instance, read its data,
    /// and delete it again. Used to obtain credentials for instances that
    /// expose them only through keys.
    pub async fn temporary_key_data(&self, instance_name: &str) -> Result<Value, CfError> {
        let service_guid = self.service_instance_guid(instance_name).await?;
        let key = self
            .create_service_key(&service_guid, TEMPORARY_KEY_NAME)
            .await?;
        let key_guid = string_at(&key, "/metadata/guid", "/v2/service_keys")?;
        self.delete_service_key(&key_guid).await?;
        Ok(key)
    }

    /// GUID of a service instance, looked up by name.
    pub async fn service_instance_guid(&self, instance_name: &str) -> Result<String, CfError> {
        let instances = self.all_service_instances().await?;
        let resources = instances
            .pointer("/resources")
            .and_then(Value::as_array)
            .ok_or_else(|| CfError::Api {
                path: "/v2/service_instances".to_string(),
                body: "response has no `resources` array".to_string(),
            })?;

        for resource in resources {
            if resource.pointer("/entity/name").and_then(Value::as_str) == Some(instance_name) {
                return string_at(resource, "/metadata/guid", "/v2/service_instances");
            }
        }

        Err(CfError::Api {
            path: "/v2/service_instances".to_string(),
            body: format!("no service instance named `{instance_name}`"),
        })
    }

    /// Details of a service instance, looked up by name.
    pub async fn service_instance(&self, instance_name: &str) -> Result<Value, CfError> {
        let guid = self.service_instance_guid(instance_name).await?;
        self.curl_get(&format!("/v2/service_instances/{guid}")).await
    }

    /// All service instances visible in the current space.
    pub async fn all_service_instances(&self) -> Result<Value, CfError> {
        self.curl_get("/v2/service_instances").await
    }

    /// Create a binding between a service instance and an application.
    pub async fn create_service_binding(
        &self,
        service_guid: &str,
        app_guid: &str,
    ) -> Result<Value, CfError> {
        let path = "/v2/service_bindings";
        let payload = json!({
            "service_instance_guid": service_guid,
            "app_guid": app_guid,
        });
        let body = self.curl_send(path, "POST", &payload.to_string()).await?;
        Self::parse_response(path, &body)
    }

    /// Delete a service binding. `binding` is a binding document with
    /// `metadata` and `entity` fields.
    pub async fn delete_service_binding(&self, binding: &Value) -> Result<(), CfError> {
        let url = string_at(binding, "/metadata/url", "/v2/service_bindings")?;
        let body = self.curl_send(&url, "DELETE", "").await?;
        // A successful DELETE returns an empty body; anything else is an
        // error description.
        if !body.trim().is_empty() {
            return Err(CfError::Api {
                path: url,
                body,
            });
        }
        Ok(())
    }

    /// Name of an application, looked up by GUID.
    pub async fn app_name(&self, app_guid: &str) -> Result<String, CfError> {
        let path = format!("/v2/apps/{app_guid}");
        let app = self.curl_get(&path).await?;
        string_at(&app, "/entity/name", &path)
    }

    /// Credentials document of a user-provided service instance.
    pub async fn upsi_credentials(&self, service_guid: &str) -> Result<Value, CfError> {
        let path = format!("/v2/user_provided_service_instances/{service_guid}");
        let upsi = self.curl_get(&path).await?;
        upsi.pointer("/entity/credentials")
            .cloned()
            .ok_or_else(|| CfError::Api {
                path,
                body: "response has no `entity.credentials`".to_string(),
            })
    }

    /// Bindings of a user-provided service instance.
    pub async fn upsi_bindings(&self, service_guid: &str) -> Result<Vec<Value>, CfError> {
        let path = format!(
            "/v2/user_provided_service_instances/{service_guid}/service_bindings"
        );
        let response = self.curl_get(&path).await?;
        response
            .pointer("/resources")
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| CfError::Api {
                path,
                body: "response has no `resources` array".to_string(),
            })
    }
}

/// Extract a string field from a JSON document or report which path was
/// malformed.
fn string_at(value: &Value, pointer: &str, api_path: &str) -> Result<String, CfError> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| CfError::Api {
            path: api_path.to_string(),
            body: format!("response has no `{pointer}` string"),
        })
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
