//! HTTP implementation of [`PlatformClient`] against the Shopify Admin
//! GraphQL API.

use std::time::Duration;

use async_trait::async_trait;
use relay_core::models::MediaKind;
use relay_core::RelayConfig;
use tokio_util::sync::CancellationToken;

use crate::error::ShopifyError;
use crate::traits::PlatformClient;
use crate::types::{
    extract_ready_url, BlobUpload, CreatedFile, FileReadiness, StagedTarget, StagedUploadRequest,
};

const STAGED_UPLOADS_CREATE: &str = r#"
mutation stagedUploadsCreate($input: [StagedUploadInput!]!) {
  stagedUploadsCreate(input: $input) {
    stagedTargets {
      url
      resourceUrl
      parameters { name value }
    }
    userErrors { field message }
  }
}"#;

const FILE_CREATE: &str = r#"
mutation fileCreate($files: [FileCreateInput!]!) {
  fileCreate(files: $files) {
    files {
      id
      fileStatus
      ... on MediaImage { image { url } }
      ... on GenericFile { url }
    }
    userErrors { field message }
  }
}"#;

const FILE_STATUS: &str = r#"
query fileStatus($id: ID!) {
  node(id: $id) {
    ... on MediaImage { fileStatus image { url } }
    ... on Video { fileStatus sources { url } }
    ... on GenericFile { fileStatus url }
  }
}"#;

/// Admin API client holding the server-side access token.
#[derive(Clone)]
pub struct ShopifyClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl ShopifyClient {
    pub fn new(config: &RelayConfig) -> Result<Self, ShopifyError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            http,
            endpoint: config.graphql_endpoint(),
            access_token: config.shopify_access_token.clone(),
        })
    }

    /// Run a GraphQL operation, racing it against the cancellation token.
    async fn graphql(
        &self,
        query: &str,
        variables: serde_json::Value,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value, ShopifyError> {
        let request = async {
            let mut response = self.execute(serde_json::json!({
                "query": query,
                "variables": variables,
            }))
            .await?;

            if let Some(errors) = response.get("errors").filter(|e| !e.is_null()) {
                return Err(ShopifyError::Api(errors.to_string()));
            }
            response
                .get_mut("data")
                .map(serde_json::Value::take)
                .ok_or_else(|| ShopifyError::InvalidResponse("response has no data".to_string()))
        };

        tokio::select! {
            _ = cancel.cancelled() => Err(ShopifyError::Cancelled),
            result = request => result,
        }
    }

    async fn execute(&self, body: serde_json::Value) -> Result<serde_json::Value, ShopifyError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("X-Shopify-Access-Token", &self.access_token)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let value: serde_json::Value = response.json().await?;
        if !status.is_success() {
            return Err(ShopifyError::Api(format!("HTTP {}: {}", status, value)));
        }
        Ok(value)
    }
}

/// Fail on a non-empty `userErrors` array.
fn check_user_errors(payload: &serde_json::Value) -> Result<(), ShopifyError> {
    if let Some(errors) = payload.get("userErrors").and_then(|e| e.as_array()) {
        if !errors.is_empty() {
            let messages: Vec<String> = errors
                .iter()
                .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
                .map(str::to_string)
                .collect();
            return Err(ShopifyError::Api(messages.join("; ")));
        }
    }
    Ok(())
}

#[async_trait]
impl PlatformClient for ShopifyClient {
    #[tracing::instrument(skip(self, cancel), fields(filename = %request.filename, resource = %request.resource))]
    async fn staged_uploads_create(
        &self,
        request: StagedUploadRequest,
        cancel: &CancellationToken,
    ) -> Result<StagedTarget, ShopifyError> {
        let variables = serde_json::json!({ "input": [request] });
        let data = self.graphql(STAGED_UPLOADS_CREATE, variables, cancel).await?;

        let payload = &data["stagedUploadsCreate"];
        check_user_errors(payload)?;

        let target = payload
            .get("stagedTargets")
            .and_then(|t| t.get(0))
            .cloned()
            .ok_or(ShopifyError::NoStagedTarget)?;
        let target: StagedTarget = serde_json::from_value(target)
            .map_err(|e| ShopifyError::InvalidResponse(format!("staged target: {}", e)))?;

        tracing::debug!(resource_url = %target.resource_url, "Staged upload target created");
        Ok(target)
    }

    #[tracing::instrument(skip(self, blob, cancel), fields(url = %target.url, size = blob.bytes.len()))]
    async fn upload_to_target(
        &self,
        target: &StagedTarget,
        blob: BlobUpload,
        cancel: &CancellationToken,
    ) -> Result<(), ShopifyError> {
        // The target's parameters must precede the file part in the form.
        let mut form = reqwest::multipart::Form::new();
        for parameter in &target.parameters {
            form = form.text(parameter.name.clone(), parameter.value.clone());
        }
        let part = reqwest::multipart::Part::bytes(blob.bytes)
            .file_name(blob.filename)
            .mime_str(&blob.mime_type)?;
        form = form.part("file", part);

        let request = async {
            let response = self.http.post(&target.url).multipart(form).send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ShopifyError::BlobRejected {
                    status: status.as_u16(),
                    body,
                });
            }
            Ok(())
        };

        tokio::select! {
            _ = cancel.cancelled() => Err(ShopifyError::Cancelled),
            result = request => result,
        }
    }

    #[tracing::instrument(skip(self, cancel), fields(kind = %kind.as_str()))]
    async fn file_create(
        &self,
        resource_url: &str,
        kind: MediaKind,
        alt: &str,
        cancel: &CancellationToken,
    ) -> Result<CreatedFile, ShopifyError> {
        let variables = serde_json::json!({
            "files": [{
                "alt": alt,
                "contentType": kind.content_category(),
                "originalSource": resource_url,
            }]
        });
        let data = self.graphql(FILE_CREATE, variables, cancel).await?;

        let payload = &data["fileCreate"];
        check_user_errors(payload)?;

        let file = payload
            .get("files")
            .and_then(|f| f.get(0))
            .ok_or(ShopifyError::MissingFileId)?;
        let id = file.get("id").and_then(|i| i.as_str()).map(str::to_string);
        // Some kinds come back resolved immediately; in that case the caller
        // skips polling.
        let ready_url = extract_ready_url(kind, file).ok();
        if id.is_none() && ready_url.is_none() {
            return Err(ShopifyError::MissingFileId);
        }

        tracing::debug!(file_id = ?id, resolved = ready_url.is_some(), "File registered");
        Ok(CreatedFile { id, ready_url })
    }

    #[tracing::instrument(skip(self, cancel), fields(kind = %kind.as_str()))]
    async fn file_status(
        &self,
        file_id: &str,
        kind: MediaKind,
        cancel: &CancellationToken,
    ) -> Result<FileReadiness, ShopifyError> {
        let variables = serde_json::json!({ "id": file_id });
        let data = self.graphql(FILE_STATUS, variables, cancel).await?;

        let node = data
            .get("node")
            .filter(|n| !n.is_null())
            .ok_or_else(|| ShopifyError::InvalidResponse("node not found".to_string()))?;
        let status = node
            .get("fileStatus")
            .and_then(|s| s.as_str())
            .unwrap_or("PROCESSING");

        match status {
            "READY" => Ok(FileReadiness::Ready(extract_ready_url(kind, node)?)),
            "FAILED" => Ok(FileReadiness::Failed(format!(
                "platform reported processing failure for {}",
                file_id
            ))),
            _ => Ok(FileReadiness::Processing),
        }
    }

    async fn proxy(&self, body: serde_json::Value) -> Result<serde_json::Value, ShopifyError> {
        // Verbatim passthrough: whatever JSON the platform answers with,
        // including GraphQL errors, belongs to the caller. Only transport
        // failures surface as relay errors.
        let response = self
            .http
            .post(&self.endpoint)
            .header("X-Shopify-Access-Token", &self.access_token)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;
        Ok(response.json().await?)
    }
}
