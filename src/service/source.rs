//! JSON HTTP page source

use super::extract::{extract_cursor, extract_items};
use super::request::ListRequest;
use crate::catalog::{OperationDefinition, ServiceDefinition};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::{HttpClient, JsonRequest};
use crate::pagination::{Page, PageFetcher, PageSizeBounds};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Fetches pages of one listing operation over HTTP
///
/// Holds everything needed to reach the service (client, endpoint,
/// credentials) so the fetcher itself never touches ambient state.
pub struct JsonPageSource {
    client: Arc<HttpClient>,
    operation: OperationDefinition,
    headers: HashMap<String, String>,
}

impl JsonPageSource {
    /// Build a source from the client configuration
    pub fn new(
        config: &ClientConfig,
        service: &ServiceDefinition,
        operation: &OperationDefinition,
    ) -> Result<Self> {
        let base_url = config.resolve_endpoint(&service.endpoint)?;
        debug!(
            "Resolved endpoint for {}/{}: {}",
            service.service, operation.name, base_url
        );
        let client = HttpClient::new(config.http_client_config(base_url))?;
        Ok(Self::with_client(Arc::new(client), service, operation))
    }

    /// Build a source on top of an existing client
    pub fn with_client(
        client: Arc<HttpClient>,
        service: &ServiceDefinition,
        operation: &OperationDefinition,
    ) -> Self {
        let mut headers = service.headers.clone();
        if let Some(target) = service.target_for(operation) {
            headers.insert("X-Amz-Target".to_string(), target);
        }

        Self {
            client,
            operation: operation.clone(),
            headers,
        }
    }

    /// The operation this source fetches
    pub fn operation(&self) -> &OperationDefinition {
        &self.operation
    }

    /// Page-size bounds of the operation
    pub fn bounds(&self) -> Option<PageSizeBounds> {
        self.operation.page_size_bounds()
    }

    /// Build a request template from `NAME=VALUE` filter assignments
    pub fn request<S: AsRef<str>>(&self, filters: &[S]) -> Result<ListRequest> {
        ListRequest::from_assignments(&self.operation, filters)
    }

    /// Turn a response body into a page
    pub fn parse_page(&self, body: &Value) -> Result<Page<Value>> {
        let items = extract_items(body, &self.operation.items_path)?;
        let next = extract_cursor(body, &self.operation.cursor.response_path)?;
        Ok(Page::new(items, next))
    }
}

#[async_trait]
impl PageFetcher<ListRequest> for JsonPageSource {
    type Item = Value;

    async fn fetch_page(&self, request: &ListRequest) -> Result<Page<Value>> {
        let rendered = request.render(&self.operation)?;

        let call = JsonRequest {
            method: rendered.method.into(),
            path: rendered.path,
            query: rendered.query,
            headers: self.headers.clone(),
            body: rendered.body,
        };
        let body = self.client.request_json(&call).await?;

        let page = self.parse_page(&body)?;
        debug!(
            "{}: {} item(s), more pages: {}",
            self.operation.name,
            page.len(),
            page.has_more()
        );
        Ok(page)
    }
}

impl std::fmt::Debug for JsonPageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonPageSource")
            .field("operation", &self.operation.name)
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}
