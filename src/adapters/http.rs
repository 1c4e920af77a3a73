use crate::domain::model::{
    EdgeId, ExportProduct, ImportSummary, PreviewResponse, ProductId, RelationEdge,
};
use crate::domain::ports::{BatchGateway, RelationStore};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

/// Reqwest-backed client for the catalog collaborator API, implementing both
/// the relation-edge port and the bulk import/export port.
#[derive(Debug, Clone)]
pub struct CatalogApiClient {
    base_url: String,
    client: Client,
}

impl CatalogApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn list_relations(&self, source: ProductId, role: &str) -> Result<Vec<RelationEdge>> {
        let url = self.url(&format!("/products/{}/relations", source.0));
        tracing::debug!(%url, role, "listing relations");
        let response = self
            .client
            .get(&url)
            .query(&[("role", role)])
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl RelationStore for CatalogApiClient {
    async fn list_accessories(&self, source: ProductId) -> Result<Vec<RelationEdge>> {
        self.list_relations(source, "accessory").await
    }

    async fn list_related(&self, source: ProductId) -> Result<Vec<RelationEdge>> {
        self.list_relations(source, "related").await
    }

    async fn create_accessories(&self, source: ProductId, targets: &[ProductId]) -> Result<()> {
        let url = self.url(&format!("/products/{}/accessories", source.0));
        tracing::debug!(%url, count = targets.len(), "creating accessories");
        self.client
            .post(&url)
            .json(&json!({ "target_ids": targets }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn create_related(
        &self,
        source: ProductId,
        target: ProductId,
        label: &str,
    ) -> Result<()> {
        let url = self.url(&format!("/products/{}/related", source.0));
        tracing::debug!(%url, target = target.0, label, "creating related edge");
        self.client
            .post(&url)
            .json(&json!({ "target_id": target, "type_label": label }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn update_label(&self, edge: EdgeId, label: &str) -> Result<()> {
        let url = self.url(&format!("/relations/{}", edge.0));
        tracing::debug!(%url, label, "updating edge label");
        self.client
            .patch(&url)
            .json(&json!({ "type_label": label }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn delete_edge(&self, edge: EdgeId) -> Result<()> {
        let url = self.url(&format!("/relations/{}", edge.0));
        tracing::debug!(%url, "deleting edge");
        self.client
            .delete(&url)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl BatchGateway for CatalogApiClient {
    async fn preview(&self, file: &[u8]) -> Result<PreviewResponse> {
        let url = self.url("/import/preview");
        tracing::debug!(%url, bytes = file.len(), "requesting import preview");
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "text/csv; charset=utf-8")
            .body(file.to_vec())
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn commit(&self, file: &[u8]) -> Result<ImportSummary> {
        let url = self.url("/import/commit");
        tracing::debug!(%url, bytes = file.len(), "committing import");
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "text/csv; charset=utf-8")
            .body(file.to_vec())
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn export(&self) -> Result<Vec<ExportProduct>> {
        let url = self.url("/export/products");
        tracing::debug!(%url, "fetching export data");
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}
