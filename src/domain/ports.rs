use crate::domain::model::{
    EdgeId, ExportProduct, ImportSummary, PreviewResponse, ProductId, RelationEdge,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Persistence collaborator for relation edges. Deletes and label updates
/// address a single edge; accessory creation is batched because the endpoint
/// accepts multiple targets in one call.
#[async_trait]
pub trait RelationStore: Send + Sync {
    async fn list_accessories(&self, source: ProductId) -> Result<Vec<RelationEdge>>;
    async fn list_related(&self, source: ProductId) -> Result<Vec<RelationEdge>>;
    async fn create_accessories(&self, source: ProductId, targets: &[ProductId]) -> Result<()>;
    async fn create_related(&self, source: ProductId, target: ProductId, label: &str)
        -> Result<()>;
    async fn update_label(&self, edge: EdgeId, label: &str) -> Result<()>;
    async fn delete_edge(&self, edge: EdgeId) -> Result<()>;
}

/// Bulk import/export collaborator. Preview and commit accept the raw file
/// bytes; semantic row validation happens on the collaborator side.
#[async_trait]
pub trait BatchGateway: Send + Sync {
    async fn preview(&self, file: &[u8]) -> Result<PreviewResponse>;
    async fn commit(&self, file: &[u8]) -> Result<ImportSummary>;
    async fn export(&self) -> Result<Vec<ExportProduct>>;
}
