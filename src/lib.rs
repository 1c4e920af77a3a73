pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::CatalogApiClient;
pub use config::{CliConfig, Command};
pub use core::accessory::AccessoryReconciler;
pub use core::group::GroupEditSession;
pub use domain::model::{
    BatchRow, EdgeId, ProductId, ProductRef, ReconcileReport, RelationEdge, RelationRole,
};
pub use domain::ports::{BatchGateway, RelationStore};
pub use utils::error::{CatalogError, Result};
