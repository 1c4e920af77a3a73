pub mod accessory;
pub mod codec;
pub mod flatten;
pub mod group;

pub use crate::domain::model::{
    BatchRow, ProductId, ReconcileReport, RelatedGroup, RelationEdge,
};
pub use crate::domain::ports::{BatchGateway, RelationStore};
pub use crate::utils::error::Result;
