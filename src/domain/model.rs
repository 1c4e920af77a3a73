use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationRole {
    Accessory,
    Related,
}

/// A directed link from a source product to a target product.
///
/// `type_label` is present only for `Related` edges; accessory edges carry
/// no label. The collaborator guarantees at most one accessory edge per
/// (source, target) and at most one related edge per (source, target)
/// regardless of label, so relabeling moves a product between groups rather
/// than duplicating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationEdge {
    pub id: EdgeId,
    #[serde(rename = "source_product_id")]
    pub source: ProductId,
    #[serde(rename = "target_product_id")]
    pub target: ProductId,
    #[serde(default)]
    pub target_sku: String,
    pub role: RelationRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: ProductId,
    pub sku: String,
}

/// A derived view over the `related` edges of one source product: all edges
/// sharing one type label. Groups are never stored or mutated directly; only
/// individual edges are, and the grouping is recomputed from the edge list.
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedGroup {
    pub label: String,
    pub members: Vec<RelationEdge>,
}

/// Groups `related` edges by label, preserving first-seen label order and the
/// member order the collaborator returned. Edges without a label (which the
/// collaborator should never produce for `related`) are skipped.
pub fn group_by_label(edges: &[RelationEdge]) -> Vec<RelatedGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut by_label: HashMap<String, Vec<RelationEdge>> = HashMap::new();

    for edge in edges {
        if edge.role != RelationRole::Related {
            continue;
        }
        let Some(label) = edge.type_label.as_deref() else {
            continue;
        };
        if !by_label.contains_key(label) {
            order.push(label.to_string());
        }
        by_label
            .entry(label.to_string())
            .or_default()
            .push(edge.clone());
    }

    order
        .into_iter()
        .map(|label| {
            let members = by_label.remove(&label).unwrap_or_default();
            RelatedGroup { label, members }
        })
        .collect()
}

/// One flat import/export row. Field order mirrors the wire schema; list
/// fields stay structured here and are only joined/quoted by the codec.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchRow {
    pub sku: String,
    pub nombre: String,
    pub descripcion: String,
    pub marca: String,
    pub categoria: String,
    pub subcategoria: String,
    pub precio: String,
    pub stock: String,
    pub stock_minimo: String,
    pub peso: String,
    pub dimensiones: String,
    pub imagen: String,
    pub caracteristicas: Vec<String>,
    pub aplicaciones: Vec<String>,
    pub accesorios: Vec<String>,
    pub productos_relacionados: Vec<(String, String)>,
}

/// Aggregate outcome of one reconciliation commit. Best-effort: operations
/// that succeeded stay applied even when others fail, so callers must check
/// the counts rather than a boolean.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReconcileReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<OperationFailure>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationFailure {
    pub operation: String,
    pub error: String,
}

impl ReconcileReport {
    pub fn is_full_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty() && self.succeeded > 0
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} operations completed",
            self.succeeded, self.attempted
        )
    }
}

/// Response of the collaborator's preview/validate call. Semantic row
/// validation lives entirely on that side; we only type the contract.
#[derive(Debug, Clone, Deserialize)]
pub struct PreviewResponse {
    pub preview: Vec<serde_json::Value>,
    pub validation_errors: Vec<String>,
    pub can_import: bool,
    pub total_rows: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportSummary {
    pub counts: HashMap<String, EntityCounts>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct EntityCounts {
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub updated: u64,
}

/// One product as returned by the collaborator's export call, with relations
/// already joined. This is the input shape of the flattener.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportProduct {
    pub id: ProductId,
    pub sku: String,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: String,
    #[serde(default)]
    pub marca: String,
    #[serde(default)]
    pub categoria: String,
    #[serde(default)]
    pub subcategoria: String,
    #[serde(default)]
    pub precio: String,
    #[serde(default)]
    pub stock: String,
    #[serde(default)]
    pub stock_minimo: String,
    #[serde(default)]
    pub peso: String,
    #[serde(default)]
    pub dimensiones: String,
    #[serde(default)]
    pub imagen: String,
    #[serde(default)]
    pub caracteristicas: Vec<String>,
    #[serde(default)]
    pub aplicaciones: Vec<String>,
    #[serde(default)]
    pub accesorios: Vec<ProductRef>,
    #[serde(default)]
    pub productos_relacionados: Vec<RelatedRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelatedRef {
    pub sku: String,
    #[serde(rename = "type_label")]
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn related(id: i64, target: i64, label: &str) -> RelationEdge {
        RelationEdge {
            id: EdgeId(id),
            source: ProductId(1),
            target: ProductId(target),
            target_sku: format!("SKU-{}", target),
            role: RelationRole::Related,
            type_label: Some(label.to_string()),
        }
    }

    #[test]
    fn test_group_by_label_preserves_order() {
        let edges = vec![
            related(1, 10, "Compatibles"),
            related(2, 11, "Repuestos"),
            related(3, 12, "Compatibles"),
        ];

        let groups = group_by_label(&edges);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "Compatibles");
        assert_eq!(groups[0].members.len(), 2);
        assert_eq!(groups[0].members[0].target, ProductId(10));
        assert_eq!(groups[0].members[1].target, ProductId(12));
        assert_eq!(groups[1].label, "Repuestos");
        assert_eq!(groups[1].members.len(), 1);
    }

    #[test]
    fn test_group_by_label_skips_accessories() {
        let mut accessory = related(1, 10, "ignored");
        accessory.role = RelationRole::Accessory;
        accessory.type_label = None;

        let groups = group_by_label(&[accessory, related(2, 11, "Kits")]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, "Kits");
    }

    #[test]
    fn test_report_display_counts() {
        let report = ReconcileReport {
            attempted: 4,
            succeeded: 3,
            failures: vec![OperationFailure {
                operation: "delete edge 7".to_string(),
                error: "boom".to_string(),
            }],
        };

        assert_eq!(report.to_string(), "3 of 4 operations completed");
        assert!(!report.is_full_success());
        assert!(report.is_partial());
    }

    #[test]
    fn test_empty_report_is_trivial_success() {
        let report = ReconcileReport::default();
        assert!(report.is_full_success());
        assert!(!report.is_partial());
    }
}
