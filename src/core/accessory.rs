use crate::domain::model::{
    OperationFailure, ProductId, ReconcileReport, RelationEdge,
};
use crate::domain::ports::RelationStore;
use crate::utils::error::Result;
use futures::future::join_all;
use std::collections::HashSet;

/// Minimal operation set to move a product's accessory edges to the desired
/// target set: one delete per stale edge, one batched create for the rest.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccessoryPlan {
    pub to_remove: Vec<RelationEdge>,
    pub to_add: Vec<ProductId>,
}

impl AccessoryPlan {
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }
}

/// Two-way set diff keyed by target product id. Desired order is preserved
/// in `to_add` so the batched create carries targets as the user picked them.
pub fn plan(current: &[RelationEdge], desired: &[ProductId]) -> AccessoryPlan {
    let desired_set: HashSet<ProductId> = desired.iter().copied().collect();
    let current_set: HashSet<ProductId> = current.iter().map(|e| e.target).collect();

    AccessoryPlan {
        to_remove: current
            .iter()
            .filter(|e| !desired_set.contains(&e.target))
            .cloned()
            .collect(),
        to_add: desired
            .iter()
            .copied()
            .filter(|p| !current_set.contains(p))
            .collect(),
    }
}

pub struct AccessoryReconciler<S: RelationStore> {
    store: S,
}

/// Report plus the re-fetched accessory list; the collaborator stays the
/// source of truth, so the edge list is never derived from applied deltas.
#[derive(Debug)]
pub struct AccessoryOutcome {
    pub report: ReconcileReport,
    pub current: Vec<RelationEdge>,
}

impl<S: RelationStore> AccessoryReconciler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Applies the diff between the persisted accessory set and `desired`.
    /// Deletes go out one call per edge; additions go out in a single
    /// batched create (the create endpoint accepts multiple targets, the
    /// delete endpoint only one). All calls are dispatched concurrently and
    /// failures are counted, never short-circuited.
    pub async fn reconcile(
        &self,
        source: ProductId,
        desired: &[ProductId],
    ) -> Result<AccessoryOutcome> {
        let current = self.store.list_accessories(source).await?;
        let plan = plan(&current, desired);

        tracing::debug!(
            source = source.0,
            removing = plan.to_remove.len(),
            adding = plan.to_add.len(),
            "reconciling accessories"
        );

        let mut report = ReconcileReport::default();

        if !plan.is_empty() {
            let mut ops: Vec<(String, futures::future::BoxFuture<'_, Result<()>>)> = Vec::new();
            for edge in &plan.to_remove {
                ops.push((
                    format!("delete accessory edge {}", edge.id.0),
                    Box::pin(self.store.delete_edge(edge.id)),
                ));
            }
            if !plan.to_add.is_empty() {
                ops.push((
                    format!("add {} accessories", plan.to_add.len()),
                    Box::pin(self.store.create_accessories(source, &plan.to_add)),
                ));
            }

            report.attempted = ops.len();
            let (labels, futures): (Vec<_>, Vec<_>) = ops.into_iter().unzip();
            for (label, result) in labels.into_iter().zip(join_all(futures).await) {
                match result {
                    Ok(()) => report.succeeded += 1,
                    Err(e) => {
                        tracing::warn!(operation = %label, error = %e, "accessory operation failed");
                        report.failures.push(OperationFailure {
                            operation: label,
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        // Refresh from the collaborator even after partial failure.
        let current = self.store.list_accessories(source).await?;
        Ok(AccessoryOutcome { report, current })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{EdgeId, RelationRole};
    use crate::utils::error::CatalogError;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    fn accessory(id: i64, target: i64) -> RelationEdge {
        RelationEdge {
            id: EdgeId(id),
            source: ProductId(1),
            target: ProductId(target),
            target_sku: format!("SKU-{}", target),
            role: RelationRole::Accessory,
            type_label: None,
        }
    }

    #[derive(Clone, Default)]
    struct MockStore {
        edges: Arc<Mutex<Vec<RelationEdge>>>,
        calls: Arc<Mutex<Vec<String>>>,
        failing_edges: Arc<Mutex<HashSet<i64>>>,
        next_id: Arc<Mutex<i64>>,
    }

    impl MockStore {
        fn with_edges(edges: Vec<RelationEdge>) -> Self {
            Self {
                edges: Arc::new(Mutex::new(edges)),
                next_id: Arc::new(Mutex::new(100)),
                ..Default::default()
            }
        }

        async fn fail_delete_of(&self, edge: i64) {
            self.failing_edges.lock().await.insert(edge);
        }

        async fn calls(&self) -> Vec<String> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl RelationStore for MockStore {
        async fn list_accessories(&self, source: ProductId) -> Result<Vec<RelationEdge>> {
            Ok(self
                .edges
                .lock()
                .await
                .iter()
                .filter(|e| e.source == source && e.role == RelationRole::Accessory)
                .cloned()
                .collect())
        }

        async fn list_related(&self, source: ProductId) -> Result<Vec<RelationEdge>> {
            Ok(self
                .edges
                .lock()
                .await
                .iter()
                .filter(|e| e.source == source && e.role == RelationRole::Related)
                .cloned()
                .collect())
        }

        async fn create_accessories(
            &self,
            source: ProductId,
            targets: &[ProductId],
        ) -> Result<()> {
            self.calls.lock().await.push(format!(
                "create_accessories({:?})",
                targets.iter().map(|t| t.0).collect::<Vec<_>>()
            ));
            let mut edges = self.edges.lock().await;
            let mut next_id = self.next_id.lock().await;
            for target in targets {
                *next_id += 1;
                edges.push(RelationEdge {
                    id: EdgeId(*next_id),
                    source,
                    target: *target,
                    target_sku: format!("SKU-{}", target.0),
                    role: RelationRole::Accessory,
                    type_label: None,
                });
            }
            Ok(())
        }

        async fn create_related(
            &self,
            _source: ProductId,
            _target: ProductId,
            _label: &str,
        ) -> Result<()> {
            unimplemented!("not used by the accessory reconciler")
        }

        async fn update_label(&self, _edge: EdgeId, _label: &str) -> Result<()> {
            unimplemented!("not used by the accessory reconciler")
        }

        async fn delete_edge(&self, edge: EdgeId) -> Result<()> {
            self.calls.lock().await.push(format!("delete_edge({})", edge.0));
            if self.failing_edges.lock().await.contains(&edge.0) {
                return Err(CatalogError::UnexpectedResponseError {
                    message: "delete rejected".to_string(),
                });
            }
            self.edges.lock().await.retain(|e| e.id != edge);
            Ok(())
        }
    }

    #[test]
    fn test_plan_is_minimal() {
        // current {A,B,C}, desired {B,C,D}: one delete, one add of [D].
        let current = vec![accessory(1, 10), accessory(2, 11), accessory(3, 12)];
        let desired = vec![ProductId(11), ProductId(12), ProductId(13)];

        let plan = plan(&current, &desired);

        assert_eq!(plan.to_remove.len(), 1);
        assert_eq!(plan.to_remove[0].id, EdgeId(1));
        assert_eq!(plan.to_add, vec![ProductId(13)]);
    }

    #[test]
    fn test_plan_no_changes() {
        let current = vec![accessory(1, 10)];
        assert!(plan(&current, &[ProductId(10)]).is_empty());
    }

    #[test]
    fn test_plan_preserves_desired_order() {
        let plan = plan(&[], &[ProductId(30), ProductId(10), ProductId(20)]);
        assert_eq!(
            plan.to_add,
            vec![ProductId(30), ProductId(10), ProductId(20)]
        );
    }

    #[tokio::test]
    async fn test_reconcile_issues_one_delete_and_one_batched_add() {
        let store = MockStore::with_edges(vec![
            accessory(1, 10),
            accessory(2, 11),
            accessory(3, 12),
        ]);
        let reconciler = AccessoryReconciler::new(store.clone());

        let outcome = reconciler
            .reconcile(ProductId(1), &[ProductId(11), ProductId(12), ProductId(13)])
            .await
            .unwrap();

        assert_eq!(outcome.report.attempted, 2);
        assert!(outcome.report.is_full_success());

        let calls = store.calls().await;
        assert_eq!(calls.len(), 2);
        assert!(calls.contains(&"delete_edge(1)".to_string()));
        assert!(calls.contains(&"create_accessories([13])".to_string()));

        // Refreshed from the store, not derived from the deltas.
        let mut targets: Vec<i64> = outcome.current.iter().map(|e| e.target.0).collect();
        targets.sort();
        assert_eq!(targets, vec![11, 12, 13]);
    }

    #[tokio::test]
    async fn test_reconcile_no_changes_makes_no_mutation_calls() {
        let store = MockStore::with_edges(vec![accessory(1, 10)]);
        let reconciler = AccessoryReconciler::new(store.clone());

        let outcome = reconciler.reconcile(ProductId(1), &[ProductId(10)]).await.unwrap();

        assert_eq!(outcome.report.attempted, 0);
        assert!(outcome.report.is_full_success());
        assert!(store.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_partial_failure_is_surfaced() {
        let store = MockStore::with_edges(vec![accessory(1, 10), accessory(2, 11)]);
        store.fail_delete_of(1).await;
        let reconciler = AccessoryReconciler::new(store.clone());

        let outcome = reconciler
            .reconcile(ProductId(1), &[ProductId(12)])
            .await
            .unwrap();

        assert_eq!(outcome.report.attempted, 3);
        assert_eq!(outcome.report.succeeded, 2);
        assert!(outcome.report.is_partial());
        assert!(!outcome.report.is_full_success());
        assert_eq!(outcome.report.failures.len(), 1);
        assert!(outcome.report.failures[0].operation.contains("edge 1"));

        // The failed delete leaves its edge behind; the add still landed.
        let targets: HashSet<i64> = outcome.current.iter().map(|e| e.target.0).collect();
        assert!(targets.contains(&10));
        assert!(targets.contains(&12));
        assert!(!targets.contains(&11));
    }
}
