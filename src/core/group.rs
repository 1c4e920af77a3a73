use crate::domain::model::{
    EdgeId, OperationFailure, ProductId, ProductRef, ReconcileReport, RelationEdge,
};
use crate::domain::ports::RelationStore;
use crate::utils::error::{CatalogError, Result};
use futures::future::{join_all, BoxFuture};
use std::collections::HashSet;

/// Identity of a working-list member. Members added during the session have
/// no persisted edge yet, so they carry a locally generated marker instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRef {
    Persisted(EdgeId),
    Pending(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupMember {
    pub member_ref: MemberRef,
    pub target: ProductId,
    pub target_sku: String,
}

/// Three-way diff of a group edit, keyed by target product id (added members
/// have no real edge id, so edge ids cannot key the comparison).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupDiff {
    pub removed: Vec<RelationEdge>,
    pub remaining: Vec<RelationEdge>,
    pub added: Vec<GroupMember>,
}

/// Per-session lifecycle: `Idle -> Editing -> Committing -> {Idle, Editing}`.
/// A fully successful commit spends the session (back to `Idle`, caller
/// re-fetches); a partial failure returns to `Editing` for a retry. There is
/// no distinct terminal failed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Editing,
    Committing,
}

/// One edit session over a relationship-type group. Short-lived and owned by
/// the editing flow: created from freshly fetched edges, dropped on cancel,
/// re-seeded from the store after a successful commit.
#[derive(Debug, Clone)]
pub struct GroupEditSession {
    source: ProductId,
    original_label: String,
    original_members: Vec<RelationEdge>,
    edited_members: Vec<GroupMember>,
    rename: Option<String>,
    state: SessionState,
    next_marker: u64,
}

impl GroupEditSession {
    pub fn begin(source: ProductId, label: &str, members: Vec<RelationEdge>) -> Self {
        let edited_members = members
            .iter()
            .map(|e| GroupMember {
                member_ref: MemberRef::Persisted(e.id),
                target: e.target,
                target_sku: e.target_sku.clone(),
            })
            .collect();

        Self {
            source,
            original_label: label.to_string(),
            original_members: members,
            edited_members,
            rename: None,
            state: SessionState::Editing,
            next_marker: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn original_label(&self) -> &str {
        &self.original_label
    }

    pub fn members(&self) -> &[GroupMember] {
        &self.edited_members
    }

    /// Label the group will carry after commit.
    pub fn effective_label(&self) -> &str {
        self.rename.as_deref().unwrap_or(&self.original_label)
    }

    /// Adds a product to the working list under a pending marker. A target
    /// already present is ignored; one related edge per (source, target).
    pub fn add_member(&mut self, product: &ProductRef) {
        if self.edited_members.iter().any(|m| m.target == product.id) {
            return;
        }
        self.next_marker += 1;
        self.edited_members.push(GroupMember {
            member_ref: MemberRef::Pending(self.next_marker),
            target: product.id,
            target_sku: product.sku.clone(),
        });
    }

    pub fn remove_member(&mut self, target: ProductId) {
        self.edited_members.retain(|m| m.target != target);
    }

    /// Requests a group-wide rename applied to every surviving edge at
    /// commit. A rename always counts as a pending change, even when the new
    /// label equals the original; the enable/disable state of the commit
    /// action relies on that.
    pub fn request_rename(&mut self, new_label: &str) {
        self.rename = Some(new_label.to_string());
    }

    pub fn clear_rename(&mut self) {
        self.rename = None;
    }

    /// Discards the working list. Editing is the only cancellable phase;
    /// once a commit is dispatched its operations run to completion.
    pub fn cancel(self) {
        tracing::debug!(label = %self.original_label, "group edit cancelled");
    }

    pub fn diff(&self) -> GroupDiff {
        let edited_targets: HashSet<ProductId> =
            self.edited_members.iter().map(|m| m.target).collect();
        let original_targets: HashSet<ProductId> =
            self.original_members.iter().map(|e| e.target).collect();

        GroupDiff {
            removed: self
                .original_members
                .iter()
                .filter(|e| !edited_targets.contains(&e.target))
                .cloned()
                .collect(),
            remaining: self
                .original_members
                .iter()
                .filter(|e| edited_targets.contains(&e.target))
                .cloned()
                .collect(),
            added: self
                .edited_members
                .iter()
                .filter(|m| !original_targets.contains(&m.target))
                .cloned()
                .collect(),
        }
    }

    /// Gating rule for the commit action: a requested rename is always a
    /// pending change, otherwise membership must differ from the original.
    pub fn has_pending_changes(&self) -> bool {
        if self.rename.is_some() {
            return true;
        }
        let diff = self.diff();
        !diff.removed.is_empty() || !diff.added.is_empty()
    }

    /// Applies the edit: deletes for removed members, label updates for the
    /// survivors when renaming, creates for added members. All operations
    /// are dispatched concurrently and settle before the commit resolves;
    /// there is no rollback, partially applied operations stay applied.
    ///
    /// On full success the session is spent and the caller re-fetches the
    /// group; on partial failure it returns to `Editing` so the user may
    /// retry after a `refresh`.
    pub async fn commit<S: RelationStore>(&mut self, store: &S) -> Result<ReconcileReport> {
        if let Some(new_label) = &self.rename {
            if new_label.trim().is_empty() {
                return Err(CatalogError::validation(
                    "group label cannot be empty or whitespace-only",
                ));
            }
        }

        // A spent session holds stale original members; re-committing it
        // would replay the applied operations.
        if self.state == SessionState::Idle {
            tracing::debug!(label = %self.original_label, "session already committed");
            return Ok(ReconcileReport::default());
        }

        if !self.has_pending_changes() {
            tracing::debug!(label = %self.original_label, "no pending changes, nothing to commit");
            return Ok(ReconcileReport::default());
        }

        self.state = SessionState::Committing;
        let diff = self.diff();
        let target_label = self.effective_label().to_string();

        tracing::debug!(
            source = self.source.0,
            label = %self.original_label,
            removed = diff.removed.len(),
            remaining = diff.remaining.len(),
            added = diff.added.len(),
            renaming = self.rename.is_some(),
            "committing group edit"
        );

        let mut ops: Vec<(String, BoxFuture<'_, Result<()>>)> = Vec::new();

        for edge in &diff.removed {
            ops.push((
                format!("delete edge {}", edge.id.0),
                Box::pin(store.delete_edge(edge.id)),
            ));
        }
        if self.rename.is_some() {
            for edge in &diff.remaining {
                ops.push((
                    format!("relabel edge {}", edge.id.0),
                    Box::pin(store.update_label(edge.id, &target_label)),
                ));
            }
        }
        for member in &diff.added {
            ops.push((
                format!("create edge to product {}", member.target.0),
                Box::pin(store.create_related(self.source, member.target, &target_label)),
            ));
        }

        let mut report = ReconcileReport {
            attempted: ops.len(),
            ..Default::default()
        };

        let (labels, futures): (Vec<_>, Vec<_>) = ops.into_iter().unzip();
        for (label, result) in labels.into_iter().zip(join_all(futures).await) {
            match result {
                Ok(()) => report.succeeded += 1,
                Err(e) => {
                    tracing::warn!(operation = %label, error = %e, "group operation failed");
                    report.failures.push(OperationFailure {
                        operation: label,
                        error: e.to_string(),
                    });
                }
            }
        }

        if report.is_full_success() {
            tracing::info!(label = %target_label, %report, "group commit complete");
            self.state = SessionState::Idle;
        } else {
            tracing::warn!(label = %target_label, %report, "group commit partially failed");
            self.state = SessionState::Editing;
        }

        Ok(report)
    }

    /// Re-seeds the session from the source of truth after a partial commit,
    /// keeping the user's working list intact where targets still apply.
    pub async fn refresh<S: RelationStore>(&mut self, store: &S) -> Result<()> {
        let label = self.effective_label().to_string();
        let related = store.list_related(self.source).await?;
        self.original_members = related
            .into_iter()
            .filter(|e| e.type_label.as_deref() == Some(label.as_str()))
            .collect();
        self.original_label = label;
        self.rename = None;

        // Re-key survivors to their persisted edges; keep pending adds.
        let persisted: Vec<GroupMember> = self
            .original_members
            .iter()
            .map(|e| GroupMember {
                member_ref: MemberRef::Persisted(e.id),
                target: e.target,
                target_sku: e.target_sku.clone(),
            })
            .collect();
        let persisted_targets: HashSet<ProductId> = persisted.iter().map(|m| m.target).collect();
        let mut members = persisted;
        members.extend(
            self.edited_members
                .iter()
                .filter(|m| {
                    matches!(m.member_ref, MemberRef::Pending(_))
                        && !persisted_targets.contains(&m.target)
                })
                .cloned(),
        );
        self.edited_members = members;
        self.state = SessionState::Editing;
        Ok(())
    }
}
