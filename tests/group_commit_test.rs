use catalog_relations::core::group::SessionState;
use catalog_relations::{
    CatalogApiClient, EdgeId, GroupEditSession, ProductId, ProductRef, RelationEdge, RelationRole,
    RelationStore,
};
use httpmock::prelude::*;
use serde_json::json;

fn related_edge(id: i64, target: i64, label: &str) -> RelationEdge {
    RelationEdge {
        id: EdgeId(id),
        source: ProductId(1),
        target: ProductId(target),
        target_sku: format!("SKU-{}", target),
        role: RelationRole::Related,
        type_label: Some(label.to_string()),
    }
}

#[tokio::test]
async fn test_group_commit_over_http() {
    let server = MockServer::start();

    // original [X=10, Y=11] under "Compatibles"; edit to [Y, Z=12] with a
    // rename to "Equivalentes".
    let delete_mock = server.mock(|when, then| {
        when.method(DELETE).path("/relations/1");
        then.status(204);
    });

    let relabel_mock = server.mock(|when, then| {
        when.method(httpmock::Method::PATCH)
            .path("/relations/2")
            .json_body(json!({ "type_label": "Equivalentes" }));
        then.status(200);
    });

    let create_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/products/1/related")
            .json_body(json!({ "target_id": 12, "type_label": "Equivalentes" }));
        then.status(201);
    });

    let client = CatalogApiClient::new(server.base_url());
    let mut session = GroupEditSession::begin(
        ProductId(1),
        "Compatibles",
        vec![
            related_edge(1, 10, "Compatibles"),
            related_edge(2, 11, "Compatibles"),
        ],
    );
    session.remove_member(ProductId(10));
    session.add_member(&ProductRef {
        id: ProductId(12),
        sku: "SKU-12".to_string(),
    });
    session.request_rename("Equivalentes");

    let report = session.commit(&client).await.unwrap();

    assert_eq!(report.attempted, 3);
    assert!(report.is_full_success());
    delete_mock.assert();
    relabel_mock.assert();
    create_mock.assert();
}

#[tokio::test]
async fn test_partial_failure_returns_to_editing_and_refresh_reseeds() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(DELETE).path("/relations/1");
        then.status(204);
    });

    // The create fails; the delete stays applied.
    server.mock(|when, then| {
        when.method(POST).path("/products/1/related");
        then.status(500);
    });

    // State after the partial commit: only Y remains persisted.
    let list_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/products/1/relations")
            .query_param("role", "related");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!([{
                "id": 2,
                "source_product_id": 1,
                "target_product_id": 11,
                "target_sku": "SKU-11",
                "role": "related",
                "type_label": "Compatibles"
            }]));
    });

    let client = CatalogApiClient::new(server.base_url());
    let mut session = GroupEditSession::begin(
        ProductId(1),
        "Compatibles",
        vec![
            related_edge(1, 10, "Compatibles"),
            related_edge(2, 11, "Compatibles"),
        ],
    );
    session.remove_member(ProductId(10));
    session.add_member(&ProductRef {
        id: ProductId(12),
        sku: "SKU-12".to_string(),
    });

    let report = session.commit(&client).await.unwrap();

    assert_eq!(report.attempted, 2);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.to_string(), "1 of 2 operations completed");
    assert_eq!(session.state(), SessionState::Editing);

    session.refresh(&client).await.unwrap();
    list_mock.assert();

    // Persisted membership reflects the store; the failed add is still a
    // pending member the user may retry.
    let targets: Vec<i64> = session.members().iter().map(|m| m.target.0).collect();
    assert_eq!(targets, vec![11, 12]);
    assert!(session.has_pending_changes());
}

#[tokio::test]
async fn test_session_edges_can_come_from_live_listing() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET)
            .path("/products/1/relations")
            .query_param("role", "related");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!([
                {
                    "id": 5,
                    "source_product_id": 1,
                    "target_product_id": 20,
                    "target_sku": "SKU-20",
                    "role": "related",
                    "type_label": "Repuestos"
                },
                {
                    "id": 6,
                    "source_product_id": 1,
                    "target_product_id": 21,
                    "target_sku": "SKU-21",
                    "role": "related",
                    "type_label": "Kits"
                }
            ]));
    });

    let client = CatalogApiClient::new(server.base_url());
    let edges = client.list_related(ProductId(1)).await.unwrap();
    let groups = catalog_relations::domain::model::group_by_label(&edges);

    assert_eq!(groups.len(), 2);
    let session = GroupEditSession::begin(ProductId(1), &groups[0].label, groups[0].members.clone());

    assert_eq!(session.original_label(), "Repuestos");
    assert_eq!(session.members().len(), 1);
    assert!(!session.has_pending_changes());
}
