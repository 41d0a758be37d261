use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = kitforge_api::app::build_app();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn create_product(
    client: &reqwest::Client,
    base_url: &str,
    name: &str,
    sku: &str,
    can_be_part: bool,
) -> (String, String) {
    let res = client
        .post(format!("{}/products", base_url))
        .json(&json!({ "name": name, "sku": sku, "can_be_part": can_be_part }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    (
        body["id"].as_str().unwrap().to_string(),
        body["master_variant_id"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn health_endpoint_is_open() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn part_assignment_validates_counts_with_422() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (bundle_id, _) = create_product(&client, &srv.base_url, "Bundle", "BUNDLE", false).await;
    let (_, part_variant) = create_product(&client, &srv.base_url, "Part", "PART", true).await;

    for bad_count in [json!("0"), json!("-1"), json!("abc")] {
        let res = client
            .post(format!("{}/products/{}/parts", srv.base_url, bundle_id))
            .json(&json!({ "variant_id": part_variant, "count": bad_count }))
            .send()
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["field"], "quantity");
        assert_eq!(body["message"], "must be greater than 0");
    }
}

#[tokio::test]
async fn part_table_updates_through_assignment_and_removal() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (bundle_id, _) = create_product(&client, &srv.base_url, "Bundle", "BUNDLE", false).await;
    let (_, part_variant) = create_product(&client, &srv.base_url, "Part", "PART", true).await;

    let res = client
        .post(format!("{}/products/{}/parts", srv.base_url, bundle_id))
        .json(&json!({ "variant_id": part_variant, "count": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let parts = body["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0]["count"], 2);
    assert_eq!(parts[0]["sku"], "PART");
    let part_id = parts[0]["id"].as_str().unwrap().to_string();

    // Count update by part id.
    let res = client
        .put(format!("{}/parts/{}", srv.base_url, part_id))
        .json(&json!({ "count": "5" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["parts"][0]["count"], 5);

    // Search finds the part product; blank query finds nothing.
    let res = client
        .get(format!("{}/parts/available?q=par", srv.base_url))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["products"].as_array().unwrap().len(), 1);

    let res = client
        .get(format!("{}/parts/available?q=", srv.base_url))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["products"].as_array().unwrap().is_empty());

    // Removal; a second removal of the same id is a 404.
    let res = client
        .delete(format!("{}/parts/{}", srv.base_url, part_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .delete(format!("{}/parts/{}", srv.base_url, part_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bundle_line_lifecycle_reconciles_inventory_over_http() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (bundle_id, bundle_variant) =
        create_product(&client, &srv.base_url, "Bundle", "BUNDLE", false).await;
    let (_, part_a) = create_product(&client, &srv.base_url, "Part A", "PA", true).await;
    let (_, part_b) = create_product(&client, &srv.base_url, "Part B", "PB", true).await;

    for (variant, count) in [(&part_a, 1), (&part_b, 3)] {
        let res = client
            .post(format!("{}/products/{}/parts", srv.base_url, bundle_id))
            .json(&json!({ "variant_id": variant, "count": count }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = client
            .put(format!("{}/variants/{}/stock", srv.base_url, variant))
            .json(&json!({ "available": 100 }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = client
        .post(format!("{}/orders", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let order: serde_json::Value = res.json().await.unwrap();
    let order_id = order["id"].as_str().unwrap();

    // One bundle → 1 + 3 units.
    let res = client
        .post(format!("{}/orders/{}/line_items", srv.base_url, order_id))
        .json(&json!({ "variant_id": bundle_variant, "quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let line: serde_json::Value = res.json().await.unwrap();
    let line_id = line["id"].as_str().unwrap();

    let res = client
        .get(format!(
            "{}/line_items/{}/inventory_units",
            srv.base_url, line_id
        ))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["inventory_units"].as_array().unwrap().len(), 4);

    // Double the quantity → 8 units.
    let res = client
        .patch(format!("{}/line_items/{}", srv.base_url, line_id))
        .json(&json!({ "quantity": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!(
            "{}/line_items/{}/inventory_units",
            srv.base_url, line_id
        ))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["inventory_units"].as_array().unwrap().len(), 8);

    // Ship the only shipment, then reduce: nothing can be destroyed, the
    // report carries the unresolved reductions instead.
    let res = client
        .get(format!("{}/orders/{}/shipments", srv.base_url, order_id))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let shipments = body["shipments"].as_array().unwrap();
    assert_eq!(shipments.len(), 1);
    let shipment_id = shipments[0]["id"].as_str().unwrap();

    let res = client
        .post(format!("{}/shipments/{}/ship", srv.base_url, shipment_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .patch(format!("{}/line_items/{}", srv.base_url, line_id))
        .json(&json!({ "quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let unresolved = body["report"]["unresolved"].as_array().unwrap();
    assert_eq!(unresolved.len(), 2);

    let res = client
        .get(format!(
            "{}/line_items/{}/inventory_units",
            srv.base_url, line_id
        ))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["inventory_units"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn quantity_zero_is_rejected_with_422() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (_, variant) = create_product(&client, &srv.base_url, "Plain", "PLAIN", false).await;

    let res = client
        .post(format!("{}/orders", srv.base_url))
        .send()
        .await
        .unwrap();
    let order: serde_json::Value = res.json().await.unwrap();
    let order_id = order["id"].as_str().unwrap();

    let res = client
        .post(format!("{}/orders/{}/line_items", srv.base_url, order_id))
        .json(&json!({ "variant_id": variant, "quantity": 0 }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["field"], "quantity");
}
