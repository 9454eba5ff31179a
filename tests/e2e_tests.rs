//! End-to-end tests through the HTTP API
//!
//! Each test builds a pipeline, mounts the router and drives it with
//! `tower::ServiceExt::oneshot`, the same way a client would over the wire.
//! Delays are zero or tiny; the worker pool is drained instead of sleeping.

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use payments_pipeline::core::InMemoryQueue;
    use payments_pipeline::persistence::JsonFileStore;
    use payments_pipeline::{http, Pipeline, PipelineConfig};
    use rstest::rstest;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::tempdir;
    use tower::ServiceExt;

    fn config() -> PipelineConfig {
        PipelineConfig::new(4, Duration::ZERO, Duration::from_millis(1))
    }

    /// Send a request and decode the JSON response body
    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_transaction(body: Value) -> Request<Body> {
        Request::post("/api/v1/transactions")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_single_transaction_flow() {
        let pipeline = Pipeline::in_memory(&config());
        let app = http::router(pipeline.clone());

        let (status, created) = send(
            &app,
            post_transaction(json!({"accountID": "A1", "amount": 100.50, "type": "credit"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["status"], "in_processing");
        let id = created["transactionID"].as_str().unwrap().to_string();
        assert!(!id.is_empty());

        pipeline.drain().await;

        let (status, fetched) = send(&app, get(&format!("/api/v1/transactions/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, json!({"transactionID": id, "status": "processed"}));

        let (status, metrics) = send(&app, get("/api/v1/metrics")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(metrics["total_requests"], 1);
        assert!(metrics["tps"].as_f64().unwrap() >= 0.0);
        assert!(metrics["p99_latency"].as_f64().unwrap() >= 0.0);
    }

    #[rstest]
    #[case::unknown_type(json!({"accountID": "A1", "amount": 1, "type": "refund"}))]
    #[case::empty_type(json!({"accountID": "A1", "amount": 1, "type": ""}))]
    #[case::non_string_type(json!({"accountID": "A1", "amount": 1, "type": 5}))]
    #[case::null_type(json!({"accountID": "A1", "amount": 1, "type": null}))]
    #[tokio::test]
    async fn test_invalid_type_is_bad_request(#[case] body: Value) {
        let pipeline = Pipeline::in_memory(&config());
        let app = http::router(pipeline.clone());

        let (status, response) = send(&app, post_transaction(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response["detail"].as_str().unwrap().contains("type"));
        assert!(pipeline.ledger().is_empty());
        assert_eq!(pipeline.metrics().total_requests(), 0);
    }

    #[rstest]
    #[case::amount_out_of_range(r#"{"accountID": "A1", "amount": 1e40, "type": "credit"}"#)]
    #[case::missing_account(r#"{"amount": 1, "type": "credit"}"#)]
    #[case::malformed_json(r#"{"accountID": "A1", "amount": "#)]
    #[tokio::test]
    async fn test_unreadable_body_is_bad_request(#[case] raw: &'static str) {
        let pipeline = Pipeline::in_memory(&config());
        let app = http::router(pipeline.clone());
        let request = Request::post("/api/v1/transactions")
            .header("content-type", "application/json")
            .body(Body::from(raw))
            .unwrap();

        let (status, response) = send(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response["detail"].is_string());
        assert!(pipeline.ledger().is_empty());
        assert_eq!(pipeline.metrics().total_requests(), 0);
    }

    #[rstest]
    #[case::random_uuid("/api/v1/transactions/7f1d7a3c-54a4-4b0c-9e61-3f3a6f0b2d11")]
    #[case::not_a_uuid("/api/v1/transactions/nope")]
    #[tokio::test]
    async fn test_unknown_transaction_is_not_found(#[case] uri: &str) {
        let app = http::router(Pipeline::in_memory(&config()));

        let (status, body) = send(&app, get(uri)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"detail": "Transaction not found"}));
    }

    #[tokio::test]
    async fn test_metrics_start_at_zero() {
        let app = http::router(Pipeline::in_memory(&config()));

        let (status, body) = send(&app, get("/api/v1/metrics")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"tps": 0.0, "p99_latency": 0.0, "total_requests": 0}));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_are_all_counted() {
        let pipeline = Pipeline::in_memory(&config());
        let app = http::router(pipeline.clone());

        let handles: Vec<_> = (0..100)
            .map(|i| {
                let app = app.clone();
                tokio::spawn(async move {
                    let body = json!({"accountID": format!("A{}", i), "amount": i, "type": "debit"});
                    send(&app, post_transaction(body)).await
                })
            })
            .collect();

        let mut ids = std::collections::HashSet::new();
        for handle in handles {
            let (status, body) = handle.await.unwrap();
            assert_eq!(status, StatusCode::OK);
            ids.insert(body["transactionID"].as_str().unwrap().to_string());
        }
        pipeline.drain().await;

        assert_eq!(ids.len(), 100);
        let (_, metrics) = send(&app, get("/api/v1/metrics")).await;
        assert_eq!(metrics["total_requests"], 100);
    }

    #[tokio::test]
    async fn test_state_survives_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let id = {
            let pipeline = Pipeline::bootstrap(
                &config(),
                Arc::new(JsonFileStore::new(&path)),
                Arc::new(InMemoryQueue::new(Duration::ZERO)),
            )
            .await
            .unwrap();
            let app = http::router(pipeline.clone());

            let (_, created) = send(
                &app,
                post_transaction(json!({"accountID": "A1", "amount": -3.25, "type": "DEBIT"})),
            )
            .await;
            pipeline.shutdown().await;
            created["transactionID"].as_str().unwrap().to_string()
        };

        let restarted = Pipeline::bootstrap(
            &config(),
            Arc::new(JsonFileStore::new(&path)),
            Arc::new(InMemoryQueue::new(Duration::ZERO)),
        )
        .await
        .unwrap();
        let app = http::router(restarted);

        let (status, fetched) = send(&app, get(&format!("/api/v1/transactions/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["status"], "processed");

        let (_, metrics) = send(&app, get("/api/v1/metrics")).await;
        assert_eq!(metrics["total_requests"], 1);
    }
}
