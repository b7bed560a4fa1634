//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per endpoint shape. Collections are named
//! by their path segment (see the constants module).
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::Value;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/api/{}/", self.base_url, collection)
    }

    fn item_url(&self, collection: &str, id: impl std::fmt::Display) -> String {
        format!("{}/api/{}/{}", self.base_url, collection, id)
    }

    // ========================================================================
    // Home
    // ========================================================================

    /// GET /
    pub async fn get_stats(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Stats request failed")
    }

    // ========================================================================
    // Collection endpoints
    // ========================================================================

    /// GET /api/{collection}/
    pub async fn list(&self, collection: &str) -> Response {
        self.client
            .get(self.collection_url(collection))
            .send()
            .await
            .expect("List request failed")
    }

    /// POST /api/{collection}/
    pub async fn create(&self, collection: &str, body: &Value) -> Response {
        self.client
            .post(self.collection_url(collection))
            .json(body)
            .send()
            .await
            .expect("Create request failed")
    }

    /// POST /api/{collection}/ with a raw, possibly malformed, JSON body
    pub async fn create_raw(&self, collection: &str, body: &'static str) -> Response {
        self.client
            .post(self.collection_url(collection))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Create request failed")
    }

    // ========================================================================
    // Item endpoints
    // ========================================================================

    /// GET /api/{collection}/{id}
    pub async fn get(&self, collection: &str, id: i64) -> Response {
        self.get_by_segment(collection, id).await
    }

    /// GET /api/{collection}/{segment}, for ids that are not integers
    pub async fn get_by_segment(&self, collection: &str, segment: impl std::fmt::Display) -> Response {
        self.client
            .get(self.item_url(collection, segment))
            .send()
            .await
            .expect("Get request failed")
    }

    /// PATCH /api/{collection}/{id}
    pub async fn patch(&self, collection: &str, id: i64, body: &Value) -> Response {
        self.client
            .patch(self.item_url(collection, id))
            .json(body)
            .send()
            .await
            .expect("Patch request failed")
    }

    /// DELETE /api/{collection}/{id}
    pub async fn delete(&self, collection: &str, id: i64) -> Response {
        self.client
            .delete(self.item_url(collection, id))
            .send()
            .await
            .expect("Delete request failed")
    }

    // ========================================================================
    // Convenience
    // ========================================================================

    /// GET an item and decode it, asserting it exists.
    pub async fn fetch_json(&self, collection: &str, id: i64) -> Value {
        let response = self.get(collection, id).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::OK,
            "{} {} should exist",
            collection,
            id
        );
        response.json().await.expect("Invalid JSON body")
    }

    /// The `message` field of a response body.
    pub async fn message(response: Response) -> String {
        let body: Value = response.json().await.expect("Invalid JSON body");
        body["message"]
            .as_str()
            .expect("Response has no message")
            .to_string()
    }
}
