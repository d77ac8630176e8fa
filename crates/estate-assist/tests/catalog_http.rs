//! HTTP catalog client behaviour against local stub servers.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use estate_assist::catalog::{CatalogSource, HttpCatalogClient};
use estate_assist::config::{AssistConfig, CatalogConfig, LlmConfig, MatchingConfig};
use estate_assist::embeddings::EmbeddingModel;
use estate_assist::engine::ChatEngine;
use estate_assist::faq::FaqIndex;
use estate_assist::history::InMemorySessionStore;
use estate_assist::llm::{ChatMessage, LlmProvider};

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn catalog_config(base: &str) -> CatalogConfig {
    CatalogConfig {
        properties_url: format!("{base}/properties"),
        agents_url: format!("{base}/agents"),
        blogs_url: format!("{base}/blogs"),
        ttl_secs: 60,
    }
}

#[tokio::test]
async fn bare_array_and_data_envelope_both_unwrap() {
    let router = Router::new()
        .route(
            "/properties",
            get(|| async { Json(json!({"data": [{"name": "a"}, {"name": "b"}]})) }),
        )
        .route("/agents", get(|| async { Json(json!([{"name": "jane"}])) }))
        .route(
            "/blogs",
            get(|| async { Json(json!({"unexpected": "shape"})) }),
        );
    let base = spawn(router).await;
    let client = HttpCatalogClient::new(&catalog_config(&base)).unwrap();

    assert_eq!(client.fetch_properties().await.len(), 2);
    assert_eq!(client.fetch_agents().await.len(), 1);
    assert!(client.fetch_blogs().await.is_empty());
}

#[tokio::test]
async fn server_error_yields_empty_not_error() {
    let router = Router::new().route(
        "/properties",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base = spawn(router).await;
    let client = HttpCatalogClient::new(&catalog_config(&base)).unwrap();

    assert!(client.fetch_properties().await.is_empty());
    // Unregistered routes return 404 — also empty.
    assert!(client.fetch_agents().await.is_empty());
}

#[tokio::test]
async fn unreachable_host_yields_empty() {
    // Port 9 (discard) is almost certainly closed.
    let client = HttpCatalogClient::new(&catalog_config("http://127.0.0.1:9")).unwrap();
    assert!(client.fetch_properties().await.is_empty());
}

#[tokio::test]
async fn non_json_body_yields_empty() {
    let router = Router::new().route("/properties", get(|| async { "<html>oops</html>" }));
    let base = spawn(router).await;
    let client = HttpCatalogClient::new(&catalog_config(&base)).unwrap();

    assert!(client.fetch_properties().await.is_empty());
}

/// The orchestrator still answers when every catalog endpoint fails.
#[tokio::test]
async fn engine_answers_through_catalog_outage() {
    struct FixedLlm;

    #[async_trait]
    impl LlmProvider for FixedLlm {
        async fn chat(&self, _messages: &[ChatMessage]) -> anyhow::Result<String> {
            Ok("still here".into())
        }
    }

    struct ZeroEmbedder;

    impl EmbeddingModel for ZeroEmbedder {
        fn embed(&self, _text: &str) -> Vec<f32> {
            vec![0.0; 8]
        }
    }

    let router = Router::new().route(
        "/properties",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base = spawn(router).await;
    let catalog = Arc::new(HttpCatalogClient::new(&catalog_config(&base)).unwrap());

    let config = AssistConfig {
        faq_path: "faqs.json".into(),
        llm: LlmConfig {
            api_key: "k".into(),
            base_url: "http://localhost:9".into(),
            model: "m".into(),
        },
        catalog: catalog_config(&base),
        matching: MatchingConfig::default(),
    };
    let engine = ChatEngine::new(
        FaqIndex::default(),
        catalog,
        Arc::new(ZeroEmbedder),
        Arc::new(FixedLlm),
        Arc::new(InMemorySessionStore::new(6)),
        &config,
    );

    let reply = engine.handle_message("s1", "any properties for rent?").await;
    assert_eq!(reply, "still here");
}
