//! Corpus download tests against a mock HTTP server.

use httpmock::prelude::*;
use scriptura::corpus::fetch_corpus;
use scriptura::types::RagError;
use url::Url;

const CORPUS_JSON: &str = r#"{
    "translation": "KJV",
    "books": [
        {
            "name": "Genesis",
            "chapters": [
                {
                    "chapter": 1,
                    "verses": [
                        {"verse": 1, "text": "In the beginning God created the heaven and the earth."},
                        {"verse": 2, "text": "And the earth was without form, and void."}
                    ]
                }
            ]
        }
    ]
}"#;

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("scriptura-tests/0.1")
        .build()
        .unwrap()
}

#[tokio::test]
async fn downloads_validates_and_writes_through() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/KJV.json");
            then.status(200).body(CORPUS_JSON);
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("data").join("KJV.json");
    let url = Url::parse(&server.url("/KJV.json")).unwrap();

    let fetch = fetch_corpus(&client(), &url, &target).await.unwrap();
    mock.assert_async().await;
    assert!(!fetch.from_cache);
    assert_eq!(fetch.verses, 2);
    assert_eq!(fetch.bytes, CORPUS_JSON.len());
    assert_eq!(
        tokio::fs::read_to_string(&target).await.unwrap(),
        CORPUS_JSON
    );
}

#[tokio::test]
async fn existing_valid_copy_short_circuits_the_network() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/KJV.json");
            then.status(200).body(CORPUS_JSON);
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("KJV.json");
    tokio::fs::write(&target, CORPUS_JSON).await.unwrap();
    let url = Url::parse(&server.url("/KJV.json")).unwrap();

    let fetch = fetch_corpus(&client(), &url, &target).await.unwrap();
    assert!(fetch.from_cache);
    assert_eq!(fetch.verses, 2);
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn invalid_payload_is_rejected_and_not_written() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/KJV.json");
            then.status(200).body("{\"translation\": \"KJV\", \"books\": \"nope\"}");
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("KJV.json");
    let url = Url::parse(&server.url("/KJV.json")).unwrap();

    let result = fetch_corpus(&client(), &url, &target).await;
    assert!(matches!(result, Err(RagError::CorpusParse(_))));
    assert!(!target.exists(), "bad download must not be written");
}

#[tokio::test]
async fn http_failures_surface_typed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/KJV.json");
            then.status(503);
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("KJV.json");
    let url = Url::parse(&server.url("/KJV.json")).unwrap();

    let result = fetch_corpus(&client(), &url, &target).await;
    assert!(matches!(result, Err(RagError::Http(_))));
    assert!(!target.exists());
}

#[tokio::test]
async fn stale_cached_copy_is_replaced() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/KJV.json");
            then.status(200).body(CORPUS_JSON);
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("KJV.json");
    tokio::fs::write(&target, "not json at all").await.unwrap();
    let url = Url::parse(&server.url("/KJV.json")).unwrap();

    let fetch = fetch_corpus(&client(), &url, &target).await.unwrap();
    mock.assert_async().await;
    assert!(!fetch.from_cache);
    assert_eq!(
        tokio::fs::read_to_string(&target).await.unwrap(),
        CORPUS_JSON
    );
}
