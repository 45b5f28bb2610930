//! Integration tests for the SQLite fragment store.
//!
//! These exercise the real `sqlite-vec` extension against temp databases
//! with deterministic embeddings, so they run offline.

use scriptura::embeddings::MockEmbeddingProvider;
use scriptura::stores::{FragmentRecord, SqliteFragmentStore, VectorBackend, reset_index};

fn record(id: &str, reference: &str, content: &str, embedding: Vec<f32>) -> FragmentRecord {
    FragmentRecord::new(id, reference, "Genesis", 0, content)
        .with_metadata(serde_json::json!({"reference": reference}))
        .with_embedding(embedding)
}

#[tokio::test]
async fn open_existing_returns_none_for_missing_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.sqlite3");
    let model = MockEmbeddingProvider::with_dims(4);
    let store = SqliteFragmentStore::open_existing(&path, &model).await.unwrap();
    assert!(store.is_none());
}

#[tokio::test]
async fn insert_then_count_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.sqlite3");
    let model = MockEmbeddingProvider::with_dims(4);
    let store = SqliteFragmentStore::open(&path, &model).await.unwrap();

    let outcome = store
        .insert_fragments(vec![
            record("a", "Genesis 1:1", "first", vec![1.0, 0.0, 0.0, 0.0]),
            record("b", "Genesis 1:2", "second", vec![0.0, 1.0, 0.0, 0.0]),
            // No embedding: skipped, not silently dropped.
            FragmentRecord::new("c", "Genesis 1:3", "Genesis", 0, "third"),
        ])
        .await
        .unwrap();
    assert_eq!(outcome.inserted, 2);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(store.count().await.unwrap(), 2);

    // Reopening sees the same rows.
    drop(store);
    let reopened = SqliteFragmentStore::open_existing(&path, &model)
        .await
        .unwrap()
        .expect("store file exists");
    assert_eq!(reopened.count().await.unwrap(), 2);
}

#[tokio::test]
async fn search_orders_by_similarity_and_caps_at_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.sqlite3");
    let model = MockEmbeddingProvider::with_dims(4);
    let store = SqliteFragmentStore::open(&path, &model).await.unwrap();

    store
        .insert_fragments(vec![
            record("far", "Genesis 1:2", "far away", vec![0.0, 1.0, 0.0, 0.0]),
            record("near", "Genesis 1:1", "nearly there", vec![0.9, 0.1, 0.0, 0.0]),
            record("exact", "Genesis 1:3", "spot on", vec![1.0, 0.0, 0.0, 0.0]),
        ])
        .await
        .unwrap();

    let query = [1.0_f32, 0.0, 0.0, 0.0];
    let hits = store.search_similar(&query, 2).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].0.id, "exact");
    assert_eq!(hits[1].0.id, "near");
    assert!(hits[0].1 >= hits[1].1, "similarity must be non-increasing");

    // Asking for more than exists returns everything, still ordered.
    let hits = store.search_similar(&query, 10).await.unwrap();
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[2].0.id, "far");
    assert!(hits[1].1 >= hits[2].1);
}

#[tokio::test]
async fn search_round_trips_record_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.sqlite3");
    let model = MockEmbeddingProvider::with_dims(4);
    let store = SqliteFragmentStore::open(&path, &model).await.unwrap();

    let metadata = serde_json::json!({
        "reference": "John 3:16",
        "testament": "New",
        "book_number": 43,
    });
    store
        .insert_fragments(vec![
            FragmentRecord::new("row", "John 3:16", "John", 2, "For God so loved the world")
                .with_metadata(metadata.clone())
                .with_embedding(vec![0.5, 0.5, 0.0, 0.0]),
        ])
        .await
        .unwrap();

    let hits = store.search_similar(&[0.5, 0.5, 0.0, 0.0], 1).await.unwrap();
    let (fragment, similarity) = &hits[0];
    assert_eq!(fragment.reference, "John 3:16");
    assert_eq!(fragment.book, "John");
    assert_eq!(fragment.chunk_index, 2);
    assert_eq!(fragment.content, "For God so loved the world");
    assert_eq!(fragment.metadata, metadata);
    assert!(*similarity > 0.99, "identical vector should be ~1.0 similar");
}

#[tokio::test]
async fn reset_deletes_the_whole_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.sqlite3");
    let model = MockEmbeddingProvider::with_dims(4);
    let store = SqliteFragmentStore::open(&path, &model).await.unwrap();
    store
        .insert_fragments(vec![record("a", "Genesis 1:1", "text", vec![1.0, 0.0, 0.0, 0.0])])
        .await
        .unwrap();
    drop(store);

    assert!(reset_index(&path).await.unwrap());
    assert!(!path.exists());
    let reopened = SqliteFragmentStore::open_existing(&path, &model).await.unwrap();
    assert!(reopened.is_none());
}
