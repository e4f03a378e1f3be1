//! Tests for the in-memory document store.

use std::time::Duration;

use grist_rag::Document;
use grist_service::docstore::{DocumentStore, InMemoryDocumentStore};

#[tokio::test]
async fn save_assigns_an_id_when_absent() {
    let store = InMemoryDocumentStore::new();
    let saved = store.save(Document::new("Notes", "Some notes.")).await.unwrap();

    let id = saved.id.clone().unwrap();
    assert!(!id.is_empty());
    assert_eq!(store.get(&id).await.unwrap(), Some(saved));
}

#[tokio::test]
async fn save_upserts_by_id() {
    let store = InMemoryDocumentStore::new();
    let mut doc = Document::new("Draft", "First version.");
    doc.id = Some("doc-1".to_string());
    store.save(doc.clone()).await.unwrap();

    doc.title = "Final".to_string();
    doc.text = "Second version.".to_string();
    store.save(doc).await.unwrap();

    let fetched = store.get("doc-1").await.unwrap().unwrap();
    assert_eq!(fetched.title, "Final");
    assert_eq!(store.list(None, 50).await.unwrap().len(), 1);
}

#[tokio::test]
async fn get_returns_none_for_unknown_ids() {
    let store = InMemoryDocumentStore::new();
    assert_eq!(store.get("missing").await.unwrap(), None);
}

#[tokio::test]
async fn list_is_newest_first_and_bounded() {
    let store = InMemoryDocumentStore::new();
    for i in 0..3 {
        store.save(Document::new(format!("Report {i}"), "text")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let listed = store.list(None, 2).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].title, "Report 2");
    assert_eq!(listed[1].title, "Report 1");
}

#[tokio::test]
async fn list_filters_titles_case_insensitively() {
    let store = InMemoryDocumentStore::new();
    store.save(Document::new("Quarterly Report", "q")).await.unwrap();
    store.save(Document::new("Meeting notes", "m")).await.unwrap();

    let listed = store.list(Some("report"), 50).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Quarterly Report");
}

#[tokio::test]
async fn delete_reports_whether_a_record_was_removed() {
    let store = InMemoryDocumentStore::new();
    let mut doc = Document::new("Victim", "text");
    doc.id = Some("doc-1".to_string());
    store.save(doc).await.unwrap();

    assert!(store.delete("doc-1").await.unwrap());
    assert!(!store.delete("doc-1").await.unwrap());
    assert_eq!(store.get("doc-1").await.unwrap(), None);
}
