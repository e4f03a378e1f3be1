//! Tests for the in-memory conversation store.

use std::sync::Arc;

use grist_memory::{ConversationStore, InMemoryConversationStore, Role};

#[tokio::test]
async fn created_conversations_start_empty_with_distinct_ids() {
    let store = InMemoryConversationStore::new();
    let first = store.create().await.unwrap();
    let second = store.create().await.unwrap();

    assert_ne!(first, second);
    assert!(store.history(&first).await.unwrap().is_empty());
    assert_eq!(store.len(&first).await.unwrap(), 0);
}

#[tokio::test]
async fn append_preserves_insertion_order() {
    let store = InMemoryConversationStore::new();
    let id = store.create().await.unwrap();

    store.append(&id, Role::User, "first question").await.unwrap();
    store.append(&id, Role::Assistant, "first answer").await.unwrap();
    store.append(&id, Role::User, "second question").await.unwrap();

    let history = store.history(&id).await.unwrap();
    let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["first question", "first answer", "second question"]);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[1].role, Role::Assistant);
}

#[tokio::test]
async fn append_to_an_unknown_id_creates_the_conversation() {
    let store = InMemoryConversationStore::new();
    store.append("external-id", Role::User, "hello").await.unwrap();

    let history = store.history("external-id").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].content, "hello");
}

#[tokio::test]
async fn last_n_returns_the_newest_window_in_chronological_order() {
    let store = InMemoryConversationStore::new();
    let id = store.create().await.unwrap();
    for i in 0..5 {
        store.append(&id, Role::User, &format!("message {i}")).await.unwrap();
    }

    let window = store.last_n(&id, 2).await.unwrap();
    let contents: Vec<&str> = window.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["message 3", "message 4"]);

    // A window larger than the history returns everything.
    assert_eq!(store.last_n(&id, 50).await.unwrap().len(), 5);
}

#[tokio::test]
async fn unknown_ids_read_as_empty() {
    let store = InMemoryConversationStore::new();
    assert!(store.last_n("missing", 10).await.unwrap().is_empty());
    assert!(store.history("missing").await.unwrap().is_empty());
    assert_eq!(store.len("missing").await.unwrap(), 0);
}

#[tokio::test]
async fn concurrent_appends_to_one_conversation_lose_nothing() {
    let store = Arc::new(InMemoryConversationStore::new());
    let id = store.create().await.unwrap();

    let mut handles = Vec::new();
    for i in 0..32 {
        let store = store.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            store.append(&id, Role::User, &format!("message {i}")).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.len(&id).await.unwrap(), 32);
}

#[tokio::test]
async fn conversations_are_independent() {
    let store = InMemoryConversationStore::new();
    let a = store.create().await.unwrap();
    let b = store.create().await.unwrap();

    store.append(&a, Role::User, "only in a").await.unwrap();
    assert_eq!(store.len(&a).await.unwrap(), 1);
    assert_eq!(store.len(&b).await.unwrap(), 0);
}
