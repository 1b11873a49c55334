//! The local backend behind `Arc<dyn Store>`, the way services hold it.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use hostel_core::chat::{Message, Reaction, ReactionKind};
use hostel_store::{
    ChangeFilter, ChangeKind, ChatRecord, ChatStore, Database, SharedStore, Store, Table,
};

async fn shared() -> SharedStore {
    Arc::new(Database::open_in_memory().await.unwrap())
}

#[tokio::test]
async fn deleted_message_is_not_returned_by_later_fetch() {
    let store = shared().await;
    let keep = Message::user("keep me");
    let doomed = Message::user("drop me");
    store
        .insert_chat(&ChatRecord::from_message("u1", &keep))
        .await
        .unwrap();
    store
        .insert_chat(&ChatRecord::from_message("u1", &doomed))
        .await
        .unwrap();

    assert!(!store.delete_chat("u2", &doomed.id).await.unwrap());
    assert!(store.delete_chat("u1", &doomed.id).await.unwrap());

    let history = store.load_history("u1", 50).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, keep.id);
}

#[tokio::test]
async fn feed_sees_writes_through_trait_object() {
    let store = shared().await;
    let mut sub = store
        .changes()
        .subscribe(ChangeFilter::table(Table::ChatReactions).eq("user_id", "u1"));

    store
        .upsert_reaction(&Reaction {
            id: "r1".into(),
            message_id: "m1".into(),
            user_id: "u1".into(),
            kind: ReactionKind::ThumbsUp,
            created_at: chrono::Utc::now(),
        })
        .await
        .unwrap();

    let change = sub.recv().await.unwrap();
    assert_eq!(change.kind, ChangeKind::Insert);
    assert_eq!(change.decode::<Reaction>().unwrap().kind, ReactionKind::ThumbsUp);
    assert_eq!(store.backend_name(), "sqlite");
}
