//! Chat session behavior over the local backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use hostel_core::Role;
use hostel_core::assistant::TimeRange;
use hostel_core::chat::{Message, ReactionKind, Sender};
use hostel_core::records::Profile;
use hostel_core::route::Route;
use hostel_service::{
    AuthSession, ChatAnalytics, ChatEvent, ChatOptions, ChatSession, ReactionRecorder,
    ServiceError,
};
use hostel_store::{ChatRecord, ChatStore, Database, RecordStore, SharedStore};

fn profile(id: &str, role: Role) -> Profile {
    Profile {
        id: id.into(),
        email: format!("{id}@hostel.test"),
        name: "Asha".into(),
        role,
        national_id: None,
        phone: None,
        room_number: None,
    }
}

async fn setup(role: Role) -> (SharedStore, AuthSession) {
    let store: SharedStore = Arc::new(Database::open_in_memory().await.unwrap());
    let user = profile("s1", role);
    store.upsert_profile(&user).await.unwrap();
    (store, AuthSession::new(user, "local".into()))
}

async fn open(store: &SharedStore, auth: &AuthSession) -> ChatSession {
    ChatSession::open(store.clone(), auth.clone(), ChatOptions::default().instant()).await
}

#[tokio::test]
async fn empty_history_starts_with_unsaved_greeting() {
    let (store, auth) = setup(Role::Student).await;
    let session = open(&store, &auth).await;

    let messages = session.messages().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sender, Sender::Bot);
    assert_eq!(messages[0].text, "Hello Asha! How can I help you today?");
    assert!(store.load_history("s1", 50).await.unwrap().is_empty());
}

#[tokio::test]
async fn send_adds_user_message_then_reply() {
    let (store, auth) = setup(Role::Student).await;
    let session = open(&store, &auth).await;
    let before = session.messages().await.len();

    let pending = session
        .send_message("Can I check my room allocation?")
        .await
        .unwrap();
    assert_eq!(session.messages().await.len(), before + 1);
    assert_eq!(pending.user_message().sender, Sender::User);

    let reply = pending.wait().await.unwrap();
    assert_eq!(session.messages().await.len(), before + 2);
    assert!(reply.text.contains("room details"));
    assert_eq!(reply.actions.len(), 1);
    assert_eq!(reply.actions[0].label, "View Room Details");
    assert_eq!(reply.actions[0].route, Route::Rooms);
    assert!(reply.actions[0].route.path(Role::Student).starts_with("/student"));
    assert_eq!(reply.query_type.as_deref(), Some("room"));
    assert!(!session.is_typing());

    let saved = store.load_history("s1", 50).await.unwrap();
    assert_eq!(saved.len(), 2);
}

#[tokio::test]
async fn admins_get_the_short_rule_without_actions() {
    let (store, auth) = setup(Role::Admin).await;
    let session = open(&store, &auth).await;

    let reply = session
        .send_message("any pending maintenance?")
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();
    assert!(reply.text.contains("maintenance requests"));
    assert!(reply.actions.is_empty());
}

#[tokio::test]
async fn blank_input_is_rejected() {
    let (store, auth) = setup(Role::Student).await;
    let session = open(&store, &auth).await;

    let err = session.send_message("   ").await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(hostel_core::Error::Validation(_))
    ));
    assert_eq!(session.messages().await.len(), 1);
}

#[tokio::test]
async fn events_report_typing_and_messages() {
    let (store, auth) = setup(Role::Student).await;
    let session = open(&store, &auth).await;
    let mut events = session.subscribe();

    session.send_message("hello").await.unwrap().wait().await.unwrap();

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(matches!(seen[0], ChatEvent::MessageAdded(ref m) if m.sender == Sender::User));
    assert!(seen.contains(&ChatEvent::Typing(true)));
    assert_eq!(seen.last(), Some(&ChatEvent::Typing(false)));
}

#[tokio::test]
async fn reopening_restores_history_and_reactions() {
    let (store, auth) = setup(Role::Student).await;
    let session = open(&store, &auth).await;
    let reply = session
        .send_message("my bill")
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();
    ReactionRecorder::new(session.clone())
        .react(&reply.id, ReactionKind::Heart)
        .await
        .unwrap();

    let reopened = open(&store, &auth).await;
    let messages = reopened.messages().await;
    assert_eq!(messages.len(), 2);
    let restored = reopened.message(&reply.id).await.unwrap();
    assert_eq!(restored.reactions.len(), 1);
    assert_eq!(restored.reactions[0].kind, ReactionKind::Heart);
    assert_eq!(restored.actions, reply.actions);
}

#[tokio::test]
async fn reacting_twice_keeps_latest_reaction() {
    let (store, auth) = setup(Role::Student).await;
    let session = open(&store, &auth).await;
    let reply = session
        .send_message("repair my tap")
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    let recorder = ReactionRecorder::new(session.clone());
    recorder.react(&reply.id, ReactionKind::ThumbsUp).await.unwrap();
    let updated = recorder
        .react(&reply.id, ReactionKind::ThumbsDown)
        .await
        .unwrap();

    assert_eq!(updated.reactions.len(), 1);
    assert_eq!(updated.reactions[0].kind, ReactionKind::ThumbsDown);
    let stored = store.reactions_for(&[reply.id.clone()]).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].kind, ReactionKind::ThumbsDown);
}

#[tokio::test]
async fn helpful_votes_append_and_feed_analytics() {
    let (store, auth) = setup(Role::Student).await;
    let session = open(&store, &auth).await;
    let reply = session
        .send_message("payment due?")
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    let recorder = ReactionRecorder::new(session.clone());
    recorder.mark_helpful(&reply.id, true).await.unwrap();
    let updated = recorder.mark_helpful(&reply.id, false).await.unwrap();
    assert_eq!(updated.was_helpful, Some(false));

    let admin = profile("a1", Role::Admin);
    store.upsert_profile(&admin).await.unwrap();
    let admin = AuthSession::new(admin, "local".into());
    let summary = ChatAnalytics::new(store.clone())
        .summarize(&admin, TimeRange::Day)
        .await
        .unwrap();
    assert_eq!(summary.helpful + summary.not_helpful, 2);
    assert_eq!(summary.query_types.get("billing"), Some(&2));
    assert_eq!(summary.total_sessions, 1);

    let err = ChatAnalytics::new(store.clone())
        .summarize(&auth, TimeRange::Day)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(hostel_core::Error::Forbidden(_))
    ));
}

#[tokio::test]
async fn feedback_on_unknown_message_is_not_found() {
    let (store, auth) = setup(Role::Student).await;
    let recorder = ReactionRecorder::new(open(&store, &auth).await);
    assert!(matches!(
        recorder.react("nope", ReactionKind::Smile).await.unwrap_err(),
        ServiceError::NotFound(_)
    ));
}

#[tokio::test]
async fn deleted_message_leaves_history_and_storage() {
    let (store, auth) = setup(Role::Student).await;
    let session = open(&store, &auth).await;
    let pending = session.send_message("dashboard").await.unwrap();
    let user_id = pending.user_message().id.clone();
    pending.wait().await.unwrap();

    session.delete_message(&user_id).await.unwrap();

    assert!(session.message(&user_id).await.is_none());
    let saved = store.load_history("s1", 50).await.unwrap();
    assert!(saved.iter().all(|r| r.id != user_id));
    assert_eq!(saved.len(), 1);
}

#[tokio::test]
async fn deleting_another_users_message_is_not_found() {
    let (store, alice) = setup(Role::Student).await;
    let bob_profile = profile("s2", Role::Student);
    store.upsert_profile(&bob_profile).await.unwrap();
    let bob = AuthSession::new(bob_profile, "local".into());

    let alice_session = open(&store, &alice).await;
    let pending = alice_session.send_message("my bill").await.unwrap();
    let alice_msg = pending.user_message().id.clone();
    pending.wait().await.unwrap();

    let bob_session = open(&store, &bob).await;
    let err = bob_session.delete_message(&alice_msg).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let saved = store.load_history("s1", 50).await.unwrap();
    assert_eq!(saved.len(), 2);
    assert!(saved.iter().any(|r| r.id == alice_msg));
    assert!(alice_session.message(&alice_msg).await.is_some());
}

#[tokio::test]
async fn reply_is_held_back_while_typing() {
    let (store, auth) = setup(Role::Student).await;
    let options = ChatOptions {
        typing_delay_min_ms: 400,
        typing_delay_max_ms: 400,
        ..ChatOptions::default()
    };
    let session = ChatSession::open(store.clone(), auth.clone(), options).await;
    let before = session.messages().await.len();

    let pending = session.send_message("where is my room?").await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(session.messages().await.len(), before + 1);
    assert!(session.is_typing());

    let reply = pending.wait().await.unwrap();
    assert_eq!(reply.sender, Sender::Bot);
    assert_eq!(session.messages().await.len(), before + 2);
    assert!(!session.is_typing());
}

#[tokio::test]
async fn search_and_export_cover_the_history() {
    let (store, auth) = setup(Role::Student).await;
    store
        .insert_chat(&ChatRecord::from_message("s1", &Message::user("Where is my BILL, please?")))
        .await
        .unwrap();
    let session = open(&store, &auth).await;

    let hits = session.search("bill").await;
    assert_eq!(hits.len(), 1);

    let mut out = Vec::new();
    session.export_csv(&mut out).await.unwrap();
    let csv = String::from_utf8(out).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Sender,Message,Timestamp"));
    assert!(lines.next().unwrap().starts_with("user,\"Where is my BILL, please?\","));
}
