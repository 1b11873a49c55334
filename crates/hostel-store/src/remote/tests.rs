//! Tests for the REST client: construction, URL building, error bodies.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use super::auth::AuthClient;
use super::client::{Order, RemoteBackend, RemoteConfig, RestQuery, api_message};
use crate::error::StoreError;
use crate::feed::Table;

fn config(url: &str) -> RemoteConfig {
    RemoteConfig {
        url: url.into(),
        anon_key: "anon-key".into(),
        timeout: Duration::from_secs(5),
    }
}

// =============================================================================
// Client construction
// =============================================================================

#[test]
fn empty_url_is_config_error() {
    let err = RemoteBackend::new(&config("")).unwrap_err();
    assert!(matches!(err, StoreError::Config(_)));
}

#[test]
fn empty_anon_key_is_config_error() {
    let mut cfg = config("https://hostel.example.co");
    cfg.anon_key.clear();
    assert!(matches!(
        RemoteBackend::new(&cfg).unwrap_err(),
        StoreError::Config(_)
    ));
}

#[test]
fn anon_key_with_newline_is_rejected() {
    let mut cfg = config("https://hostel.example.co");
    cfg.anon_key = "bad\nkey".into();
    assert!(RemoteBackend::new(&cfg).is_err());
}

// =============================================================================
// URL building
// =============================================================================

#[test]
fn rest_url_strips_trailing_slash() {
    let backend = RemoteBackend::new(&config("https://hostel.example.co/")).unwrap();
    let url = backend.rest_url(&RestQuery::new(Table::Rooms)).unwrap();
    assert_eq!(url.as_str(), "https://hostel.example.co/rest/v1/rooms");
}

#[test]
fn filters_order_and_limit_are_encoded() {
    let backend = RemoteBackend::new(&config("https://hostel.example.co")).unwrap();
    let query = RestQuery::new(Table::ChatHistory)
        .eq("user_id", "u-1")
        .order("timestamp", Order::Desc)
        .limit(50);
    let url = backend.rest_url(&query).unwrap();
    assert_eq!(
        url.query(),
        Some("user_id=eq.u-1&order=timestamp.desc&limit=50")
    );
}

#[test]
fn timestamp_filter_escapes_plus_sign() {
    let backend = RemoteBackend::new(&config("https://hostel.example.co")).unwrap();
    let query = RestQuery::new(Table::ChatAnalytics).gte("created_at", "2026-01-01T00:00:00+00:00");
    let url = backend.rest_url(&query).unwrap();
    let query = url.query().unwrap();
    assert!(query.contains("gte.2026-01-01T00%3A00%3A00%2B00%3A00"), "{query}");
}

#[test]
fn in_list_quotes_values() {
    let query = RestQuery::new(Table::ChatReactions).in_list("message_id", &["a".into(), "b,c".into()]);
    assert_eq!(
        query.params(),
        [("message_id".to_string(), "in.(\"a\",\"b,c\")".to_string())]
    );
}

#[test]
fn upsert_target_is_a_query_param() {
    let query = RestQuery::new(Table::StudentSettings).on_conflict("user_id");
    assert_eq!(query.params()[0].0, "on_conflict");
    assert_eq!(query.table(), Table::StudentSettings);
}

#[test]
fn auth_url_lives_under_auth_v1() {
    let client = AuthClient::new(&config("https://hostel.example.co")).unwrap();
    let url = client.auth_url("/token").unwrap();
    assert_eq!(url.as_str(), "https://hostel.example.co/auth/v1/token");
}

// =============================================================================
// Error bodies
// =============================================================================

#[test]
fn api_message_reads_known_keys() {
    assert_eq!(
        api_message(r#"{"message":"duplicate key value"}"#).as_deref(),
        Some("duplicate key value")
    );
    assert_eq!(
        api_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#)
            .as_deref(),
        Some("Invalid login credentials")
    );
    assert_eq!(api_message("<html>"), None);
}

#[test]
fn unauthorized_errors_ask_for_login() {
    assert!(StoreError::Auth("expired".into()).is_auth());
    assert!(
        StoreError::Api {
            status: 403,
            message: "denied".into()
        }
        .is_auth()
    );
    assert!(!StoreError::NotFound("x".into()).is_auth());
}
