//! HTTP route tests, driving the router without binding a socket

use axum::body::Body;
use axum::http::{Request, StatusCode};
use babytalk::brain::{Brain, MemoryStore, DEFAULT_REPLIES};
use babytalk::{router, ServerState, StateStore};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> (Arc<MemoryStore>, axum::Router) {
    let store = Arc::new(MemoryStore::new());
    let state = ServerState::new(Brain::with_seed(store.clone(), 9));
    (store, router(state))
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_teach_and_ask() {
    let (_, app) = app();

    let (status, body) = get(&app, "/baby?teach=hello&reply=hi%20there&senderID=u1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully taught \"hello\"");
    assert_eq!(body["teacher"], "u1");
    assert_eq!(body["teachs"], 1);
    assert_eq!(body["replyCount"], 1);

    let (_, body) = get(&app, "/baby?teach=hello&reply=hey&reply=yo&senderID=u1").await;
    assert_eq!(body["teachs"], 2);
    assert_eq!(body["replyCount"], 3);

    let (_, body) = get(&app, "/baby?text=hello").await;
    let reply = body["reply"].as_str().unwrap();
    assert!(["hi there", "hey", "yo"].contains(&reply));
}

#[tokio::test]
async fn test_unknown_text_gets_default_reply() {
    let (_, app) = app();
    let (_, body) = get(&app, "/baby?text=mystery").await;
    assert!(DEFAULT_REPLIES.contains(&body["reply"].as_str().unwrap()));
}

#[tokio::test]
async fn test_list_endpoints() {
    let (_, app) = app();
    get(&app, "/baby?teach=a&reply=1&senderID=u1").await;
    get(&app, "/baby?teach=b&reply=2&senderID=u2").await;

    let (_, body) = get(&app, "/baby?list=all").await;
    assert_eq!(body["length"], 2);
    let list = body["teacher"]["teacherList"].as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["u1"], 1);

    let (_, body) = get(&app, "/baby?list=a").await;
    assert_eq!(body["data"], 1);
    let (_, body) = get(&app, "/baby?list=zzz").await;
    assert_eq!(body["data"], 0);
}

#[tokio::test]
async fn test_edit_and_remove() {
    let (_, app) = app();
    get(&app, "/baby?teach=q&reply=1&reply=2").await;

    let (_, body) = get(&app, "/baby?edit=q&replace=only").await;
    assert_eq!(body["message"], "Edited \"q\" to \"only\"");
    let (_, body) = get(&app, "/baby?text=q").await;
    assert_eq!(body["reply"], "only");

    let (_, body) = get(&app, "/baby?edit=missing&replace=x").await;
    assert_eq!(body["message"], "Conversation not found");

    let (status, body) = get(&app, "/baby?remove=q&index=7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Conversation or index not found");
    let (_, body) = get(&app, "/baby?remove=q&index=01").await;
    assert_eq!(body["message"], "Conversation or index not found");

    let (_, body) = get(&app, "/baby?remove=q&index=0").await;
    assert_eq!(body["message"], "Removed reply at index 0 from \"q\"");
    let (_, body) = get(&app, "/baby?list=q").await;
    assert_eq!(body["data"], 0);

    let (_, body) = get(&app, "/baby?remove=q").await;
    assert_eq!(body["message"], "Removed \"q\" from database");
}

#[tokio::test]
async fn test_remove_takes_priority_over_teach() {
    let (store, app) = app();
    let (_, body) = get(&app, "/baby?remove=x&teach=x&reply=y").await;
    assert_eq!(body["message"], "Removed \"x\" from database");
    assert!(store.load().conversations.is_empty());
}

#[tokio::test]
async fn test_welcome_and_read_only_routes() {
    let (_, app) = app();
    get(&app, "/baby?teach=a&reply=1&senderID=u1").await;

    let (_, body) = get(&app, "/baby").await;
    assert_eq!(body["message"], "Welcome to Baby API");
    assert_eq!(body["stats"]["totalConversations"], 1);

    let (_, body) = get(&app, "/stats").await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["totalTeachers"], 1);

    let (_, body) = get(&app, "/health").await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["data"]["conversations"], 1);
    assert_eq!(body["data"]["teachers"], 1);

    let (_, body) = get(&app, "/").await;
    assert_eq!(body["status"], "OK");
    assert_eq!(body["version"], babytalk::VERSION);
}

#[tokio::test]
async fn test_failed_save_returns_server_error() {
    let (store, app) = app();
    store.set_read_only(true);
    let (status, body) = get(&app, "/baby?teach=a&reply=1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().unwrap().starts_with("Failed to save data"));
}

#[tokio::test]
async fn test_failed_edit_and_indexed_remove_return_server_error() {
    let (store, app) = app();
    get(&app, "/baby?teach=q&reply=1&reply=2").await;
    let before = store.load();
    store.set_read_only(true);

    for uri in ["/baby?edit=q&replace=z", "/baby?remove=q&index=0"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert!(body["message"].as_str().unwrap().starts_with("Failed to save data"));
    }
    assert_eq!(store.load(), before);
}
