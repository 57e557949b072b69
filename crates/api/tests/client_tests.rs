//! Integration tests for the REST client.

use httpmock::prelude::*;
use huddle_api::{ApiClient, ApiError, ChatApi};
use huddle_chats::CreateChannelRequest;
use huddle_config::ApiConfig;
use serde_json::json;

fn client(server: &MockServer) -> ApiClient {
    let config = ApiConfig {
        base_url: server.base_url(),
        request_timeout_seconds: 2,
    };
    ApiClient::new(&config)
        .expect("client should build")
        .with_token("tok-1")
}

fn message_json(id: &str, content: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "channel": "c1",
        "sender": {"_id": "u1", "username": "ada"},
        "content": content,
        "createdAt": "2024-05-01T10:00:00Z"
    })
}

#[tokio::test]
async fn fetch_messages_sends_bearer_token_and_decodes_page() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/messages/c1")
                .header("Authorization", "Bearer tok-1");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!([message_json("m1", "hi"), message_json("m2", "there")]));
        })
        .await;

    let messages = client(&server)
        .fetch_messages("c1")
        .await
        .expect("page should decode");

    mock.assert_async().await;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].id, "m1");
    assert_eq!(messages[1].sender_name(), "ada");
}

#[tokio::test]
async fn fetch_history_uses_skip_offset_in_path() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/messages/c1/history/50");
            then.status(200).json_body(json!([message_json("m0", "older")]));
        })
        .await;

    let older = client(&server)
        .fetch_history("c1", 50)
        .await
        .expect("history should decode");

    mock.assert_async().await;
    assert_eq!(older.len(), 1);
    assert_eq!(older[0].content, "older");
}

#[tokio::test]
async fn mark_read_returns_authoritative_receipts() {
    let server = MockServer::start_async().await;

    let _mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/messages/m1/read");
            then.status(200).json_body(json!({
                "success": true,
                "data": {
                    "_id": "m1",
                    "readBy": [
                        {"userId": "u2", "readAt": "2024-05-01T10:01:00Z"},
                        {"userId": {"_id": "u3", "username": "cy"}, "readAt": "2024-05-01T10:02:00Z"}
                    ]
                }
            }));
        })
        .await;

    let receipts = client(&server).mark_read("m1").await.expect("receipts");

    assert_eq!(receipts.len(), 2);
    assert_eq!(receipts[1].user.display_name(), "cy");
}

#[tokio::test]
async fn mark_read_without_receipts_is_malformed() {
    let server = MockServer::start_async().await;

    let _mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/messages/m1/read");
            then.status(200).json_body(json!({"data": {"_id": "m1"}}));
        })
        .await;

    let err = client(&server)
        .mark_read("m1")
        .await
        .expect_err("missing readBy must be rejected");

    assert!(err.is_malformed());
}

#[tokio::test]
async fn create_channel_unwraps_envelope() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/channels")
                .json_body(json!({
                    "name": "ops",
                    "description": null,
                    "isPrivate": true,
                    "members": ["u2"]
                }));
            then.status(201).json_body(json!({
                "channel": {
                    "_id": "c9",
                    "name": "ops",
                    "isPrivate": true,
                    "createdBy": {"_id": "u1", "username": "ada"},
                    "members": ["u1", "u2"]
                }
            }));
        })
        .await;

    let channel = client(&server)
        .create_channel(&CreateChannelRequest::private("ops", vec!["u2".to_string()]))
        .await
        .expect("channel should be created");

    mock.assert_async().await;
    assert_eq!(channel.id, "c9");
    assert!(channel.has_member("u2"));
}

#[tokio::test]
async fn invite_and_remove_return_updated_channel() {
    let server = MockServer::start_async().await;

    let _invite = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/channels/invite")
                .json_body(json!({"channelId": "c1", "userId": "u5"}));
            then.status(200).json_body(json!({
                "channel": {"_id": "c1", "name": "general", "members": ["u1", "u5"]}
            }));
        })
        .await;
    let _remove = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/channels/remove")
                .json_body(json!({"channelId": "c1", "userId": "u5"}));
            then.status(200).json_body(json!({
                "channel": {"_id": "c1", "name": "general", "members": ["u1"]}
            }));
        })
        .await;

    let api = client(&server);
    let invited = api.invite_user("c1", "u5").await.expect("invite");
    assert_eq!(invited.member_count(), 2);

    let removed = api.remove_user("c1", "u5").await.expect("remove");
    assert!(!removed.has_member("u5"));
}

#[tokio::test]
async fn delete_channel_ignores_response_body() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/channels/c1");
            then.status(200).body("Channel deleted");
        })
        .await;

    client(&server)
        .delete_channel("c1")
        .await
        .expect("delete should succeed");

    mock.assert_async().await;
}

#[tokio::test]
async fn error_body_message_is_surfaced() {
    let server = MockServer::start_async().await;

    let _mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/channels/missing");
            then.status(404)
                .json_body(json!({"message": "Channel not found"}));
        })
        .await;

    let err = client(&server)
        .get_channel("missing")
        .await
        .expect_err("404 expected");

    assert!(err.is_not_found());
    match err {
        ApiError::Status { message, .. } => assert_eq!(message, "Channel not found"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn unauthorized_maps_to_dedicated_variant() {
    let server = MockServer::start_async().await;

    let _mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/auth/profile");
            then.status(401).json_body(json!({"message": "Token is not valid"}));
        })
        .await;

    let err = client(&server).profile().await.expect_err("401 expected");
    assert!(matches!(err, ApiError::Unauthorized));
}

#[tokio::test]
async fn login_posts_credentials_without_token() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/auth/login")
                .json_body(json!({"email": "ada@example.com", "password": "pw"}));
            then.status(200).json_body(json!({
                "token": "jwt-123",
                "user": {"_id": "u1", "username": "ada", "email": "ada@example.com"}
            }));
        })
        .await;

    let config = ApiConfig {
        base_url: server.base_url(),
        request_timeout_seconds: 2,
    };
    let api = ApiClient::new(&config).expect("client should build");
    assert!(api.token().is_none());

    let auth = api.login("ada@example.com", "pw").await.expect("login");

    mock.assert_async().await;
    assert_eq!(auth.token, "jwt-123");
    assert_eq!(auth.user.username, "ada");
}

#[tokio::test]
async fn malformed_channel_list_is_a_decode_error() {
    let server = MockServer::start_async().await;

    let _mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/channels");
            then.status(200).json_body(json!({"channels": "nope"}));
        })
        .await;

    let err = client(&server)
        .list_channels()
        .await
        .expect_err("object is not a channel list");
    assert!(matches!(err, ApiError::Decode { .. }));
}
