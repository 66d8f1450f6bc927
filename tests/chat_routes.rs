//! End-to-end tests for the chat endpoints.

mod helpers;

use helpers::{start_server, DEFAULT_REGISTRY};
use serde_json::Value;

async fn send(
    client: &reqwest::Client,
    url: &str,
    receiver: &str,
    message: &str,
    apikey: &str,
) -> (u16, Value) {
    let response = client
        .post(url)
        .form(&[
            ("receiverEmail", receiver),
            ("message", message),
            ("apikey", apikey),
        ])
        .send()
        .await
        .expect("request");
    let status = response.status().as_u16();
    (status, response.json().await.expect("json body"))
}

#[tokio::test]
async fn test_send_and_read_conversation() {
    let server = start_server(DEFAULT_REGISTRY).await;
    let ana = server.account("ana@example.com", "key-ana").await;
    let bo = server.account("bo@example.com", "key-bo").await;
    let client = reqwest::Client::new();
    let send_url = server.url("/api/send-message");

    let (status, body) = send(&client, &send_url, "bo@example.com", "hi bo", &ana).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"]["senderEmail"], "ana@example.com");
    assert_eq!(body["message"]["receiverEmail"], "bo@example.com");

    let (status, _) = send(&client, &send_url, "ana@example.com", "hi ana", &bo).await;
    assert_eq!(status, 200);

    let body: Value = client
        .get(server.url(&format!("/api/messages?apikey={bo}&chatWith=ana@example.com")))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    let messages = body["messages"].as_array().expect("messages array");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["message"], "hi bo");
    assert_eq!(messages[0]["isSent"], false);
    assert_eq!(messages[1]["message"], "hi ana");
    assert_eq!(messages[1]["isSent"], true);

    let body: Value = client
        .get(server.url(&format!("/api/chat-users?apikey={ana}")))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(body["users"][0]["email"], "bo@example.com");
    assert_eq!(body["users"][0]["lastMessage"], "hi ana");
}

#[tokio::test]
async fn test_send_message_rejections() {
    let server = start_server(DEFAULT_REGISTRY).await;
    let ana = server.account("ana@example.com", "key-ana").await;
    let client = reqwest::Client::new();
    let send_url = server.url("/api/send-message");

    let (status, body) = send(&client, &send_url, "ghost@example.com", "hello?", &ana).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Receiver not found");

    let (status, body) = send(&client, &send_url, "ana@example.com", "me", &ana).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Cannot send message to yourself");

    let (status, body) = send(&client, &send_url, "ana@example.com", "x", "wrong").await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Invalid API key");
}

#[tokio::test]
async fn test_history_requires_key() {
    let server = start_server(DEFAULT_REGISTRY).await;

    let response = reqwest::get(server.url("/api/messages"))
        .await
        .expect("request");
    assert_eq!(response.status().as_u16(), 401);
}
