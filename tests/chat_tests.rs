//! Chat polling integration tests

use std::time::Duration;

use futures::StreamExt;
use serde_json::json;
use solidario::chat::ChatPoller;
use solidario::moderation::UserRole;
use solidario::AppError;
use tokio::time::timeout;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

fn message(id: i64, content: &str) -> serde_json::Value {
    json!({"id": id, "autorId": 1, "autorNome": "Ana", "conteudo": content,
           "dataEnvio": format!("2026-05-01T10:00:0{}Z", id)})
}

#[tokio::test]
async fn test_poller_yields_history_then_new_messages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/pedidos-ajuda/12/mensagens"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": [message(1, "Olá")]})),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/pedidos-ajuda/12/mensagens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [message(1, "Olá"), message(2, "Preciso de ajuda")]
        })))
        .mount(&server)
        .await;

    let client = common::logged_in_client(&server, &common::user(UserRole::User)).await;
    let poller = ChatPoller::new(client, Duration::from_millis(20));
    let stream = poller.watch(12);
    futures::pin_mut!(stream);

    let first = timeout(Duration::from_secs(2), stream.next())
        .await
        .expect("first poll timed out")
        .unwrap()
        .unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].content, "Olá");

    let second = timeout(Duration::from_secs(2), stream.next())
        .await
        .expect("second poll timed out")
        .unwrap()
        .unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].id, 2);
}

#[tokio::test]
async fn test_poller_survives_failed_polls() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/pedidos-ajuda/13/mensagens"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/pedidos-ajuda/13/mensagens"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": [message(3, "Tudo certo")]})),
        )
        .mount(&server)
        .await;

    let client = common::logged_in_client(&server, &common::user(UserRole::User)).await;
    let poller = ChatPoller::new(client, Duration::from_millis(20));
    let stream = poller.watch(13);
    futures::pin_mut!(stream);

    let batch = timeout(Duration::from_secs(2), stream.next())
        .await
        .expect("poll timed out")
        .unwrap()
        .unwrap();
    assert_eq!(batch[0].content, "Tudo certo");
}

#[tokio::test]
async fn test_poller_ends_when_session_expires() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/pedidos-ajuda/14/mensagens"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::logged_in_client(&server, &common::user(UserRole::User)).await;
    let poller = ChatPoller::new(client.clone(), Duration::from_millis(20));
    let stream = poller.watch(14);
    futures::pin_mut!(stream);

    let first = timeout(Duration::from_secs(2), stream.next())
        .await
        .expect("poll timed out")
        .unwrap();
    assert!(matches!(first, Err(AppError::SessionExpired)));

    let end = timeout(Duration::from_secs(2), stream.next())
        .await
        .expect("stream kept polling");
    assert!(end.is_none());
    assert!(client.store().load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_help_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/pedidos-ajuda"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
            {"id": 12, "titulo": "Cestas básicas", "descricao": "Família de 5",
             "status": "aberto", "usuarioId": 100}
        ]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::logged_in_client(&server, &common::user(UserRole::User)).await;
    let requests = client.list_help_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].title, "Cestas básicas");
    assert_eq!(requests[0].status, "aberto");
}

#[tokio::test]
async fn test_send_chat_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/pedidos-ajuda/12/mensagens"))
        .and(body_json(json!({"conteudo": "Estou a caminho"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(message(4, "Estou a caminho")))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::logged_in_client(&server, &common::user(UserRole::User)).await;
    assert!(client.send_chat_message(12, "   ").await.is_err());

    let sent = client
        .send_chat_message(12, "Estou a caminho")
        .await
        .unwrap();
    assert_eq!(sent.id, 4);
}
