//! Help requests and their chat

use serde::Serialize;

use super::ApiClient;
use crate::error::{AppError, Result};
use crate::models::{ChatMessage, HelpRequest};

#[derive(Debug, Serialize)]
struct NewMessage<'a> {
    conteudo: &'a str,
}

impl ApiClient {
    pub async fn list_help_requests(&self) -> Result<Vec<HelpRequest>> {
        self.get_collection("/api/pedidos-ajuda").await
    }

    pub async fn list_chat_messages(&self, help_request_id: i64) -> Result<Vec<ChatMessage>> {
        self.get_collection(&format!("/api/pedidos-ajuda/{}/mensagens", help_request_id))
            .await
    }

    pub async fn send_chat_message(
        &self,
        help_request_id: i64,
        content: &str,
    ) -> Result<ChatMessage> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::BadRequest("message is empty".to_string()));
        }

        self.post_json(
            &format!("/api/pedidos-ajuda/{}/mensagens", help_request_id),
            &NewMessage { conteudo: content },
        )
        .await
    }
}
