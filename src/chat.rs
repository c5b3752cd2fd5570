//! Polling for help-request chat messages
//!
//! The backend has no push channel for chat, so messages are fetched on a
//! fixed interval. Failed polls are logged and skipped; there is no backoff.
//! A lost session is the exception: it is yielded once and the stream ends,
//! since every later poll would fail the same way. Dropping the stream stops
//! polling.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use tokio::time::MissedTickBehavior;

use crate::api::ApiClient;
use crate::error::{AppError, Result};
use crate::models::ChatMessage;

pub struct ChatPoller {
    client: Arc<ApiClient>,
    interval: Duration,
}

impl ChatPoller {
    pub fn new(client: Arc<ApiClient>, interval: Duration) -> Self {
        Self { client, interval }
    }

    /// Stream of message batches not seen before, oldest first
    ///
    /// The first poll happens immediately and yields the existing history.
    pub fn watch(
        &self,
        help_request_id: i64,
    ) -> impl Stream<Item = Result<Vec<ChatMessage>>> + Send {
        let client = Arc::clone(&self.client);
        let period = self.interval;

        async_stream::stream! {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut seen: HashSet<i64> = HashSet::new();

            loop {
                ticker.tick().await;

                let messages = match client.list_chat_messages(help_request_id).await {
                    Ok(messages) => messages,
                    Err(e @ (AppError::SessionExpired | AppError::NotAuthenticated)) => {
                        tracing::warn!(help_request_id, "Chat polling stopped: {}", e);
                        yield Err(e);
                        return;
                    }
                    Err(e) => {
                        tracing::warn!(help_request_id, "Chat poll failed: {}", e);
                        continue;
                    }
                };

                let fresh = take_unseen(&mut seen, messages);
                if !fresh.is_empty() {
                    tracing::debug!(help_request_id, count = fresh.len(), "New chat messages");
                    yield Ok(fresh);
                }
            }
        }
    }
}

fn take_unseen(seen: &mut HashSet<i64>, messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
    let mut fresh: Vec<ChatMessage> = messages
        .into_iter()
        .filter(|m| seen.insert(m.id))
        .collect();
    fresh.sort_by(|a, b| a.sent_at.cmp(&b.sent_at).then(a.id.cmp(&b.id)));
    fresh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: i64, content: &str) -> ChatMessage {
        ChatMessage {
            id,
            author_id: 1,
            author_name: None,
            content: content.to_string(),
            sent_at: None,
        }
    }

    #[test]
    fn test_take_unseen_dedupes() {
        let mut seen = HashSet::new();
        let first = take_unseen(&mut seen, vec![message(2, "b"), message(1, "a")]);
        assert_eq!(first.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 2]);

        let second = take_unseen(
            &mut seen,
            vec![message(1, "a"), message(2, "b"), message(3, "c")],
        );
        assert_eq!(second, vec![message(3, "c")]);

        let third = take_unseen(&mut seen, vec![message(1, "a")]);
        assert!(third.is_empty());
    }
}
