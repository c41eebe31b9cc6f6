use reqwest::Method;

use super::{ApiClient, ApiError, segment};
use crate::models::{ChatMessage, ChatRequest, ChatResponse, FeedbackRequest};

/// Public chat endpoints. They accept anonymous callers, so a missing session
/// simply means no `Authorization` header.
pub struct ChatApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ChatApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `POST /v1/chat/send`
    pub async fn send(&self, payload: &ChatRequest) -> Result<ChatResponse, ApiError> {
        let request = self
            .client
            .request(Method::POST, "/v1/chat/send")?
            .json(payload);
        self.client.json(request).await
    }

    /// `GET /v1/chat/history/{session_id}`
    pub async fn history(&self, session_id: &str) -> Result<Vec<ChatMessage>, ApiError> {
        let path = format!("/v1/chat/history/{}", segment(session_id));
        let request = self.client.request(Method::GET, &path)?;
        self.client.json(request).await
    }

    /// `POST /v1/chat/feedback/{message_id}`; the response body is ignored.
    pub async fn feedback(
        &self,
        message_id: &str,
        payload: &FeedbackRequest,
    ) -> Result<(), ApiError> {
        let path = format!("/v1/chat/feedback/{}", segment(message_id));
        let request = self.client.request(Method::POST, &path)?.json(payload);
        self.client.execute(request).await?;
        Ok(())
    }
}
