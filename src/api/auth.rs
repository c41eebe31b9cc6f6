use reqwest::Method;

use super::{ApiClient, ApiError};
use crate::models::{LoginRequest, Token};

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `POST /v1/auth/login`. Bad credentials come back as
    /// [`ApiError::Unauthorized`] like any other 401.
    pub async fn login(&self, payload: &LoginRequest) -> Result<Token, ApiError> {
        let request = self
            .client
            .request(Method::POST, "/v1/auth/login")?
            .json(payload);
        self.client.json(request).await
    }
}
