use reqwest::Method;
use reqwest::multipart::{Form, Part};

use super::{ApiClient, ApiError};
use crate::models::{DocumentStatus, LogEntryList, ScraperStatus, UploadedFile};

/// Admin endpoints. The backend requires a bearer token on all of them and
/// answers 401 otherwise.
pub struct AdminApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AdminApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// upload_document
    ///
    /// `POST /v1/admin/upload` as `multipart/form-data` with the document in the
    /// `file` field.
    pub async fn upload_document(&self, file: UploadedFile) -> Result<DocumentStatus, ApiError> {
        let mut part = Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(content_type) = file.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }

        let request = self
            .client
            .request(Method::POST, "/v1/admin/upload")?
            .multipart(Form::new().part("file", part));
        self.client.json(request).await
    }

    /// `GET /v1/admin/logs`
    pub async fn logs(&self) -> Result<LogEntryList, ApiError> {
        let request = self.client.request(Method::GET, "/v1/admin/logs")?;
        self.client.json(request).await
    }

    /// `POST /v1/admin/scrape`
    pub async fn trigger_scraper(&self) -> Result<ScraperStatus, ApiError> {
        let request = self.client.request(Method::POST, "/v1/admin/scrape")?;
        self.client.json(request).await
    }
}
