use crate::api::models::{
    AnonymizeRequest, CancelRequest, ColumnsResponse, ConfirmRequest, ConfirmResponse, ErrorBody,
    ManualPreviewRequest, PreviewResponse, SearchReply, SearchResponse, SensitiveWordRequest,
    SensitiveWords, SensitiveWordsResponse, SimilarityRequest, StagedPreview, StatusResponse,
    SubTypesResponse, WordCategory,
};
use crate::api::SearchBackend;
use crate::config::config::ServerConfig;
use crate::data_source::DataSourceId;
use crate::error::ApiError;
use crate::logging::targets;
use crate::query_model::DispatchPayload;
use crate::result_set::ResultRow;
use crate::services::import_staging_service::{ImportFile, ManualRow};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, trace};

/// HTTP+JSON client for the record server
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn import_url(&self, source: DataSourceId, action: &str) -> String {
        self.url(&format!("/api/import/{}/{}", source.as_str(), action))
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        trace!(target: targets::API, "HTTP {} ({} bytes)", status, body.len());
        decode_body(status, &body)
    }

    async fn post_json<T, B>(&self, url: String, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!(target: targets::API, "POST {}", url);
        self.send(self.client.post(url).json(body)).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ApiError> {
        debug!(target: targets::API, "GET {}", url);
        self.send(self.client.get(url)).await
    }
}

/// Decode a response body strictly.
///
/// Non-2xx replies become `Rejected` when they carry a message in the usual
/// envelope, otherwise `Http` with the raw body.
fn decode_body<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    if !(200..300).contains(&status) {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        return Err(match parsed.message {
            Some(message) => ApiError::Rejected {
                message,
                error_type: parsed.error_type,
                missing_columns: parsed.missing_columns.unwrap_or_default(),
            },
            None => ApiError::Http {
                status,
                body: body.to_string(),
            },
        });
    }
    Ok(serde_json::from_str(body)?)
}

#[async_trait(?Send)]
impl SearchBackend for ApiClient {
    async fn fetch_columns(&self, source: DataSourceId) -> Result<Vec<String>, ApiError> {
        let url = self.url("/api/data_columns");
        debug!(target: targets::API, "GET {} source={}", url, source);
        let response: ColumnsResponse = self
            .send(self.client.get(url).query(&[("source", source.as_str())]))
            .await?;
        response.into_columns()
    }

    async fn fetch_record_sub_types(&self, source: DataSourceId) -> Result<Vec<String>, ApiError> {
        let response: SubTypesResponse = self
            .get_json(self.url(&format!("/api/data_types/{}", source.as_str())))
            .await?;
        response.into_types()
    }

    async fn keyword_search(&self, payload: &DispatchPayload) -> Result<SearchReply, ApiError> {
        let response: SearchResponse = self.post_json(self.url("/api/search"), payload).await?;
        response.into_reply()
    }

    async fn similarity_search(
        &self,
        request: &SimilarityRequest,
    ) -> Result<SearchReply, ApiError> {
        let response: SearchResponse = self
            .post_json(self.url("/api/similarity"), request)
            .await?;
        response.into_reply()
    }

    async fn preview_file(
        &self,
        source: DataSourceId,
        file: &ImportFile,
    ) -> Result<StagedPreview, ApiError> {
        let mime = file
            .content_type
            .as_deref()
            .unwrap_or("application/octet-stream");
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(mime)?;
        let form = Form::new()
            .part("file", part)
            .text("dataSource", source.as_str());

        let url = self.import_url(source, "import");
        debug!(target: targets::API, "POST {} ({} bytes)", url, file.bytes.len());
        let response: PreviewResponse = self.send(self.client.post(url).multipart(form)).await?;
        response.into_staged()
    }

    async fn preview_rows(
        &self,
        source: DataSourceId,
        rows: &[ManualRow],
    ) -> Result<StagedPreview, ApiError> {
        let body = ManualPreviewRequest {
            data: rows,
            data_source: source,
        };
        let response: PreviewResponse = self
            .post_json(self.import_url(source, "preview"), &body)
            .await?;
        response.into_staged()
    }

    async fn confirm_import(&self, source: DataSourceId, token: &str) -> Result<u64, ApiError> {
        let body = ConfirmRequest {
            temp_id: token,
            data_source: source,
        };
        let response: ConfirmResponse = self
            .post_json(self.import_url(source, "confirm"), &body)
            .await?;
        response.into_new_count()
    }

    async fn cancel_import(&self, source: DataSourceId, token: &str) -> Result<(), ApiError> {
        let response: StatusResponse = self
            .post_json(self.import_url(source, "cancel"), &CancelRequest { temp_id: token })
            .await?;
        response.into_ack()
    }

    async fn anonymize(&self, request: &AnonymizeRequest) -> Result<Vec<ResultRow>, ApiError> {
        let response: SearchResponse = self
            .post_json(self.url("/api/anonymize"), request)
            .await?;
        response.into_rows()
    }

    async fn list_sensitive_words(&self) -> Result<SensitiveWords, ApiError> {
        let response: SensitiveWordsResponse =
            self.get_json(self.url("/api/sensitive_words")).await?;
        response.into_words()
    }

    async fn add_sensitive_word(
        &self,
        word: &str,
        category: WordCategory,
    ) -> Result<(), ApiError> {
        let body = SensitiveWordRequest { word, category };
        let response: StatusResponse = self
            .post_json(self.url("/api/sensitive_words"), &body)
            .await?;
        response.into_ack()
    }

    async fn remove_sensitive_word(
        &self,
        word: &str,
        category: WordCategory,
    ) -> Result<(), ApiError> {
        let url = self.url("/api/sensitive_words");
        debug!(target: targets::API, "DELETE {}", url);
        let body = SensitiveWordRequest { word, category };
        let response: StatusResponse = self.send(self.client.delete(url).json(&body)).await?;
        response.into_ack()
    }
}
