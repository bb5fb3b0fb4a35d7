use reqwest::multipart;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use anyhow::{Result, anyhow};

/// Reply used when the backend answers 2xx without usable response text.
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't process your request.";

/// Confirmation used when the upload endpoint answers without a message.
pub const DEFAULT_UPLOAD_CONFIRMATION: &str = "File uploaded successfully";

#[derive(Serialize)]
struct ChatRequest {
    message: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    response: Option<String>,
}

/// A file stored behind the drive proxy: identity plus display name only.
/// Content access stays on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize)]
struct FileListResponse {
    #[serde(default)]
    files: Vec<RemoteFile>,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Client for the insights backend proxy. All endpoints share one error
/// shape: any transport failure or non-2xx status is an operation failure.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Send one chat message and return the assistant reply. An empty or
    /// missing `response` field falls back to [`FALLBACK_REPLY`].
    pub async fn chat(&self, message: &str) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);

        let request = ChatRequest {
            message: message.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Chat request failed with status: {}",
                response.status()
            ));
        }

        let chat_response: ChatResponse = response.json().await?;
        Ok(chat_response
            .response
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| FALLBACK_REPLY.to_string()))
    }

    /// Fetch the current drive listing. A missing `files` field is an empty
    /// listing, not an error.
    pub async fn list_files(&self) -> Result<Vec<RemoteFile>> {
        let url = format!("{}/api/drive/files", self.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "File listing failed with status: {}",
                response.status()
            ));
        }

        let list_response: FileListResponse = response.json().await?;
        Ok(list_response.files)
    }

    /// Ask the backend to drop its drive cache.
    pub async fn clear_cache(&self) -> Result<()> {
        let url = format!("{}/api/cache/clear", self.base_url);

        let response = self.client.post(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Cache clear failed with status: {}",
                response.status()
            ));
        }

        Ok(())
    }

    /// Clear the backend cache, then fetch a fresh listing. The listing is
    /// never requested when the cache clear fails.
    pub async fn refresh_files(&self) -> Result<Vec<RemoteFile>> {
        self.clear_cache().await?;
        self.list_files().await
    }

    /// Upload one file, then fetch a fresh listing. A failed relist must not
    /// mask the completed upload: the confirmation is returned either way,
    /// with `None` for the listing when the follow-up fetch failed.
    pub async fn upload_and_list(&self, path: &Path) -> Result<(String, Option<Vec<RemoteFile>>)> {
        let confirmation = self.upload(path).await?;
        let files = match self.list_files().await {
            Ok(files) => Some(files),
            Err(e) => {
                tracing::error!("listing after upload failed: {e:#}");
                None
            }
        };
        Ok((confirmation, files))
    }

    /// Upload one file as a multipart `file` field and return the server
    /// confirmation text, or [`DEFAULT_UPLOAD_CONFIRMATION`] when absent.
    pub async fn upload(&self, path: &Path) -> Result<String> {
        let url = format!("{}/api/upload", self.base_url);

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow!("Invalid upload path: {}", path.display()))?
            .to_string();
        let bytes = tokio::fs::read(path).await?;

        let part = multipart::Part::bytes(bytes).file_name(file_name);
        let form = multipart::Form::new().part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Upload failed with status: {}",
                response.status()
            ));
        }

        let upload_response: UploadResponse = response.json().await?;
        Ok(upload_response
            .message
            .unwrap_or_else(|| DEFAULT_UPLOAD_CONFIRMATION.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn chat_returns_response_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_json(serde_json::json!({"message": "hello"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"response": "hi there"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri());
        let reply = api.chat("hello").await.unwrap();
        assert_eq!(reply, "hi there");
    }

    #[tokio::test]
    async fn chat_falls_back_when_response_field_missing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri());
        let reply = api.chat("hello").await.unwrap();
        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn chat_falls_back_when_response_field_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"response": ""})),
            )
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri());
        let reply = api.chat("hello").await.unwrap();
        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn chat_errors_on_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri());
        assert!(api.chat("hello").await.is_err());
    }

    #[tokio::test]
    async fn list_files_parses_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/drive/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "files": [
                    {"id": "1", "name": "report.pdf"},
                    {"id": "2", "name": "sales.xlsx"}
                ]
            })))
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri());
        let files = api.list_files().await.unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].id, "1");
        assert_eq!(files[1].name, "sales.xlsx");
    }

    #[tokio::test]
    async fn list_files_tolerates_missing_files_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/drive/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri());
        let files = api.list_files().await.unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn refresh_skips_listing_when_cache_clear_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/cache/clear"))
            .respond_with(ResponseTemplate::new(502))
            .expect(1)
            .mount(&server)
            .await;
        // Zero expected calls: the listing must never be requested.
        Mock::given(method("GET"))
            .and(path("/api/drive/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"files": []})))
            .expect(0)
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri());
        assert!(api.refresh_files().await.is_err());
    }

    #[tokio::test]
    async fn refresh_lists_after_successful_cache_clear() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/cache/clear"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/drive/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "files": [{"id": "1", "name": "report.pdf"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri());
        let files = api.refresh_files().await.unwrap();
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn upload_returns_server_confirmation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"message": "Stored report.pdf"})),
            )
            .mount(&server)
            .await;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"contents").unwrap();

        let api = ApiClient::new(&server.uri());
        let confirmation = api.upload(file.path()).await.unwrap();
        assert_eq!(confirmation, "Stored report.pdf");
    }

    #[tokio::test]
    async fn upload_defaults_confirmation_when_message_missing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"contents").unwrap();

        let api = ApiClient::new(&server.uri());
        let confirmation = api.upload(file.path()).await.unwrap();
        assert_eq!(confirmation, DEFAULT_UPLOAD_CONFIRMATION);
    }

    #[tokio::test]
    async fn upload_and_list_returns_fresh_listing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/drive/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "files": [{"id": "1", "name": "report.pdf"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"contents").unwrap();

        let api = ApiClient::new(&server.uri());
        let (confirmation, files) = api.upload_and_list(file.path()).await.unwrap();
        assert_eq!(confirmation, DEFAULT_UPLOAD_CONFIRMATION);
        assert_eq!(files.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upload_and_list_keeps_confirmation_when_relist_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"message": "Stored report.pdf"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/drive/files"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"contents").unwrap();

        let api = ApiClient::new(&server.uri());
        let (confirmation, files) = api.upload_and_list(file.path()).await.unwrap();
        assert_eq!(confirmation, "Stored report.pdf");
        assert!(files.is_none());
    }

    #[tokio::test]
    async fn upload_errors_on_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(413))
            .mount(&server)
            .await;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"contents").unwrap();

        let api = ApiClient::new(&server.uri());
        assert!(api.upload(file.path()).await.is_err());
    }
}
