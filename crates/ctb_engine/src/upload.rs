use std::path::Path;
use std::time::Duration;

use ctb_logging::{ctb_debug, ctb_warn};
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use url::Url;

use crate::{render_json, FailureKind, RequestId, UploadError, UploadReply};

/// Backend endpoint that runs the CTB agent on an uploaded workbook.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/run_ctb/";
/// Multipart field carrying the file.
pub const DEFAULT_FIELD_NAME: &str = "file";

const FALLBACK_FILE_NAME: &str = "upload";

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub endpoint: String,
    pub field_name: String,
    pub connect_timeout: Duration,
    /// Overall request timeout; `None` waits for the backend indefinitely.
    pub request_timeout: Option<Duration>,
    pub max_response_bytes: u64,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            field_name: DEFAULT_FIELD_NAME.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            max_response_bytes: 10 * 1024 * 1024,
        }
    }
}

impl UploadSettings {
    /// Parses the endpoint, accepting only http and https URLs.
    pub fn endpoint_url(&self) -> Result<Url, UploadError> {
        let url = Url::parse(&self.endpoint)
            .map_err(|err| UploadError::new(FailureKind::InvalidEndpoint, err.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(UploadError::new(
                FailureKind::InvalidEndpoint,
                format!("unsupported scheme {other}"),
            )),
        }
    }
}

#[async_trait::async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, request_id: RequestId, path: &Path) -> Result<UploadReply, UploadError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestUploader {
    settings: UploadSettings,
    endpoint: Url,
    client: reqwest::Client,
}

impl ReqwestUploader {
    pub fn new(settings: UploadSettings) -> Result<Self, UploadError> {
        let endpoint = settings.endpoint_url()?;

        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| UploadError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            endpoint,
            client,
        })
    }

    async fn build_form(&self, path: &Path) -> Result<Form, UploadError> {
        let bytes = tokio::fs::read(path).await.map_err(|err| {
            UploadError::new(FailureKind::ReadFile, format!("{}: {err}", path.display()))
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime_for(path))
            .map_err(|err| UploadError::new(FailureKind::Network, err.to_string()))?;

        Ok(Form::new().part(self.settings.field_name.clone(), part))
    }
}

#[async_trait::async_trait]
impl Uploader for ReqwestUploader {
    async fn upload(&self, request_id: RequestId, path: &Path) -> Result<UploadReply, UploadError> {
        let form = self.build_form(path).await?;
        ctb_debug!(
            "POST request_id={} file={} endpoint={}",
            request_id,
            path.display(),
            self.endpoint
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            // The backend reports its own errors as JSON; those are still shown.
            ctb_warn!("Upload request_id={} returned {}", request_id, status);
        }

        let max_bytes = self.settings.max_response_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(UploadError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "declared by Content-Length",
                ));
            }
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(UploadError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "body exceeded the limit while streaming",
                ));
            }
            body.extend_from_slice(&chunk);
        }
        ctb_debug!(
            "Upload request_id={} received {} bytes",
            request_id,
            body.len()
        );

        let body = render_json(&body)?;
        Ok(UploadReply {
            status: status.as_u16(),
            body,
        })
    }
}

fn mime_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("xls") => "application/vnd.ms-excel",
        Some("csv") => "text/csv",
        _ => "application/octet-stream",
    }
}

fn map_reqwest_error(err: reqwest::Error) -> UploadError {
    if err.is_timeout() {
        return UploadError::new(FailureKind::Timeout, err.to_string());
    }
    UploadError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_target_local_backend() {
        let settings = UploadSettings::default();
        assert_eq!(settings.endpoint, "http://localhost:8000/run_ctb/");
        assert_eq!(settings.field_name, "file");
        assert_eq!(settings.request_timeout, None);
        assert_eq!(settings.endpoint_url().unwrap().path(), "/run_ctb/");
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let settings = UploadSettings {
            endpoint: "ftp://localhost/run_ctb/".to_string(),
            ..UploadSettings::default()
        };
        let err = settings.endpoint_url().unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidEndpoint);

        let settings = UploadSettings {
            endpoint: "not a url".to_string(),
            ..UploadSettings::default()
        };
        assert_eq!(
            ReqwestUploader::new(settings).unwrap_err().kind,
            FailureKind::InvalidEndpoint
        );
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(
            mime_for(Path::new("ctb.XLSX")),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert_eq!(mime_for(Path::new("parts.csv")), "text/csv");
        assert_eq!(mime_for(Path::new("notes")), "application/octet-stream");
    }
}
