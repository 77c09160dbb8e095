use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use review_core::{FieldRow, JobProgress};
use url::Url;

use crate::wire;
use crate::{FailureKind, JobError, TimeReport};

/// Suffix of the annotated page image the backend renders next to each document.
pub const DEBUG_IMAGE_SUFFIX: &str = "_debug.png";

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Applies to polls, listings, downloads and time reports.
    pub request_timeout: Duration,
    /// Job start can run for minutes; `None` waits indefinitely.
    pub start_timeout: Option<Duration>,
    pub max_document_bytes: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            start_timeout: None,
            max_document_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Control surface of the extraction backend.
#[async_trait::async_trait]
pub trait JobControl: Send + Sync {
    async fn reset_progress(&self) -> Result<(), JobError>;

    /// Runs the extraction and returns its rows once it finishes.
    async fn start_job(&self, filename: &str) -> Result<Vec<FieldRow>, JobError>;

    async fn get_progress(&self, filename: Option<&str>) -> Result<JobProgress, JobError>;

    async fn list_files(&self) -> Result<Vec<String>, JobError>;
}

#[async_trait::async_trait]
pub trait TimeReporter: Send + Sync {
    async fn report_time(&self, report: &TimeReport) -> Result<(), JobError>;
}

#[async_trait::async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch_document(&self, name: &str) -> Result<Vec<u8>, JobError>;
}

/// Name of the debug image belonging to `filename`: extension stripped,
/// [`DEBUG_IMAGE_SUFFIX`] appended.
pub fn debug_image_name(filename: &str) -> String {
    let stem = Path::new(filename).with_extension("");
    format!("{}{DEBUG_IMAGE_SUFFIX}", stem.to_string_lossy())
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    settings: BackendSettings,
    base: Url,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, JobError> {
        let mut base = Url::parse(&settings.base_url)
            .map_err(|err| JobError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = build_client(&settings)?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> Result<Url, JobError> {
        self.base
            .join(path)
            .map_err(|err| JobError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    fn document_url(&self, name: &str) -> Result<Url, JobError> {
        let mut url = self.endpoint("pdf/")?;
        url.path_segments_mut()
            .map_err(|()| JobError::new(FailureKind::InvalidUrl, "base url cannot carry a path"))?
            .pop_if_empty()
            .push(name);
        Ok(url)
    }

    async fn post_json(
        &self,
        path: &str,
        body: Vec<u8>,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, JobError> {
        let mut request = self
            .client
            .post(self.endpoint(path)?)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        request.send().await.map_err(map_reqwest_error)
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response, JobError> {
        self.client
            .get(url)
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)
    }
}

#[async_trait::async_trait]
impl JobControl for HttpBackend {
    async fn reset_progress(&self) -> Result<(), JobError> {
        let response = self
            .post_json("reset-progress", b"{}".to_vec(), Some(self.settings.request_timeout))
            .await?;
        ensure_success(response).await.map(drop)
    }

    async fn start_job(&self, filename: &str) -> Result<Vec<FieldRow>, JobError> {
        let response = self
            .post_json(
                "run-script",
                wire::run_script_body(filename),
                self.settings.start_timeout,
            )
            .await?;
        // Failed runs answer 400/500 with an `{error}` body; surface that message.
        let body = ensure_success(response).await?;
        wire::parse_rows(&body)
    }

    async fn get_progress(&self, filename: Option<&str>) -> Result<JobProgress, JobError> {
        let mut url = self.endpoint("progress")?;
        if let Some(filename) = filename {
            url.query_pairs_mut().append_pair("filename", filename);
        }
        let body = ensure_success(self.get(url).await?).await?;
        wire::parse_progress(&body)
    }

    async fn list_files(&self) -> Result<Vec<String>, JobError> {
        let body = ensure_success(self.get(self.endpoint("list-files")?).await?).await?;
        wire::parse_file_list(&body)
    }
}

#[async_trait::async_trait]
impl TimeReporter for HttpBackend {
    async fn report_time(&self, report: &TimeReport) -> Result<(), JobError> {
        let response = self
            .post_json(
                "timetrack",
                wire::time_report_body(report),
                Some(self.settings.request_timeout),
            )
            .await?;
        ensure_success(response).await.map(drop)
    }
}

#[async_trait::async_trait]
impl DocumentSource for HttpBackend {
    async fn fetch_document(&self, name: &str) -> Result<Vec<u8>, JobError> {
        let response = self.get(self.document_url(name)?).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(JobError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_document_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(JobError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "document too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(JobError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "document too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

fn build_client(settings: &BackendSettings) -> Result<reqwest::Client, JobError> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .build()
        .map_err(|err| JobError::new(FailureKind::Network, err.to_string()))
}

/// Reads the body; non-2xx statuses become errors, preferring the backend's
/// `{error}` message over the bare status.
async fn ensure_success(response: reqwest::Response) -> Result<Vec<u8>, JobError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_reqwest_error)?.to_vec();
    if status.is_success() {
        return Ok(body);
    }
    match wire::error_message(&body) {
        Some(message) => Err(JobError::new(FailureKind::Backend, message)),
        None => Err(JobError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        )),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> JobError {
    if err.is_timeout() {
        return JobError::new(FailureKind::Timeout, err.to_string());
    }
    JobError::new(FailureKind::Network, err.to_string())
}
