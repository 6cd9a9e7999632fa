use anyhow::{Context, Result};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatReply {
    pub response: Option<String>,
}

/// One flagged transaction, as returned by the upload endpoint. Records carry
/// no identity beyond their position in the response.
#[derive(Debug, Clone, Deserialize)]
pub struct AnomalyRecord {
    pub transaction_id: String,
    pub amount: Amount,
    pub anomaly: String,
    pub timestamp: String,
}

/// The server serializes amounts straight out of its dataframe, so they may
/// arrive as JSON numbers or as strings depending on the source column.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Number(value) => write!(f, "{value}"),
            Amount::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadResult {
    #[serde(default)]
    pub anomalies: Vec<AnomalyRecord>,
    pub pdf_url: Option<String>,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub async fn send_message(&self, message: &str) -> Result<ChatReply> {
        let response = self
            .http
            .post(format!("{}/chat", self.base_url))
            .json(&ChatRequest { message })
            .send()
            .await
            .context("Failed to send chat request")?
            .error_for_status()
            .context("Chat endpoint returned an error")?;

        response
            .json()
            .await
            .context("Failed to parse chat response")
    }

    pub async fn upload_csv(&self, path: &Path) -> Result<UploadResult> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read `{}`", path.display()))?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_owned());

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("text/csv")
            .context("Failed to build multipart file part")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .context("Failed to send upload request")?
            .error_for_status()
            .context("Upload endpoint returned an error")?;

        response
            .json()
            .await
            .context("Failed to parse upload response")
    }

    /// Streams a report to disk. The upload endpoint announces reports with a
    /// server-relative URL (`/download/<filename>`), so `url` is resolved
    /// against the configured base URL unless it is already absolute.
    pub async fn download_report(&self, url: &str, dest: &Path) -> Result<()> {
        let response = self
            .http
            .get(resolve_url(&self.base_url, url))
            .send()
            .await
            .context("Failed to request report download")?
            .error_for_status()
            .context("Report download returned an error")?;

        let mut file = File::create(dest)
            .await
            .with_context(|| format!("Failed to create `{}`", dest.display()))?;

        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Failed to read chunk from report download")?;
            file.write_all(&chunk)
                .await
                .context("Failed to write chunk to report file")?;
        }

        file.flush().await.context("Failed to flush report file")?;

        Ok(())
    }
}

fn resolve_url(base: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_owned()
    } else {
        format!("{}/{}", base, url.trim_start_matches('/'))
    }
}
