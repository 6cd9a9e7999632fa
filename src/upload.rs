use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::api::ApiClient;
use crate::view::UploadView;

/// Submits CSV files for screening and keeps track of the latest report the
/// server has produced. There is a single report slot: each successful upload
/// that announces a `pdf_url` replaces the previous target.
pub struct UploadController<V> {
    client: ApiClient,
    view: V,
    report_url: Option<String>,
}

impl<V: UploadView> UploadController<V> {
    pub fn new(client: ApiClient, view: V) -> Self {
        Self {
            client,
            view,
            report_url: None,
        }
    }

    /// Uploads one CSV and renders any anomalies the server flags in it.
    pub async fn submit(&mut self, path: &Path) -> Result<()> {
        if !path.is_file() {
            bail!(
                "`{}` is not a readable file; nothing was uploaded",
                path.display()
            );
        }

        let result = self
            .client
            .upload_csv(path)
            .await
            .context("Upload round-trip failed")?;

        if let Some(error) = result.error {
            bail!("Server rejected the upload: {error}");
        }

        if result.anomalies.is_empty() {
            log::info!("upload response carried no anomalies; nothing to render");
            return Ok(());
        }

        self.view.anomaly_table(&result.anomalies);

        if let Some(url) = result.pdf_url {
            self.view.report_available(&url);
            self.report_url = Some(url);
        }

        Ok(())
    }

    /// Saves the most recently announced report. Errors until an upload has
    /// produced one.
    pub async fn save_report(&self, dest: &Path) -> Result<PathBuf> {
        let url = self
            .report_url
            .as_deref()
            .context("No report available yet; upload a CSV first")?;

        self.client
            .download_report(url, dest)
            .await
            .with_context(|| format!("Failed to save report to `{}`", dest.display()))?;

        Ok(dest.to_owned())
    }
}
