use std::path::Path;
use std::time::Duration;

use anyhow::{Context, anyhow};
use reqwest::blocking::{Client, Response, multipart};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Compact catalog entry as returned by the server.
#[derive(Debug, Deserialize)]
pub struct ImageSummary {
    pub id: String,
    pub title: String,
    pub original_url: String,
}

#[derive(Debug, Deserialize)]
pub struct PageInfo {
    pub number: u64,
    pub has_next: bool,
}

#[derive(Debug, Deserialize)]
pub struct ImagePage {
    pub images: Vec<ImageSummary>,
    pub pagination: PageInfo,
}

#[derive(Debug, Deserialize)]
struct UploadEntryError {
    error: String,
}

/// Union of the upload success, batch failure and error bodies.
#[derive(Debug, Deserialize)]
struct UploadReply {
    #[serde(default)]
    images: Vec<ImageSummary>,
    #[serde(default)]
    errors: Option<Vec<UploadEntryError>>,
    error: Option<String>,
    message: Option<String>,
}

/// Blocking client for the Folio HTTP API.
pub struct ApiClient {
    base: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base: &str) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Upload one file and return its catalog entry.
    pub fn upload(
        &self,
        path: &Path,
        folder: &str,
        title: &str,
        description: &str,
    ) -> anyhow::Result<ImageSummary> {
        let part = multipart::Part::file(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let form = multipart::Form::new()
            .part("images", part)
            .text("folder", folder.to_string())
            .text("title", title.to_string())
            .text("description", description.to_string());

        let res = self
            .http
            .post(self.url("/api/v1/media"))
            .multipart(form)
            .send()
            .context("Upload request failed")?;
        let status = res.status();
        let reply: UploadReply = read_json(res)?;

        if !status.is_success() {
            let message = reply
                .error
                .or(reply.message)
                .unwrap_or_else(|| format!("server answered {status}"));
            return Err(anyhow!(message));
        }

        if let Some(first) = reply.errors.as_ref().and_then(|e| e.first()) {
            return Err(anyhow!(first.error.clone()));
        }

        reply
            .images
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("server returned no image"))
    }

    pub fn list_page(&self, page: u64) -> anyhow::Result<ImagePage> {
        self.query_media(&[("page", page.to_string())])
    }

    /// First catalog entry titled exactly `title`, if any.
    pub fn find_by_title(&self, title: &str) -> anyhow::Result<Option<ImageSummary>> {
        let page = self.query_media(&[("title", title.to_string())])?;
        Ok(page.images.into_iter().next())
    }

    fn query_media(&self, params: &[(&str, String)]) -> anyhow::Result<ImagePage> {
        let res = self
            .http
            .get(self.url("/api/v1/media"))
            .query(&[("mode", "compact")])
            .query(params)
            .send()
            .context("List request failed")?;
        let status = res.status();
        if !status.is_success() {
            return Err(anyhow!("server answered {status}"));
        }
        read_json(res)
    }
}

fn read_json<T: DeserializeOwned>(res: Response) -> anyhow::Result<T> {
    let text = res.text().context("Failed to read response body")?;
    serde_json::from_str(&text).with_context(|| format!("Unexpected response: {text}"))
}
