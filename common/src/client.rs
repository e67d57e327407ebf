//! HTTP client for the FastFold jobs API.

use std::path::Path;
use async_trait::async_trait;
use reqwest::{Client, Response};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use crate::api::{CreateJobRequest, CreateJobResponse};
use crate::error::{Error, Result};
use crate::job::{JobId, JobResults};
use crate::{API_TIMEOUT, DOWNLOAD_CHUNK_SIZE, DOWNLOAD_TIMEOUT};

/// Anything that can produce the results document for a job.
#[async_trait]
pub trait ResultsSource {
    async fn get_results(&self, job_id: &JobId) -> Result<JobResults>;
}

#[derive(Clone)]
pub struct FastfoldClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for FastfoldClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastfoldClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl FastfoldClient {
    /// Fails with `MissingApiKey` when the key is empty, before any request
    /// can be made.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::MissingApiKey);
        }
        let client = Client::builder()
            .user_agent(concat!("fastfold-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn jobs_url(&self) -> String {
        format!("{}/v1/jobs", self.base_url)
    }

    fn results_url(&self, job_id: &JobId) -> String {
        format!("{}/v1/jobs/{}/results", self.base_url, job_id)
    }

    /// Submit a job. The returned response is guaranteed to carry a `jobId`.
    pub async fn create_job(&self, request: &CreateJobRequest) -> Result<CreateJobResponse> {
        request.validate()?;
        let url = self.jobs_url();
        log::debug!("POST {} (model {})", url, request.params.model_name);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(API_TIMEOUT)
            .json(request)
            .send()
            .await?;

        let response = check_status(response).await?;
        let created: CreateJobResponse = serde_json::from_slice(&response.bytes().await?)?;
        if created.job_id.is_none() {
            return Err(Error::MissingJobId);
        }
        Ok(created)
    }

    pub async fn fetch_results(&self, job_id: &JobId) -> Result<JobResults> {
        let url = self.results_url(job_id);
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(API_TIMEOUT)
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(serde_json::from_slice(&response.bytes().await?)?)
    }

    /// Stream a structure file to `path`, creating parent directories.
    ///
    /// File URLs are pre-signed, so no credential is sent with them.
    pub async fn download_file(&self, url: &str, path: &Path) -> Result<u64> {
        log::info!("Downloading {} -> {}", url, path.display());

        let mut response = self
            .client
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::from_response(response).await);
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let file = File::create(path).await?;
        match write_body(&mut response, file).await {
            Ok(written) => {
                log::debug!("Wrote {} bytes to {}", written, path.display());
                Ok(written)
            }
            Err(e) => {
                // a truncated structure file is worse than none
                if let Err(rm) = fs::remove_file(path).await {
                    log::warn!("Could not remove partial file {}: {}", path.display(), rm);
                }
                Err(e)
            }
        }
    }
}

async fn write_body(response: &mut Response, file: File) -> Result<u64> {
    let mut writer = BufWriter::with_capacity(DOWNLOAD_CHUNK_SIZE, file);
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        writer.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    writer.flush().await?;
    Ok(written)
}

#[async_trait]
impl ResultsSource for FastfoldClient {
    async fn get_results(&self, job_id: &JobId) -> Result<JobResults> {
        self.fetch_results(job_id).await
    }
}

async fn check_status(response: Response) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        let err = Error::from_response(response).await;
        log::debug!("Request failed: {}", err);
        Err(err)
    }
}
