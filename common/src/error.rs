//! Error kinds shared by every command.

use thiserror::Error;
use crate::api::ApiErrorBody;
use crate::job::JobStatus;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Set FASTFOLD_API_KEY or pass --api-key.")]
    MissingApiKey,

    /// The server rejected the credential (401).
    #[error("Unauthorized. Check FASTFOLD_API_KEY or --api-key.")]
    Unauthorized,

    /// The job ID is unknown to the server (404).
    #[error("Job not found.")]
    NotFound,

    /// Malformed request or rate limit (400/429).
    #[error("{status} - {message}")]
    Rejected { status: u16, message: String },

    /// Any other non-2xx response.
    #[error("HTTP error with status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid JSON in response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Response did not contain a jobId.")]
    MissingJobId,

    #[error("Job status is {status}, not COMPLETED. Wait for completion first.")]
    NotCompleted { status: JobStatus },

    #[error("No CIF URLs in results.")]
    NoCifUrls,

    #[error("Job has {count} sequences with structures; use --dir instead of --out.")]
    AmbiguousOutput { count: usize },
}

impl Error {
    /// Map a non-2xx response to an error kind. 400 and 429 carry the
    /// server's `message` when the body is JSON with one, else the raw body.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 => Error::Unauthorized,
            404 => Error::NotFound,
            400 | 429 => {
                let message = serde_json::from_str::<ApiErrorBody>(&body)
                    .ok()
                    .and_then(|b| b.message)
                    .unwrap_or(body);
                Error::Rejected { status, message }
            }
            _ => Error::Http { status, body },
        }
    }

    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read response text".to_string());
        Self::from_status(status, body)
    }
}
