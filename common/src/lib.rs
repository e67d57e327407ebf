use std::time::Duration;

pub mod api;
pub mod client;
pub mod config;
pub mod download;
pub mod duration;
pub mod error;
pub mod job;
pub mod poll;
pub mod summary;
pub mod viewer;

pub use api::{CreateJobRequest, CreateJobResponse};
pub use client::{FastfoldClient, ResultsSource};
pub use config::{Config, Overrides, Settings};
pub use download::{download_structures, plan_downloads, OutputTarget, PlannedDownload};
pub use duration::parse_duration;
pub use error::{Error, Result};
pub use job::{JobId, JobInfo, JobResults, JobStatus, PredictionPayload, SequenceEntry};
pub use poll::{wait_for_completion, PollConfig, PollOutcome};
pub use summary::Summary;
pub use viewer::viewer_link;

pub const DEFAULT_BASE_URL: &str = "https://api.fastfold.ai";
pub const DEFAULT_MODEL: &str = "boltz-2";

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(900);

// Metadata calls are small; structure files can be large.
pub const API_TIMEOUT: Duration = Duration::from_secs(30);
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);
pub const DOWNLOAD_CHUNK_SIZE: usize = 8192;
