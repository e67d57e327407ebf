use crate::job::JobId;

pub const VIEWER_URL_BASE: &str = "https://cloud.fastfold.ai/mol/new?from=jobs&job_id=";

/// Link to the FastFold cloud viewer for a job. Opening it requires being
/// logged in to the owning account when the job is private.
pub fn viewer_link(job_id: &JobId) -> String {
    format!("{}{}", VIEWER_URL_BASE, job_id)
}
