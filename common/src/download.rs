//! Deciding which structure files to fetch and where to put them.

use std::path::{Path, PathBuf};
use crate::client::FastfoldClient;
use crate::error::{Error, Result};
use crate::job::{JobId, JobResults, JobStatus};

/// Where the user asked files to go. `out` is an explicit single-file path;
/// `dir` is used for everything else.
#[derive(Debug, Clone)]
pub struct OutputTarget {
    pub out: Option<PathBuf>,
    pub dir: PathBuf,
}

impl Default for OutputTarget {
    fn default() -> Self {
        Self { out: None, dir: PathBuf::from(".") }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDownload {
    pub url: String,
    pub path: PathBuf,
}

/// Work out the downloads for a finished job without touching the network
/// or the filesystem.
///
/// A complex job with a combined structure yields one file, `--out` or
/// `{dir}/{job_id}.cif`. Otherwise each sequence with a structure yields
/// `{dir}/output_{i}.cif`; sequences without one are skipped.
pub fn plan_downloads(
    results: &JobResults,
    job_id: &JobId,
    target: &OutputTarget,
) -> Result<Vec<PlannedDownload>> {
    if results.status() != &JobStatus::Completed {
        return Err(Error::NotCompleted { status: results.status().clone() });
    }

    if let Some(url) = results.complex_cif_url() {
        let path = match &target.out {
            Some(out) => out.clone(),
            None => target.dir.join(format!("{}.cif", job_id)),
        };
        return Ok(vec![PlannedDownload { url: url.to_string(), path }]);
    }

    let urls = results.sequence_cif_urls();
    match (urls.len(), &target.out) {
        (0, _) => Err(Error::NoCifUrls),
        (1, Some(out)) => Ok(vec![PlannedDownload {
            url: urls[0].to_string(),
            path: out.clone(),
        }]),
        (count, Some(_)) => Err(Error::AmbiguousOutput { count }),
        (_, None) => Ok(urls
            .into_iter()
            .enumerate()
            .map(|(i, url)| PlannedDownload {
                url: url.to_string(),
                path: sequence_file_path(&target.dir, i),
            })
            .collect()),
    }
}

fn sequence_file_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("output_{}.cif", index))
}

/// Fetch the results, plan, then download every file in order. Returns the
/// written paths.
pub async fn download_structures(
    client: &FastfoldClient,
    job_id: &JobId,
    target: &OutputTarget,
) -> Result<Vec<PathBuf>> {
    let results = client.fetch_results(job_id).await?;
    let plan = plan_downloads(&results, job_id, target)?;
    log::info!("Job {}: {} structure file(s) to download", job_id, plan.len());

    let mut written = Vec::with_capacity(plan.len());
    for item in plan {
        client.download_file(&item.url, &item.path).await?;
        written.push(item.path);
    }
    Ok(written)
}
