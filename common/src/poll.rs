//! Polling a job until it reaches a terminal status.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use crate::client::ResultsSource;
use crate::error::Result;
use crate::job::{JobId, JobResults, JobStatus};

/// Lower bound on the sleep between polls.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: crate::DEFAULT_POLL_INTERVAL,
            timeout: crate::DEFAULT_POLL_TIMEOUT,
        }
    }
}

#[derive(Debug)]
pub enum PollOutcome {
    Completed(JobResults),
    /// The job ended in FAILED or STOPPED.
    Failed(JobResults),
    TimedOut { last_status: JobStatus },
    Interrupted { last_status: JobStatus },
}

impl PollOutcome {
    /// Process exit code for the `wait` command.
    pub fn exit_code(&self) -> u8 {
        match self {
            PollOutcome::Completed(_) => 0,
            PollOutcome::Failed(_) => 1,
            PollOutcome::TimedOut { .. } => 2,
            PollOutcome::Interrupted { .. } => 130,
        }
    }

    /// The final document, for the two terminal outcomes.
    pub fn results(&self) -> Option<&JobResults> {
        match self {
            PollOutcome::Completed(r) | PollOutcome::Failed(r) => Some(r),
            _ => None,
        }
    }
}

/// Poll `source` until the job is COMPLETED, FAILED or STOPPED.
///
/// `on_status` sees every observed status. The loop gives up with
/// `TimedOut` once more than `config.timeout` has elapsed after a
/// non-terminal poll, and with `Interrupted` if `shutdown` resolves while
/// sleeping. Fetch errors end the loop immediately.
pub async fn wait_for_completion<S, F, C>(
    source: &S,
    job_id: &JobId,
    config: &PollConfig,
    shutdown: F,
    mut on_status: C,
) -> Result<PollOutcome>
where
    S: ResultsSource + ?Sized,
    F: Future<Output = ()>,
    C: FnMut(&JobStatus),
{
    let start = Instant::now();
    let interval = config.interval.max(MIN_POLL_INTERVAL);
    tokio::pin!(shutdown);

    loop {
        let results = source.get_results(job_id).await?;
        let status = results.status().clone();
        on_status(&status);

        match status {
            JobStatus::Completed => return Ok(PollOutcome::Completed(results)),
            JobStatus::Failed | JobStatus::Stopped => return Ok(PollOutcome::Failed(results)),
            _ => {}
        }

        if start.elapsed() > config.timeout {
            log::warn!("Gave up on job {} after {:?}", job_id, config.timeout);
            return Ok(PollOutcome::TimedOut { last_status: status });
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = &mut shutdown => {
                log::info!("Interrupted while waiting for job {}", job_id);
                return Ok(PollOutcome::Interrupted { last_status: status });
            }
        }
    }
}
