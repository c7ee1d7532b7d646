//! Background analysis jobs and delivery of their results.

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use vc_data_fetcher_core::{errors::AnalysisError, tokens::UserId};
use vc_data_fetcher_developer_platforms::models::ContributorWithCommits;

use crate::AppState;

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;

/// An accepted analysis request.
#[derive(Debug, Clone)]
pub struct AnalysisJob {
    pub id: Uuid,
    pub repo_url: String,
    pub user_id: UserId,
    pub callback_url: Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Completed,
    Failed,
}

/// The body posted to the callback URL when a job ends.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackPayload {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub repo_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_data: Option<Vec<ContributorWithCommits>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl CallbackPayload {
    pub fn completed(job: &AnalysisJob, repo_data: Vec<ContributorWithCommits>) -> Self {
        Self {
            job_id: job.id,
            status: JobStatus::Completed,
            repo_url: job.repo_url.clone(),
            repo_data: Some(repo_data),
            error: None,
            completed_at: Utc::now(),
        }
    }

    /// A failure report. Only the user facing message of the error is included.
    pub fn failed(job: &AnalysisJob, error: &AnalysisError) -> Self {
        Self {
            job_id: job.id,
            status: JobStatus::Failed,
            repo_url: job.repo_url.clone(),
            repo_data: None,
            error: Some(error.user_message().to_string()),
            completed_at: Utc::now(),
        }
    }
}

/// Posts the payload to the callback URL. Delivery is attempted once.
pub async fn deliver_callback(
    client: &reqwest::Client,
    url: &Url,
    payload: &CallbackPayload,
) -> Result<(), reqwest::Error> {
    client
        .post(url.clone())
        .json(payload)
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

/// Runs the analysis of a job and reports the outcome to its callback URL.
///
/// A job cancelled by shutdown reports nothing.
#[instrument(skip(state, job), fields(job_id = %job.id, user_id = job.user_id))]
pub async fn run_analysis_job(state: Arc<AppState>, job: AnalysisJob) {
    info!(repo_url = job.repo_url.as_str(), "Starting analysis job");

    let cancel = state.shutdown.child_token();
    let payload = match state
        .analyzer
        .run(&job.repo_url, job.user_id, &cancel)
        .await
    {
        Ok(report) => CallbackPayload::completed(&job, report),
        Err(AnalysisError::Cancelled) => {
            warn!("Analysis job cancelled. No callback will be sent");
            return;
        }
        Err(e) => {
            error!(error = e.to_string(), "Analysis job failed");
            CallbackPayload::failed(&job, &e)
        }
    };

    let delivery = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            warn!("Shutdown while delivering the analysis callback. Delivery abandoned");
            return;
        }
        result = deliver_callback(&state.callback_client, &job.callback_url, &payload) => result,
    };

    match delivery {
        Ok(()) => info!(status = ?payload.status, "Delivered analysis callback"),
        Err(e) => error!(
            callback_url = job.callback_url.as_str(),
            error = e.to_string(),
            "Failed to deliver analysis callback"
        ),
    }
}

/// Spawns a job on the runtime, tracked so that shutdown can wait for it.
pub fn spawn_analysis_job(state: Arc<AppState>, job: AnalysisJob) -> JoinHandle<()> {
    let tracker = state.jobs.clone();
    tracker.spawn(run_analysis_job(state, job))
}
