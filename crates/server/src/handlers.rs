use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use vc_data_fetcher_core::{
    errors::AnalysisError, repo_ref::RepoRef, tokens::UserId, CommitsByAuthor,
};
use vc_data_fetcher_developer_platforms::models::{
    AccessCredential, Contributor, ContributorWithCommits,
};

use crate::{
    errors::ApiError,
    jobs::{self, AnalysisJob},
    AppState,
};

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;

/// Body of the requests that name a repository on behalf of a user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoRequest {
    pub repo_url: String,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitsRequest {
    pub repo_url: String,
    pub user_id: UserId,
    pub author_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub repo_url: String,
    pub user_id: UserId,
    pub callback_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub access_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorListResponse {
    pub contributor_list: Vec<Contributor>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisAccepted {
    pub message: String,
    pub job_id: Uuid,
}

#[instrument(skip_all)]
pub async fn commits(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CommitsRequest>,
) -> Result<Json<CommitsByAuthor>, ApiError> {
    info!(
        user_id = request.user_id,
        repo_url = request.repo_url.as_str(),
        author = request.author_name.as_str(),
        "Received commits request"
    );

    let cancel = state.shutdown.child_token();
    let commits = state
        .analyzer
        .commits_by_author(
            &request.repo_url,
            &request.author_name,
            request.user_id,
            &cancel,
        )
        .await?;

    Ok(Json(commits))
}

#[instrument(skip_all)]
pub async fn contributors(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RepoRequest>,
) -> Result<Json<ContributorListResponse>, ApiError> {
    info!(
        user_id = request.user_id,
        repo_url = request.repo_url.as_str(),
        "Received contributors request"
    );

    let cancel = state.shutdown.child_token();
    let contributor_list = state
        .analyzer
        .contributors(&request.repo_url, request.user_id, &cancel)
        .await?;

    Ok(Json(ContributorListResponse { contributor_list }))
}

pub async fn health() -> &'static str {
    "OK"
}

#[instrument(skip_all)]
pub async fn repository_data(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RepoRequest>,
) -> Result<Json<Vec<ContributorWithCommits>>, ApiError> {
    info!(
        user_id = request.user_id,
        repo_url = request.repo_url.as_str(),
        "Received repository data request"
    );

    let cancel = state.shutdown.child_token();
    let report = state
        .analyzer
        .run(&request.repo_url, request.user_id, &cancel)
        .await?;

    Ok(Json(report))
}

/// Accepts an analysis job and runs it in the background.
///
/// The repository URL and the callback URL are checked up front so that
/// obviously broken requests are rejected before a job id is handed out.
#[instrument(skip_all)]
pub async fn start_analysis(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalysisRequest>,
) -> Result<(StatusCode, Json<AnalysisAccepted>), ApiError> {
    info!(
        user_id = request.user_id,
        repo_url = request.repo_url.as_str(),
        "Received analysis request"
    );

    RepoRef::parse_for_host(
        &request.repo_url,
        &state.analyzer.config().profile_host,
    )?;

    let callback_url = reqwest::Url::parse(request.callback_url.trim())
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .ok_or_else(|| {
            warn!(
                callback_url = request.callback_url.as_str(),
                "Invalid callback URL"
            );
            ApiError::bad_request("Invalid callback URL.")
        })?;

    let job = AnalysisJob {
        id: Uuid::new_v4(),
        repo_url: request.repo_url,
        user_id: request.user_id,
        callback_url,
    };
    let job_id = job.id;
    jobs::spawn_analysis_job(state, job);

    Ok((
        StatusCode::ACCEPTED,
        Json(AnalysisAccepted {
            message: "accepted".to_string(),
            job_id,
        }),
    ))
}

/// Stores the access token of a user, replacing an earlier one.
#[instrument(skip_all)]
pub async fn store_token(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
    Json(request): Json<TokenRequest>,
) -> Result<StatusCode, ApiError> {
    let token = request.access_token.trim();
    if token.is_empty() {
        warn!(user_id, "Rejected empty access token");
        return Err(ApiError::bad_request("The access token must not be empty."));
    }

    state
        .tokens
        .store(user_id, AccessCredential::new(token))
        .await;
    Ok(StatusCode::NO_CONTENT)
}

/// Reports whether a token is stored for the user. The token itself is never
/// returned.
pub async fn token_status(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Value>, ApiError> {
    if state.tokens.has_token(user_id).await {
        Ok(Json(json!({ "status": "connected" })))
    } else {
        Err(AnalysisError::Unauthenticated(user_id).into())
    }
}

#[instrument(skip_all)]
pub async fn validate_repository(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RepoRequest>,
) -> Result<Json<Value>, ApiError> {
    info!(
        user_id = request.user_id,
        repo_url = request.repo_url.as_str(),
        "Received repository validation request"
    );

    let cancel = state.shutdown.child_token();
    state
        .analyzer
        .check_access(&request.repo_url, request.user_id, &cancel)
        .await?;

    Ok(Json(json!({ "status": "accessible" })))
}
