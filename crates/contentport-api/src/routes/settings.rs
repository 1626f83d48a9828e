use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use contentport_persist::{AccountProfile, RateLimiter, User};

use crate::{
    error::{ApiError, ApiResult},
    extract::ApiJson,
    routes::file::SuccessResponse,
    services::accounts::account_tokens,
    state::AppState,
};

const TWITTER_PROVIDER: &str = "twitter";

#[derive(Debug, Deserialize)]
pub struct AccountIdRequest {
    pub account_id: String,
}

#[derive(Debug, Serialize)]
pub struct LimitResponse {
    pub remaining: u32,
    /// Unix millis at which the current window resets
    pub reset: i64,
}

/// Connected account, merged with its cached profile when one exists
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AccountSummary {
    Profile {
        #[serde(flatten)]
        profile: AccountProfile,
        is_active: bool,
    },
    Record {
        id: String,
        is_active: bool,
    },
}

#[derive(Debug, Serialize)]
pub struct AccountsResponse {
    pub accounts: Vec<AccountSummary>,
}

#[derive(Debug, Serialize)]
pub struct ActiveAccountResponse {
    pub account: Option<AccountProfile>,
}

#[derive(Debug, Serialize)]
pub struct SwitchAccountResponse {
    pub success: bool,
    pub account: AccountProfile,
}

#[derive(Debug, Serialize)]
pub struct RefreshProfileResponse {
    pub success: bool,
    pub account: AccountProfile,
    pub profile_image_url: String,
}

fn account_not_found(account_id: &str) -> ApiError {
    ApiError::NotFound(format!("Account \"{}\" not found", account_id))
}

/// Remaining chat messages in the current window
pub async fn limit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> ApiResult<Json<LimitResponse>> {
    let decision = RateLimiter::for_plan(user.plan, state.kv.clone())
        .get_remaining(&user.email)
        .await?;

    Ok(Json(LimitResponse {
        remaining: decision.remaining,
        reset: decision.reset,
    }))
}

pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<AccountIdRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let accounts = state.accounts();

    if let Some(active) = accounts.active(&user.email).await? {
        if active.id == req.account_id {
            accounts.clear_active(&user.email).await?;
        }
    }

    state.records.delete_account(&user.id, &req.account_id).await?;
    accounts.delete_profile(&user.email, &req.account_id).await?;

    tracing::info!(account_id = %req.account_id, "Account disconnected");
    Ok(Json(SuccessResponse { success: true }))
}

/// Twitter accounts of the user, newest first
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> ApiResult<Json<AccountsResponse>> {
    let repo = state.accounts();
    let records = state.records.list_accounts(&user.id, TWITTER_PROVIDER).await?;
    let active_id = repo.active(&user.email).await?.map(|active| active.id);

    let mut accounts = Vec::with_capacity(records.len());
    for record in records {
        let is_active = active_id.as_deref() == Some(record.id.as_str());
        let summary = match repo.get_profile(&user.email, &record.id).await? {
            Some(profile) => AccountSummary::Profile { profile, is_active },
            None => AccountSummary::Record {
                id: record.id,
                is_active,
            },
        };
        accounts.push(summary);
    }

    Ok(Json(AccountsResponse { accounts }))
}

async fn activate(state: &AppState, email: &str, account_id: &str) -> ApiResult<AccountProfile> {
    let accounts = state.accounts();
    let profile = accounts
        .get_profile(email, account_id)
        .await?
        .ok_or_else(|| account_not_found(account_id))?;

    accounts.set_active(email, &profile).await?;
    Ok(profile)
}

pub async fn connect(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<AccountIdRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    activate(&state, &user.email, &req.account_id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

pub async fn active_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> ApiResult<Json<ActiveAccountResponse>> {
    let account = state.accounts().active(&user.email).await?;
    Ok(Json(ActiveAccountResponse { account }))
}

pub async fn switch_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<AccountIdRequest>,
) -> ApiResult<Json<SwitchAccountResponse>> {
    let account = activate(&state, &user.email, &req.account_id).await?;
    tracing::info!(account_id = %account.id, "Switched active account");

    Ok(Json(SwitchAccountResponse {
        success: true,
        account,
    }))
}

/// Re-read name, username and avatar from Twitter
pub async fn refresh_profile_data(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<AccountIdRequest>,
) -> ApiResult<Json<RefreshProfileResponse>> {
    let accounts = state.accounts();
    let mut profile = accounts
        .get_profile(&user.email, &req.account_id)
        .await?
        .ok_or_else(|| account_not_found(&req.account_id))?;

    let tokens = account_tokens(&state, &user.id, &req.account_id)
        .await?
        .ok_or_else(|| {
            ApiError::BadRequest(
                "Twitter account not connected or access tokens missing".to_string(),
            )
        })?;

    let current = state.twitter.current_user(&tokens).await.map_err(|e| {
        tracing::error!(account_id = %req.account_id, "Failed to refresh profile data: {}", e);
        ApiError::Upstream("Failed to refresh profile data from Twitter".to_string())
    })?;

    profile.profile_image_url = current.profile_image_url.clone();
    profile.name = current.name;
    profile.username = current.username;
    accounts.save_profile(&user.email, &profile).await?;

    if let Some(active) = accounts.active(&user.email).await? {
        if active.id == profile.id {
            accounts.set_active(&user.email, &profile).await?;
        }
    }

    Ok(Json(RefreshProfileResponse {
        success: true,
        account: profile,
        profile_image_url: current.profile_image_url,
    }))
}
