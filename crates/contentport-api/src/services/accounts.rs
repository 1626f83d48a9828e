use contentport_integrations::UserTokens;
use contentport_persist::AccountProfile;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// The user's active account; `missing` is the error when none is set
pub async fn require_active(
    state: &AppState,
    email: &str,
    missing: impl FnOnce() -> ApiError,
) -> ApiResult<AccountProfile> {
    state.accounts().active(email).await?.ok_or_else(missing)
}

/// OAuth tokens of a connected account, `None` when the record or its tokens are missing
pub async fn account_tokens(
    state: &AppState,
    user_id: &str,
    account_id: &str,
) -> ApiResult<Option<UserTokens>> {
    let record = state.records.get_account(user_id, account_id).await?;

    Ok(record.as_ref().and_then(|record| record.oauth_tokens()).map(
        |(token, secret)| UserTokens {
            access_token: token.to_string(),
            access_secret: secret.to_string(),
        },
    ))
}
