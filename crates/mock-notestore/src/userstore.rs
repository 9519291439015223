//! Account store of the mock service.

use notestore_models::{
    AuthenticationResult, BootstrapInfo, BootstrapProfile, BootstrapSettings, EdamErrorCode,
    PremiumInfo, PublicUserInfo, RpcFault, EDAM_VERSION_MAJOR, EDAM_VERSION_MINOR,
};
use notestore_sdk::Endpoints;
use serde_json::{Map, Value};
use tracing::info;

use crate::service::{arg, reply, unsupported, Ctx, Scope, State};

pub(crate) fn dispatch(
    state: &mut State,
    ctx: &Ctx<'_>,
    method: &str,
    params: &Map<String, Value>,
) -> Result<Value, RpcFault> {
    match method {
        "check_version" => {
            let major: i16 = arg(params, "edam_version_major")?;
            let minor: i16 = arg(params, "edam_version_minor")?;
            reply(major == EDAM_VERSION_MAJOR && minor <= EDAM_VERSION_MINOR)
        }
        "get_bootstrap_info" => reply(BootstrapInfo {
            profiles: vec![BootstrapProfile {
                name: Some("Mock".into()),
                settings: Some(BootstrapSettings {
                    service_host: Some(ctx.service_url.to_string()),
                    enable_sharing: Some(true),
                    ..BootstrapSettings::default()
                }),
            }],
        }),
        "authenticate" | "authenticate_long_session" => authenticate(state, ctx, params),
        "complete_two_factor_authentication" => complete_two_factor(state, ctx, params),
        "revoke_long_session" => {
            let token: String = arg(params, "authentication_token")?;
            state.token(ctx, &token)?;
            if let Some(record) = state.tokens.get_mut(&token) {
                record.revoked = true;
            }
            info!(method, "token revoked");
            reply(())
        }
        "authenticate_to_business" => authenticate_to_business(state, ctx, params),
        "refresh_authentication" => {
            let token: String = arg(params, "authentication_token")?;
            let old = state.usable_token(ctx, &token)?;
            if let Some(record) = state.tokens.get_mut(&token) {
                record.revoked = true;
            }
            let endpoint = endpoint_for(state, ctx, old.user_id, &old.scope)?;
            let (fresh, expires) = state.issue_token(ctx, old.user_id, old.scope, false);
            reply(AuthenticationResult {
                current_time: ctx.now,
                authentication_token: fresh,
                expiration: expires,
                note_store_url: Some(endpoint),
                ..AuthenticationResult::default()
            })
        }
        "get_user" => {
            let token: String = arg(params, "authentication_token")?;
            let record = state.usable_token(ctx, &token)?;
            reply(state.user_record(record.user_id)?)
        }
        "get_public_user_info" => {
            let username: String = arg(params, "username")?;
            let (id, account) = state
                .account_by_name(&username)
                .ok_or_else(|| RpcFault::not_found("User.username", &username))?;
            reply(PublicUserInfo {
                user_id: Some(id),
                shard_id: Some(account.shard_id.clone()),
                username: Some(account.username.clone()),
                note_store_url: Some(Endpoints::note_store(ctx.service_url, &account.shard_id)),
                web_api_url_prefix: Some(Endpoints::web_api_prefix(ctx.service_url, &account.shard_id)),
                ..PublicUserInfo::default()
            })
        }
        "get_premium_info" => {
            let token: String = arg(params, "authentication_token")?;
            state.usable_token(ctx, &token)?;
            reply(PremiumInfo {
                current_time: Some(ctx.now),
                premium: Some(false),
                premium_extendable: Some(true),
                ..PremiumInfo::default()
            })
        }
        "get_note_store_url" => {
            let token: String = arg(params, "authentication_token")?;
            let record = state.usable_token(ctx, &token)?;
            reply(endpoint_for(state, ctx, record.user_id, &record.scope)?)
        }
        other => Err(unsupported(other)),
    }
}

fn authenticate(state: &mut State, ctx: &Ctx<'_>, params: &Map<String, Value>) -> Result<Value, RpcFault> {
    let username: String = arg(params, "username")?;
    let password: String = arg(params, "password")?;
    let supports_two_factor: bool = arg(params, "supports_two_factor")?;

    let (user_id, account) = state
        .account_by_name(&username)
        .ok_or_else(|| RpcFault::user(EdamErrorCode::InvalidAuth, "username"))?;
    if account.password != password {
        return Err(RpcFault::user(EdamErrorCode::InvalidAuth, "password"));
    }
    let needs_second_factor = account.one_time_code.is_some();
    if needs_second_factor && !supports_two_factor {
        return Err(RpcFault::user(EdamErrorCode::TwoFactorRequired, "supportsTwoFactor"));
    }
    let shard = account.shard_id.clone();

    let (token, expires) = state.issue_token(ctx, user_id, Scope::Personal, needs_second_factor);
    info!(username = %username, second_factor = needs_second_factor, "login");
    reply(AuthenticationResult {
        current_time: ctx.now,
        authentication_token: token,
        expiration: expires,
        user: Some(state.user_record(user_id)?),
        note_store_url: Some(Endpoints::note_store(ctx.service_url, &shard)),
        web_api_url_prefix: Some(Endpoints::web_api_prefix(ctx.service_url, &shard)),
        second_factor_required: Some(needs_second_factor),
        second_factor_delivery_hint: needs_second_factor.then(|| "authenticator app".to_string()),
        ..AuthenticationResult::default()
    })
}

fn complete_two_factor(state: &mut State, ctx: &Ctx<'_>, params: &Map<String, Value>) -> Result<Value, RpcFault> {
    let token: String = arg(params, "authentication_token")?;
    let code: String = arg(params, "one_time_code")?;

    let record = state.token(ctx, &token)?;
    if !record.pending_second_factor {
        return Err(RpcFault::user(EdamErrorCode::InvalidAuth, "authenticationToken"));
    }
    let expected = state.account(record.user_id)?.one_time_code.clone();
    if expected.as_deref() != Some(code.as_str()) {
        return Err(RpcFault::user(EdamErrorCode::InvalidAuth, "oneTimeCode"));
    }
    if let Some(stored) = state.tokens.get_mut(&token) {
        stored.pending_second_factor = false;
    }

    let endpoint = endpoint_for(state, ctx, record.user_id, &record.scope)?;
    reply(AuthenticationResult {
        current_time: ctx.now,
        authentication_token: token,
        expiration: record.expires_at,
        user: Some(state.user_record(record.user_id)?),
        note_store_url: Some(endpoint),
        ..AuthenticationResult::default()
    })
}

fn authenticate_to_business(
    state: &mut State,
    ctx: &Ctx<'_>,
    params: &Map<String, Value>,
) -> Result<Value, RpcFault> {
    let token: String = arg(params, "authentication_token")?;
    let record = state.usable_token(ctx, &token)?;
    if record.scope != Scope::Personal {
        return Err(RpcFault::user(EdamErrorCode::PermissionDenied, "authenticationToken"));
    }
    let account = state.account(record.user_id)?;
    let business_id = account
        .business_id
        .ok_or_else(|| RpcFault::not_found("User.businessUserInfo", &account.username))?;
    let shard = state
        .businesses
        .get(&business_id)
        .map(|b| b.shard_id.clone())
        .ok_or_else(|| RpcFault::not_found("Business.id", &business_id.to_string()))?;

    let (business_token, expires) =
        state.issue_token(ctx, record.user_id, Scope::Business(business_id), false);
    info!(business_id, "business token issued");
    reply(AuthenticationResult {
        current_time: ctx.now,
        authentication_token: business_token,
        expiration: expires,
        user: Some(state.user_record(record.user_id)?),
        note_store_url: Some(Endpoints::note_store(ctx.service_url, &shard)),
        web_api_url_prefix: Some(Endpoints::web_api_prefix(ctx.service_url, &shard)),
        ..AuthenticationResult::default()
    })
}

/// Content endpoint a token of `scope` is valid for.
fn endpoint_for(state: &State, ctx: &Ctx<'_>, user_id: i32, scope: &Scope) -> Result<String, RpcFault> {
    let shard = match scope {
        Scope::Personal => state.account(user_id)?.shard_id.clone(),
        Scope::Business(id) => state
            .businesses
            .get(id)
            .map(|b| b.shard_id.clone())
            .ok_or_else(|| RpcFault::not_found("Business.id", &id.to_string()))?,
        Scope::Shared { shard, .. } => shard.clone(),
    };
    Ok(Endpoints::note_store(ctx.service_url, &shard))
}
