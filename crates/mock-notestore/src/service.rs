//! Shared state of the mock service and request routing.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use notestore_models::{
    BusinessUserInfo, BusinessUserRole, EdamErrorCode, Guid, LinkedNotebook, Note, Notebook,
    PrivilegeLevel, RpcFault, SavedSearch, Tag, User,
};
use notestore_sdk::Endpoints;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{notestore, userstore};

/// Token lifetime used unless overridden.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 3600);

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

/// An account known to the mock.
#[derive(Debug, Clone)]
pub struct Account {
    /// Login name.
    pub username: String,
    /// Secret accepted by `authenticate`.
    pub password: String,
    /// Shard hosting the account's personal notebooks.
    pub shard_id: String,
    /// Business the account belongs to, if any.
    pub business_id: Option<i32>,
    /// One-time code the account requires as second factor, if any.
    pub one_time_code: Option<String>,
}

impl Account {
    /// An account without business or second factor.
    pub fn new(username: &str, password: &str, shard_id: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            shard_id: shard_id.to_string(),
            business_id: None,
            one_time_code: None,
        }
    }

    /// Make the account a member of business `business_id`.
    #[must_use]
    pub fn with_business(mut self, business_id: i32) -> Self {
        self.business_id = Some(business_id);
        self
    }

    /// Require `code` as second factor.
    #[must_use]
    pub fn with_two_factor(mut self, code: &str) -> Self {
        self.one_time_code = Some(code.to_string());
        self
    }
}

/// A business known to the mock.
#[derive(Debug, Clone)]
pub(crate) struct Business {
    pub name: String,
    pub shard_id: String,
}

// ---------------------------------------------------------------------------
// Stored state
// ---------------------------------------------------------------------------

/// Who owns a stored notebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Owner {
    User(i32),
    Business(i32),
}

/// What a token grants access to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Scope {
    /// The holder's own notebooks.
    Personal,
    /// Notebooks owned by a business.
    Business(i32),
    /// Notebooks shared with the holder on one shard.
    Shared { shard: String, share_key: String },
}

#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub user_id: i32,
    pub scope: Scope,
    pub expires_at: i64,
    pub revoked: bool,
    pub pending_second_factor: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct StoredNotebook {
    pub owner: Owner,
    pub notebook: Notebook,
}

/// Everything stored on one shard.
#[derive(Debug, Default)]
pub(crate) struct Shard {
    pub notebooks: BTreeMap<Guid, StoredNotebook>,
    pub notes: BTreeMap<Guid, Note>,
    pub tags: BTreeMap<Guid, (Owner, Tag)>,
    pub searches: BTreeMap<Guid, (i32, SavedSearch)>,
    pub linked: BTreeMap<Guid, (i32, LinkedNotebook)>,
}

#[derive(Debug, Default)]
pub(crate) struct State {
    pub accounts: BTreeMap<i32, Account>,
    pub businesses: BTreeMap<i32, Business>,
    pub tokens: HashMap<String, Token>,
    pub shards: HashMap<String, Shard>,
    pub update_count: i32,
    next_user_id: i32,
    next_share_id: i64,
}

/// Per-call context.
pub(crate) struct Ctx<'a> {
    pub service_url: &'a str,
    pub now: i64,
    pub token_ttl_ms: i64,
}

impl State {
    pub fn account_by_name(&self, username: &str) -> Option<(i32, &Account)> {
        self.accounts
            .iter()
            .find(|(_, a)| a.username == username)
            .map(|(id, a)| (*id, a))
    }

    pub fn account(&self, user_id: i32) -> Result<&Account, RpcFault> {
        self.accounts
            .get(&user_id)
            .ok_or_else(|| RpcFault::system(EdamErrorCode::InternalError, "token owner vanished"))
    }

    /// Profile of `user_id`, including business membership.
    pub fn user_record(&self, user_id: i32) -> Result<User, RpcFault> {
        let account = self.account(user_id)?;
        let business_user_info = account.business_id.map(|id| BusinessUserInfo {
            business_id: Some(id),
            business_name: self.businesses.get(&id).map(|b| b.name.clone()),
            role: Some(BusinessUserRole::Normal),
            email: Some(format!("{}@business.example", account.username)),
        });
        Ok(User {
            id: Some(user_id),
            username: Some(account.username.clone()),
            email: Some(format!("{}@example.com", account.username)),
            name: Some(account.username.clone()),
            privilege: Some(PrivilegeLevel::Normal),
            active: Some(true),
            shard_id: Some(account.shard_id.clone()),
            business_user_info,
            ..User::default()
        })
    }

    pub fn issue_token(&mut self, ctx: &Ctx<'_>, user_id: i32, scope: Scope, pending: bool) -> (String, i64) {
        let token = format!("S=mock:U={user_id:x}:{}", uuid::Uuid::new_v4().simple());
        let expires_at = ctx.now + ctx.token_ttl_ms;
        self.tokens.insert(
            token.clone(),
            Token {
                user_id,
                scope,
                expires_at,
                revoked: false,
                pending_second_factor: pending,
            },
        );
        (token, expires_at)
    }

    /// Look a token up, rejecting unknown, revoked and expired ones.
    ///
    /// Tokens still waiting for their second factor are returned as is;
    /// [`State::usable_token`] rejects those too.
    pub fn token(&self, ctx: &Ctx<'_>, token: &str) -> Result<Token, RpcFault> {
        let record = self
            .tokens
            .get(token)
            .filter(|t| !t.revoked)
            .ok_or_else(|| RpcFault::user(EdamErrorCode::InvalidAuth, "authenticationToken"))?;
        if record.expires_at <= ctx.now {
            return Err(RpcFault::user(EdamErrorCode::AuthExpired, "authenticationToken"));
        }
        Ok(record.clone())
    }

    pub fn usable_token(&self, ctx: &Ctx<'_>, token: &str) -> Result<Token, RpcFault> {
        let record = self.token(ctx, token)?;
        if record.pending_second_factor {
            return Err(RpcFault::user(EdamErrorCode::PermissionDenied, "authenticationToken"));
        }
        Ok(record)
    }

    pub fn shard(&mut self, shard_id: &str) -> &mut Shard {
        self.shards.entry(shard_id.to_string()).or_default()
    }

    pub fn next_usn(&mut self) -> i32 {
        self.update_count += 1;
        self.update_count
    }

    pub fn next_share_id(&mut self) -> i64 {
        self.next_share_id += 1;
        self.next_share_id
    }
}

// ---------------------------------------------------------------------------
// MockService
// ---------------------------------------------------------------------------

/// In-memory account and content stores of one service host.
///
/// Every endpoint of the host is served by the same instance: the account
/// store at [`Endpoints::user_store`] and one content store per shard at
/// [`Endpoints::note_store`].
#[derive(Debug)]
pub struct MockService {
    service_url: String,
    token_ttl: Duration,
    state: Mutex<State>,
    calls: Mutex<HashMap<String, usize>>,
}

enum Route {
    UserStore,
    NoteStore(String),
}

impl MockService {
    /// An empty service answering for `service_url`.
    pub fn new(service_url: &str) -> Self {
        Self {
            service_url: service_url.trim_end_matches('/').to_string(),
            token_ttl: DEFAULT_TOKEN_TTL,
            state: Mutex::new(State::default()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Issue tokens valid for `ttl`.
    #[must_use]
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Base URL this service answers for.
    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    /// Register a business whose notebooks live on `shard_id`.
    pub fn add_business(&self, business_id: i32, name: &str, shard_id: &str) {
        self.with_state(|state| {
            state.businesses.insert(
                business_id,
                Business {
                    name: name.to_string(),
                    shard_id: shard_id.to_string(),
                },
            );
        });
    }

    /// Register an account and return its user id.
    pub fn add_account(&self, account: Account) -> i32 {
        self.with_state(|state| {
            state.next_user_id += 1;
            let id = state.next_user_id;
            state.accounts.insert(id, account);
            id
        })
    }

    /// Number of calls received for `method`, across all endpoints.
    pub fn calls(&self, method: &str) -> usize {
        self.calls
            .lock()
            .map(|c| c.get(method).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Answer one call made against `endpoint`.
    pub fn handle(
        &self,
        endpoint: &str,
        method: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, RpcFault> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(method.to_string()).or_default() += 1;
        }
        debug!(endpoint, method, "mock call");

        let route = self.route(endpoint)?;
        let mut state = self
            .state
            .lock()
            .map_err(|_| RpcFault::system(EdamErrorCode::InternalError, "state lock poisoned"))?;
        let ctx = Ctx {
            service_url: &self.service_url,
            now: Utc::now().timestamp_millis(),
            token_ttl_ms: i64::try_from(self.token_ttl.as_millis()).unwrap_or(i64::MAX / 2),
        };

        match route {
            Route::UserStore => userstore::dispatch(&mut state, &ctx, method, params),
            Route::NoteStore(shard) => notestore::dispatch(&mut state, &ctx, &shard, method, params),
        }
    }

    fn route(&self, endpoint: &str) -> Result<Route, RpcFault> {
        if endpoint == Endpoints::user_store(&self.service_url) {
            return Ok(Route::UserStore);
        }
        let shard = endpoint
            .strip_prefix(&self.service_url)
            .and_then(|p| p.strip_prefix("/shard/"))
            .and_then(|p| p.strip_suffix("/notestore"))
            .filter(|s| !s.is_empty() && !s.contains('/'));
        match shard {
            Some(shard) => Ok(Route::NoteStore(shard.to_string())),
            None => Err(RpcFault::transport(format!("no store at {endpoint}"))),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut state)
    }
}

// ---------------------------------------------------------------------------
// Parameter helpers
// ---------------------------------------------------------------------------

/// Decode the required parameter `name`.
pub(crate) fn arg<T: DeserializeOwned>(params: &Map<String, Value>, name: &str) -> Result<T, RpcFault> {
    let value = params
        .get(name)
        .filter(|v| !v.is_null())
        .ok_or_else(|| RpcFault::user(EdamErrorCode::DataRequired, name))?;
    serde_json::from_value(value.clone()).map_err(|_| RpcFault::user(EdamErrorCode::BadDataFormat, name))
}

/// Encode a reply.
pub(crate) fn reply<T: Serialize>(value: T) -> Result<Value, RpcFault> {
    serde_json::to_value(value).map_err(|e| RpcFault::system(EdamErrorCode::InternalError, &e.to_string()))
}

pub(crate) fn unsupported(method: &str) -> RpcFault {
    RpcFault::system(EdamErrorCode::UnsupportedOperation, method)
}
