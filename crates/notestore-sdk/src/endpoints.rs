//! Canonical endpoint URLs of the note service.
//!
//! Every URL the SDK connects to is built through [`Endpoints`], so clients,
//! the mock service and tooling agree on a single layout.
//!
//! # URL layout
//!
//! ```text
//! {service}/edam/user                  ← account store
//! {service}/shard/{shard}/notestore    ← content store of one shard
//! {service}/shard/{shard}/             ← web API prefix of one shard
//! ```

use notestore_models::LinkedNotebook;

use crate::error::StoreError;

/// Central authority for endpoint URLs.
///
/// # Examples
///
/// ```
/// use notestore_sdk::Endpoints;
///
/// assert_eq!(
///     Endpoints::user_store("https://sandbox.example.com"),
///     "https://sandbox.example.com/edam/user",
/// );
/// assert_eq!(
///     Endpoints::note_store("https://sandbox.example.com/", "s1"),
///     "https://sandbox.example.com/shard/s1/notestore",
/// );
/// ```
pub struct Endpoints;

impl Endpoints {
    /// Account store endpoint.
    pub fn user_store(service_url: &str) -> String {
        format!("{}/edam/user", trim(service_url))
    }

    /// Content store endpoint of one shard.
    pub fn note_store(service_url: &str, shard_id: &str) -> String {
        format!("{}/shard/{shard_id}/notestore", trim(service_url))
    }

    /// Web API prefix of one shard.
    pub fn web_api_prefix(service_url: &str, shard_id: &str) -> String {
        format!("{}/shard/{shard_id}/", trim(service_url))
    }

    /// Endpoint hosting the notebook a linked reference points at.
    ///
    /// Uses the reference's own `note_store_url` when present and falls back
    /// to its shard on the configured service.
    pub fn for_linked_notebook(
        service_url: &str,
        linked: &LinkedNotebook,
    ) -> Result<String, StoreError> {
        if let Some(url) = linked.note_store_url.as_deref().filter(|u| !u.is_empty()) {
            return Ok(url.to_string());
        }
        linked
            .shard_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|shard| Self::note_store(service_url, shard))
            .ok_or_else(|| {
                StoreError::UnresolvableLinkedNotebook(format!(
                    "linked notebook {} has neither a note store URL nor a shard",
                    linked.share_name.as_deref().unwrap_or("<unnamed>")
                ))
            })
    }
}

fn trim(service_url: &str) -> &str {
    service_url.trim_end_matches('/')
}
