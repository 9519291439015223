#![deny(missing_docs)]

//! # Note Store Models
//!
//! Value objects exchanged with the remote note service.
//!
//! The service is split into an account store (authentication, profiles)
//! and any number of content stores (notebooks, notes, tags, searches,
//! resources, sharing).  Every record in this crate is an opaque,
//! serde-serializable structure: the SDK passes them through unchanged.
//!
//! ## Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`types`] | Core content records (`Guid`, `Note`, `Notebook`, `Tag`, `Resource`, …) |
//! | [`sharing`] | Shared / linked notebooks and privilege levels |
//! | [`notestore`] | Sync, search and related-content records |
//! | [`userstore`] | Account records and `AuthenticationResult` |
//! | [`error`] | Remote fault vocabulary (`RpcFault`, `EdamErrorCode`) |

pub mod error;
pub mod notestore;
pub mod sharing;
pub mod types;
pub mod userstore;

// Re-export all public types at crate root for convenience.
// Downstream crates can use `notestore_models::Notebook` directly.
pub use error::*;
pub use notestore::*;
pub use sharing::*;
pub use types::*;
pub use userstore::*;
