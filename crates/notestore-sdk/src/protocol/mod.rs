//! Typed protocol stubs.
//!
//! Each store of the service is declared once with [`rpc_stub!`].  The
//! declaration produces:
//!
//! * a stub struct with one blocking method per protocol operation, each
//!   taking the authentication token explicitly where the protocol wants
//!   one, and
//! * a manifest constant listing every operation name, in declaration
//!   order.
//!
//! The manifests are what the wrapper clients are checked against (see
//! [`crate::completeness`]).

/// Declare a protocol stub and its operation manifest.
///
/// Arguments are encoded as a JSON object keyed by parameter name; the
/// result is decoded into the declared return type.
macro_rules! rpc_stub {
    (
        $(#[$meta:meta])*
        pub struct $stub:ident;
        pub const $ops:ident;
        $(
            $(#[$op_meta:meta])*
            fn $op:ident($($arg:ident: $ty:ty),* $(,)?) -> $ret:ty;
        )*
    ) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $stub {
            transport: ::std::sync::Arc<dyn $crate::transport::RpcTransport>,
        }

        #[doc = concat!("Every operation name of [`", stringify!($stub), "`], in declaration order.")]
        pub const $ops: &[&str] = &[$(stringify!($op)),*];

        impl $stub {
            /// Bind the stub to a transport.
            pub fn new(transport: ::std::sync::Arc<dyn $crate::transport::RpcTransport>) -> Self {
                Self { transport }
            }

            /// URL of the endpoint this stub calls.
            pub fn endpoint(&self) -> &str {
                self.transport.endpoint()
            }

            $(
                $(#[$op_meta])*
                pub fn $op(&self, $($arg: $ty),*) -> Result<$ret, $crate::error::StoreError> {
                    #[allow(unused_mut)]
                    let mut params = ::serde_json::Map::new();
                    $(
                        params.insert(stringify!($arg).to_string(), ::serde_json::to_value(&$arg)?);
                    )*
                    self.call(stringify!($op), params)
                }
            )*

            fn call<T: ::serde::de::DeserializeOwned>(
                &self,
                method: &'static str,
                params: ::serde_json::Map<String, ::serde_json::Value>,
            ) -> Result<T, $crate::error::StoreError> {
                ::tracing::debug!(method, endpoint = %self.endpoint(), "rpc call");
                let value = self.transport.invoke(method, params)?;
                Ok(::serde_json::from_value(value)?)
            }
        }

        impl ::std::fmt::Debug for $stub {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct(stringify!($stub))
                    .field("endpoint", &self.endpoint())
                    .finish()
            }
        }
    };
}

pub mod note_store;
pub mod user_store;

pub use note_store::{NoteStoreStub, NOTE_STORE_OPERATIONS};
pub use user_store::{UserStoreStub, USER_STORE_OPERATIONS};
