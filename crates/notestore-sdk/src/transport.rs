//! Blocking RPC transport seam.
//!
//! The SDK never talks to the network directly.  Every call goes through an
//! [`RpcTransport`] bound to exactly one endpoint, obtained from a
//! [`TransportFactory`].  [`HttpTransport`] is the reference binding: it
//! POSTs a JSON envelope to the endpoint URL with a blocking `reqwest`
//! client.

use std::sync::Arc;

use notestore_models::RpcFault;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::ClientConfig;
use crate::error::StoreError;

/// One blocking connection to one endpoint.
pub trait RpcTransport: Send + Sync {
    /// URL of the endpoint this transport is bound to.
    fn endpoint(&self) -> &str;

    /// Perform one call and block until it completes.
    ///
    /// `params` is a JSON object keyed by protocol parameter name.
    fn invoke(&self, method: &str, params: Map<String, Value>) -> Result<Value, RpcFault>;
}

/// Opens transports bound to endpoint URLs.
pub trait TransportFactory: Send + Sync {
    /// Open a transport for `endpoint`.
    fn connect(&self, endpoint: &str) -> Result<Arc<dyn RpcTransport>, StoreError>;
}

// ---------------------------------------------------------------------------
// Wire envelope
// ---------------------------------------------------------------------------

/// Body of every request sent by [`HttpTransport`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Protocol operation name.
    pub method: String,
    /// Arguments keyed by parameter name.
    #[serde(default)]
    pub params: Map<String, Value>,
}

/// Body of every response expected by [`HttpTransport`].
///
/// Exactly one of `result` and `fault` is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RpcResponse {
    /// Return value of a successful call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure reported by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<RpcFault>,
}

impl RpcResponse {
    /// Wrap the outcome of a call.
    pub fn from_outcome(outcome: Result<Value, RpcFault>) -> Self {
        match outcome {
            Ok(result) => Self {
                result: Some(result),
                fault: None,
            },
            Err(fault) => Self {
                result: None,
                fault: Some(fault),
            },
        }
    }

    /// Unwrap into the outcome of the call.
    pub fn into_outcome(self) -> Result<Value, RpcFault> {
        match self.fault {
            Some(fault) => Err(fault),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

// ---------------------------------------------------------------------------
// HttpTransport
// ---------------------------------------------------------------------------

/// JSON-over-HTTP transport bound to one endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Bind a shared HTTP client to `endpoint`.
    pub fn new(http: reqwest::blocking::Client, endpoint: &str) -> Self {
        Self {
            http,
            endpoint: endpoint.to_string(),
        }
    }
}

impl RpcTransport for HttpTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn invoke(&self, method: &str, params: Map<String, Value>) -> Result<Value, RpcFault> {
        let request = RpcRequest {
            method: method.to_string(),
            params,
        };

        let res = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|e| RpcFault::transport(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().unwrap_or_default();
            return Err(RpcFault::transport(format!("HTTP {status}: {text}")));
        }

        let body: RpcResponse = res
            .json()
            .map_err(|e| RpcFault::transport(format!("malformed response: {e}")))?;
        body.into_outcome()
    }
}

/// Opens [`HttpTransport`]s sharing one connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransportFactory {
    http: reqwest::blocking::Client,
}

impl HttpTransportFactory {
    /// Build the shared HTTP client from the configured user agent, custom
    /// headers and timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.custom_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| StoreError::Config(format!("invalid header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| StoreError::Config(format!("invalid header value for {name}: {e}")))?;
            headers.insert(name, value);
        }

        let http = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { http })
    }
}

impl TransportFactory for HttpTransportFactory {
    fn connect(&self, endpoint: &str) -> Result<Arc<dyn RpcTransport>, StoreError> {
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(StoreError::Config(format!(
                "endpoint must be an http(s) URL: {endpoint}"
            )));
        }
        Ok(Arc::new(HttpTransport::new(self.http.clone(), endpoint)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notestore_models::EdamErrorCode;

    #[test]
    fn response_with_fault_is_an_error() {
        let res = RpcResponse::from_outcome(Err(RpcFault::user(EdamErrorCode::InvalidAuth, "t")));
        let json = serde_json::to_value(&res).unwrap();
        assert!(json.get("result").is_none());

        let back: RpcResponse = serde_json::from_value(json).unwrap();
        assert!(back.into_outcome().is_err());
    }

    #[test]
    fn response_without_result_is_null() {
        let res: RpcResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(res.into_outcome().unwrap(), Value::Null);
    }

    #[test]
    fn factory_rejects_invalid_header() {
        let cfg = ClientConfig::default().with_header("bad header", "v");
        assert!(matches!(
            HttpTransportFactory::new(&cfg),
            Err(StoreError::Config(_))
        ));
    }

    #[test]
    fn factory_rejects_non_http_endpoints() {
        let factory = HttpTransportFactory::new(&ClientConfig::default()).unwrap();
        assert!(factory.connect("ftp://notes").is_err());
        let transport = factory.connect("https://notes/shard/s1/notestore").unwrap();
        assert_eq!(transport.endpoint(), "https://notes/shard/s1/notestore");
    }
}
