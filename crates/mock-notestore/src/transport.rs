//! In-process transports answering from a [`MockService`].

use std::sync::Arc;

use notestore_models::RpcFault;
use notestore_sdk::{RpcTransport, StoreError, TransportFactory};
use serde_json::{Map, Value};

use crate::service::MockService;

/// Transport bound to one endpoint of a [`MockService`].
#[derive(Debug, Clone)]
pub struct MockTransport {
    service: Arc<MockService>,
    endpoint: String,
}

impl RpcTransport for MockTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn invoke(&self, method: &str, params: Map<String, Value>) -> Result<Value, RpcFault> {
        self.service.handle(&self.endpoint, method, &params)
    }
}

/// Opens [`MockTransport`]s onto one shared service.
///
/// Endpoints outside the service's base URL are refused at connect time,
/// the way an unreachable host would be.
#[derive(Debug, Clone)]
pub struct MockTransportFactory {
    service: Arc<MockService>,
}

impl MockTransportFactory {
    pub fn new(service: Arc<MockService>) -> Self {
        Self { service }
    }

    /// The service every transport answers from.
    pub fn service(&self) -> &Arc<MockService> {
        &self.service
    }
}

impl TransportFactory for MockTransportFactory {
    fn connect(&self, endpoint: &str) -> Result<Arc<dyn RpcTransport>, StoreError> {
        if !endpoint.starts_with(self.service.service_url()) {
            return Err(StoreError::Transport(format!("unreachable endpoint {endpoint}")));
        }
        Ok(Arc::new(MockTransport {
            service: Arc::clone(&self.service),
            endpoint: endpoint.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Account;
    use notestore_sdk::{ClientConfig, ClientFactory};

    #[test]
    fn sdk_logs_in_through_mock() {
        let service = Arc::new(MockService::new("http://mock.test"));
        service.add_account(Account::new("alice", "pw", "s1"));
        let factory = ClientFactory::new(
            ClientConfig::default().with_service_url("http://mock.test"),
            Arc::new(MockTransportFactory::new(Arc::clone(&service))),
        );

        let users = factory.user_store_client().unwrap();
        let credential = users.authenticate("alice", "pw", false).unwrap();
        assert_eq!(credential.endpoint(), "http://mock.test/shard/s1/notestore");
        assert_eq!(service.calls("check_version"), 1);
    }

    #[test]
    fn foreign_endpoints_are_unreachable() {
        let factory = MockTransportFactory::new(Arc::new(MockService::new("http://mock.test")));
        assert!(matches!(
            factory.connect("http://other.test/edam/user"),
            Err(StoreError::Transport(_))
        ));
    }
}
