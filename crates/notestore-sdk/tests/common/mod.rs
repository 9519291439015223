//! Fixture shared by the integration tests: one mock service with a
//! business, a business member, a personal account and a two-factor
//! account, reached in-process.

#![allow(dead_code)]

use std::sync::Arc;

use mock_notestore::{Account, MockService, MockTransportFactory};
use notestore_sdk::{ClientConfig, ClientFactory, Credential, UserStoreClient};

pub const SERVICE_URL: &str = "http://notes.test";
pub const ONE_TIME_CODE: &str = "314159";

pub struct Fixture {
    pub service: Arc<MockService>,
    pub factory: ClientFactory,
}

impl Fixture {
    pub fn new() -> Self {
        let service = Arc::new(MockService::new(SERVICE_URL));
        service.add_business(1, "Acme Corp", "b1");
        service.add_account(Account::new("alice", "alice-pw", "s1").with_business(1));
        service.add_account(Account::new("bob", "bob-pw", "s2"));
        service.add_account(Account::new("carol", "carol-pw", "s3").with_two_factor(ONE_TIME_CODE));

        let config = ClientConfig::default()
            .with_service_url(SERVICE_URL)
            .with_consumer("integration", "secret")
            .with_user_agent("notestore-sdk-tests/1.0");
        let factory = ClientFactory::new(
            config,
            Arc::new(MockTransportFactory::new(Arc::clone(&service))),
        );
        Self { service, factory }
    }

    pub fn users(&self) -> UserStoreClient {
        self.factory.user_store_client().unwrap()
    }

    pub fn login(&self, username: &str) -> Credential {
        self.users()
            .authenticate(username, &format!("{username}-pw"), false)
            .unwrap()
    }
}

pub fn note_store_url(shard: &str) -> String {
    format!("{SERVICE_URL}/shard/{shard}/notestore")
}
