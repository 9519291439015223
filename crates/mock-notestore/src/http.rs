//! HTTP surface: one `POST` route for the account store and one per shard
//! content store, each carrying an [`RpcRequest`] and answering an
//! [`RpcResponse`].

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::routing::post;
use axum::Router;
use notestore_sdk::transport::{RpcRequest, RpcResponse};
use notestore_sdk::Endpoints;

use crate::MockService;

/// Routes for every store `service` hosts.
pub fn router(service: Arc<MockService>) -> Router {
    Router::new()
        .route("/edam/user", post(user_store))
        .route("/shard/{shard}/notestore", post(note_store))
        .with_state(service)
}

/// `POST /edam/user`: account store.
async fn user_store(State(service): State<Arc<MockService>>, Json(req): Json<RpcRequest>) -> Json<RpcResponse> {
    let endpoint = Endpoints::user_store(service.service_url());
    Json(RpcResponse::from_outcome(service.handle(&endpoint, &req.method, &req.params)))
}

/// `POST /shard/{shard}/notestore`: content store of one shard.
async fn note_store(
    State(service): State<Arc<MockService>>,
    Path(shard): Path<String>,
    Json(req): Json<RpcRequest>,
) -> Json<RpcResponse> {
    let endpoint = Endpoints::note_store(service.service_url(), &shard);
    Json(RpcResponse::from_outcome(service.handle(&endpoint, &req.method, &req.params)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Account;
    use notestore_sdk::{AuthErrorKind, ClientConfig, ClientFactory};

    /// Serve a service holding alice on an ephemeral port from a background
    /// thread and return its base URL.
    fn serve() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let service = Arc::new(MockService::new(&url));
        service.add_account(Account::new("alice", "alice-pw", "s1"));
        let app = router(service);

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });
        url
    }

    fn factory(url: &str) -> ClientFactory {
        let config = ClientConfig::default()
            .with_service_url(url)
            .with_consumer("http-test", "secret")
            .with_user_agent("mock-notestore-tests/1.0");
        ClientFactory::http(config).unwrap()
    }

    #[test]
    fn login_and_listing_over_http() {
        let url = serve();
        let factory = factory(&url);

        let credential = factory
            .user_store_client()
            .unwrap()
            .authenticate("alice", "alice-pw", false)
            .unwrap();
        assert_eq!(credential.endpoint(), format!("{url}/shard/s1/notestore"));

        let notes = factory.note_store_client(credential).unwrap();
        assert!(notes.list_notebooks().is_ok());
    }

    #[test]
    fn faults_cross_the_wire_intact() {
        let url = serve();
        let users = factory(&url).user_store_client().unwrap();

        let err = users.authenticate("alice", "wrong", false).unwrap_err();
        assert_eq!(err.auth_kind(), Some(AuthErrorKind::InvalidCredentials));
    }
}
