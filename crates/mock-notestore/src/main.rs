//! Mock note service: serves the account store and every shard's content
//! store over HTTP from memory.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use mock_notestore::{router, Account, MockService};
use tracing::info;

/// In-memory note service for local development.
#[derive(Parser, Debug)]
#[command(name = "mock-notestore", about = "In-memory note service")]
struct Args {
    /// Port to listen on.
    #[arg(long, env = "MOCK_NOTESTORE_PORT", default_value_t = 4100)]
    port: u16,

    /// Base URL clients use to reach this service.  Defaults to
    /// `http://localhost:<port>`.
    #[arg(long, env = "MOCK_NOTESTORE_URL")]
    service_url: Option<String>,

    /// Do not create the demo accounts.
    #[arg(long)]
    empty: bool,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn seed(service: &MockService) {
    service.add_business(1, "Acme Corp", "b1");
    let accounts = [
        Account::new("alice", "alice-pw", "s1").with_business(1),
        Account::new("bob", "bob-pw", "s2"),
        Account::new("carol", "carol-pw", "s3").with_two_factor("123456"),
    ];
    for account in accounts {
        info!(username = %account.username, shard = %account.shard_id, "demo account");
        service.add_account(account);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let service_url = args
        .service_url
        .unwrap_or_else(|| format!("http://localhost:{}", args.port));

    let service = Arc::new(MockService::new(&service_url));
    if !args.empty {
        seed(&service);
    }

    let app = router(service);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(address = %addr, service_url = %service_url, "mock note service listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
