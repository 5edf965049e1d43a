//! Vitrine API server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vitrine_api::AppState;
use vitrine_db::{schema, ConnectionPool};

#[derive(Parser, Debug)]
#[command(name = "vitrine-server", about = "Vitrine storefront API server")]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// SQLite database path.
    #[arg(long, default_value = "vitrine.db")]
    db: PathBuf,

    /// Number of reader connections in the pool.
    #[arg(long, default_value_t = 2)]
    readers: usize,

    /// Bootstrap admin email (created on first start).
    #[arg(long)]
    admin_email: Option<String>,

    /// Bootstrap admin password.
    #[arg(long)]
    admin_password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let pool = Arc::new(ConnectionPool::open(&args.db, args.readers)?);
    schema::init(&pool)?;
    let state = AppState::new(pool);

    if let (Some(email), Some(password)) = (&args.admin_email, &args.admin_password) {
        state.auth.bootstrap(email, password)?;
        info!(email = %email, "admin account ready");
    }

    let app = vitrine_api::router(state);
    let listener = tokio::net::TcpListener::bind(args.addr).await?;
    info!(addr = %args.addr, db = %args.db.display(), "vitrine server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
