use anyhow::Result;
use axum::Router;
use clap::Parser;
use docdex_core::IndexConfig;
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};
use docdex_server::build_app;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "docdex-server")]
#[command(about = "Serve list/read/search over a directory of documents", long_about = None)]
struct Args {
    /// Documentation root directory
    #[arg(long, env = "DOCDEX_ROOT", default_value = "./docs")]
    root: String,
    /// Extra file extensions to index as plain text (repeatable)
    #[arg(long = "ext")]
    extensions: Vec<String>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    std::fs::create_dir_all(&args.root)?;
    let config = IndexConfig::new(&args.root).with_extensions(&args.extensions);
    let app: Router = build_app(config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, root = %args.root, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
