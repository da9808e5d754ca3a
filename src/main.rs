use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

use address_to_gps::app;

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    app::run("127.0.0.1:3000").await
}
