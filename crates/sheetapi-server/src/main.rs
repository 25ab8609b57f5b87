use anyhow::Result;
use clap::Parser;
use sheetapi_server::config::{Config, load_dotenv};

#[tokio::main]
async fn main() -> Result<()> {
    let loaded = load_dotenv(std::path::Path::new("."));
    let config = Config::parse();
    sheetapi_server::init_tracing(&config.log_filter)?;
    for path in loaded {
        tracing::debug!(path = %path.display(), "loaded environment file");
    }
    sheetapi_server::serve(config).await
}
