use clap::Parser;
use registry::AppConfig;
use server::{Cli, IngestServer};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    let app = Arc::new(AppConfig::init(config)?);
    let server = match IngestServer::new(app.clone()) {
        Ok(server) => server,
        Err(e) => {
            app.close();
            return Err(e.into());
        }
    };

    server.run().await?;
    Ok(())
}
