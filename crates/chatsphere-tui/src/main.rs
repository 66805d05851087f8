//! Chatsphere TUI entry point.

use chatsphere_client::transport::WsConnector;
use chatsphere_harness::spawn_server;
use chatsphere_tui::{AnyConnector, Args, Runtime, TerminalDriver, logging};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init(&args.log_level, args.log_file.as_deref())?;

    let (connector, local) = match &args.server {
        Some(endpoint) => {
            tracing::info!(%endpoint, "using remote service");
            (AnyConnector::Remote(WsConnector::new()), None)
        },
        None => {
            let seed = args.seed.unwrap_or_else(rand::random);
            tracing::info!(seed, "starting in-process service");
            let handle = spawn_server(seed);
            (AnyConnector::Local(handle.connector()), Some(handle))
        },
    };

    let driver = TerminalDriver::new()?;
    let mut runtime = Runtime::new(connector, driver, args.runtime_config());
    let result = runtime.run().await;

    if let Some(handle) = local {
        handle.stop().await;
    }

    tracing::info!("exiting");
    Ok(result?)
}
