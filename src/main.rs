use gridsheet::app;

use std::env;

/// Web server entry point.
///
/// Bind address and snapshot directory come from the environment:
/// `GRIDSHEET_ADDR` (default `127.0.0.1:3000`) and `GRIDSHEET_DATA`
/// (default `snapshots`).
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let addr = env::var("GRIDSHEET_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let data_dir = env::var("GRIDSHEET_DATA").unwrap_or_else(|_| "snapshots".to_string());

    app::run(&addr, &data_dir).await
}
