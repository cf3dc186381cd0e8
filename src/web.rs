#![cfg(not(tarpaulin_include))]

use interactive_grid::app;
use interactive_grid::config::ServerConfig;
use std::env;

/// Main entry point for the grid web server
///
/// Settings come from `GRID_*` environment variables, then from the
/// positional arguments `[grid_size] [data_file]`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let config = ServerConfig::from_env().with_args(&args);

    app::run(config).await
}
