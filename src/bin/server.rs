//! HTTP service wrapping the extractimagespdf pipeline.
//!
//! Configuration comes from the environment (`EXTRACT_IMAGES_BIND`,
//! `EXTRACT_IMAGES_MAX_UPLOAD`, `EXTRACT_IMAGES_COMPRESSION_LEVEL`); logging
//! is controlled by `RUST_LOG`.

use extractimagespdf::server::{self, ServerConfig};
use std::process;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            process::exit(1);
        }
    };

    if let Err(e) = server::serve(config).await {
        log::error!("server error: {e}");
        process::exit(1);
    }
}
