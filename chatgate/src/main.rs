use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use args::Args;
use clap::Parser;
use config::Config;
use server::ServeConfig;

mod args;
mod logger;

const DEFAULT_LISTEN_ADDRESS: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), 8000));

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Before loading the config, so validation warnings reach the output.
    logger::init(&args);

    let config = match args.config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration {}: {e:#}", args.config.display());
            std::process::exit(1);
        }
    };

    if rustls::crypto::aws_lc_rs::default_provider().install_default().is_err() {
        log::debug!("A rustls crypto provider was already installed");
    }

    let serve_config = serve_config(&args, config);
    log::info!("chatgate {} listening on {}", env!("CARGO_PKG_VERSION"), serve_config.listen_address);

    if let Err(e) = server::serve(serve_config).await {
        log::error!("Server stopped: {e:#}");
        std::process::exit(1);
    }
}

/// Listen address precedence: command line, then configuration file, then the default.
fn serve_config(args: &Args, config: Config) -> ServeConfig {
    let listen_address = args
        .listen_address
        .or(config.server.listen_address)
        .unwrap_or(DEFAULT_LISTEN_ADDRESS);

    ServeConfig { listen_address, config }
}
