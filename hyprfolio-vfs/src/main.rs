use clap::Parser;
use hyprfolio_vfs_engine::config::{CliArgs, VfsConfig};
use hyprfolio_vfs_engine::server::VfsServer;
use hyprfolio_vfs_engine::transport::NdjsonTransport;

fn main() {
    let args = CliArgs::parse();

    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    let config = VfsConfig::from(&args);
    let mut server = match VfsServer::new(NdjsonTransport::stdout(), config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to build file system: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(user = %args.user, "hyprfolio-vfs-engine ready");

    if let Err(e) = server.run(std::io::stdin().lock()) {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
