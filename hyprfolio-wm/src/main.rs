use clap::Parser;
use hyprfolio_wm_engine::config::{CliArgs, WmConfig};
use hyprfolio_wm_engine::server::WmServer;
use hyprfolio_wm_engine::transport::NdjsonTransport;

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

    let config = WmConfig::from(&args);
    tracing::info!(
        workspaces = config.workspace_count,
        width = config.viewport.width,
        height = config.viewport.height,
        "hyprfolio-wm-engine ready"
    );

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    let mut server = WmServer::new(NdjsonTransport::stdout(), config);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());

    if let Err(e) = runtime.block_on(server.run(stdin)) {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
