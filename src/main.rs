use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use gallery_proxy::config::Config;
use gallery_proxy::constants::{DEFAULT_WATERMARK_PATH, DEFAULT_WATERMARK_TEXT};
use gallery_proxy::proxy::GalleryProxy;
use gallery_proxy::upstream::HttpUpstreamClient;
use gallery_proxy::watermark::write_badge;
use pingora_core::server::configuration::Opt;
use pingora_core::server::Server;
use std::path::PathBuf;
use std::sync::Arc;

/// Gallery image proxy - origin-guarded, watermarking image endpoint built on Pingora
#[derive(Parser, Debug)]
#[command(name = "gallery-proxy")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Daemon mode
    #[arg(short = 'd', long)]
    daemon: bool,

    /// Test configuration and exit
    #[arg(long)]
    test: bool,

    /// Upgrade workers gracefully
    #[arg(long)]
    upgrade: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the default watermark badge as a PNG file
    GenerateWatermark {
        /// Output path
        #[arg(short, long, default_value = DEFAULT_WATERMARK_PATH)]
        output: PathBuf,

        /// Badge text
        #[arg(long, default_value = DEFAULT_WATERMARK_TEXT)]
        text: String,
    },
}

fn main() -> anyhow::Result<()> {
    gallery_proxy::logging::init_subscriber()
        .map_err(|e| anyhow!("Failed to initialize logging subsystem: {}", e))?;

    let args = Args::parse();

    if let Some(Command::GenerateWatermark { output, text }) = &args.command {
        write_badge(output, text).context("Failed to generate watermark")?;
        return Ok(());
    }

    let config = Config::from_file(&args.config)
        .map_err(|e| anyhow!("Failed to load configuration: {}", e))?;
    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))?;

    tracing::info!(
        config_file = %args.config.display(),
        server_address = %config.server.address,
        server_port = config.server.port,
        image_path = %config.server.image_path,
        allowed_origins = config.access.allowed_origins.len(),
        watermark_enabled = config.watermark.enabled,
        "Configuration loaded successfully"
    );

    if args.test {
        println!("Configuration file {} is valid", args.config.display());
        return Ok(());
    }

    let opt = Opt {
        daemon: args.daemon,
        upgrade: args.upgrade,
        ..Default::default()
    };

    let mut server =
        Server::new(Some(opt)).map_err(|e| anyhow!("Failed to create Pingora server: {}", e))?;
    server.bootstrap();

    let client = HttpUpstreamClient::new().map_err(|e| anyhow!(e))?;
    let proxy = GalleryProxy::with_reload(config.clone(), args.config.clone(), Arc::new(client));

    register_reload_signal(&proxy)?;

    let mut proxy_service = pingora_proxy::http_proxy_service(&server.configuration, proxy);
    let listen_addr = config.server.listen_addr();
    proxy_service.add_tcp(&listen_addr);
    proxy_service.threads = Some(config.server.threads);

    tracing::info!(
        address = %listen_addr,
        threads = config.server.threads,
        "Starting gallery image proxy"
    );

    server.add_service(proxy_service);
    server.run_forever();
}

#[cfg(unix)]
fn register_reload_signal(proxy: &GalleryProxy) -> anyhow::Result<()> {
    if let Some(manager) = proxy.reload_manager() {
        manager.register_signal_handler().map_err(|e| anyhow!(e))?;
        tracing::info!(
            config_file = %manager.config_path().display(),
            "SIGHUP reload handler registered"
        );
    }
    Ok(())
}

#[cfg(not(unix))]
fn register_reload_signal(_proxy: &GalleryProxy) -> anyhow::Result<()> {
    tracing::warn!("Configuration reload via SIGHUP is not supported on this platform");
    Ok(())
}
