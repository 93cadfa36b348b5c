use clap::Parser;
use log::info;
use server::network::{Server, ServerConfig};
use shared::config::{DEFAULT_HEIGHT, DEFAULT_WIDTH, POINTS_PER_LINE};
use shared::GameConfig;
use std::time::Duration;

/// Command line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Server IP address to bind to
    #[clap(short = 'H', long, default_value = "127.0.0.1")]
    host: String,
    /// Server port to listen on
    #[clap(short, long, default_value = "8080")]
    port: u16,
    /// Milliseconds between two game steps
    #[clap(short, long, default_value = "500", value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,
    /// Maximum number of simultaneous players
    #[clap(short, long, default_value = "16")]
    max_clients: usize,
    /// Board width in cells
    #[clap(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,
    /// Board height in cells
    #[clap(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,
    /// Points awarded per cleared row
    #[clap(long, default_value_t = POINTS_PER_LINE)]
    points_per_line: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let game = GameConfig::new(args.width, args.height, args.points_per_line)?;

    let config = ServerConfig {
        bind_addr: format!("{}:{}", args.host, args.port),
        tick_interval: Duration::from_millis(args.tick_ms),
        max_clients: args.max_clients,
        game,
    };

    let mut server = Server::new(config).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
