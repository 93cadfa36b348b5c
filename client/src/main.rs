use clap::Parser;
use client::network::Client;
use log::info;
use shared::config::{DEFAULT_HEIGHT, DEFAULT_WIDTH, POINTS_PER_LINE};
use shared::GameConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// WebSocket URL of the server
    #[arg(short = 's', long, default_value = "ws://127.0.0.1:8080")]
    server: String,

    /// Points per cleared row; must match the server for scores to agree
    #[arg(short = 'p', long, default_value_t = POINTS_PER_LINE)]
    points_per_line: u32,

    /// Board width until the first map update arrives
    #[arg(short = 'w', long, default_value_t = DEFAULT_WIDTH)]
    width: usize,

    /// Board height (no short flag to avoid conflict with --help)
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let config = GameConfig::new(args.width, args.height, args.points_per_line)?;

    info!("Starting client...");
    let mut client = Client::new(&args.server, config).await?;

    client.run().await?;

    Ok(())
}
