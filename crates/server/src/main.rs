mod config;
mod endpoint;
mod events;
mod replication;
mod server;

use anyhow::{Context, Result};
use clap::Parser;

use config::ServerConfig;
use server::GameServer;

#[derive(Parser)]
#[command(name = "robocat-server")]
#[command(about = "Authoritative RoboCat game server")]
struct Args {
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    #[arg(short, long, default_value_t = robocat::DEFAULT_PORT)]
    port: u16,

    #[arg(short, long, default_value_t = robocat::DEFAULT_TICK_RATE)]
    tick_rate: u32,

    #[arg(short, long, default_value_t = 16)]
    max_clients: usize,

    #[arg(long, default_value_t = 0, help = "Computer-controlled cats spawned at startup")]
    ai_cats: usize,

    #[arg(long, default_value_t = 3, help = "Seconds of silence before a client is dropped")]
    client_timeout: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    anyhow::ensure!(args.tick_rate > 0, "tick rate must be positive");

    let bind_addr = format!("{}:{}", args.bind, args.port);

    let config = ServerConfig {
        tick_rate: args.tick_rate,
        max_clients: args.max_clients,
        client_timeout_secs: args.client_timeout,
        ai_cats: args.ai_cats,
        ..Default::default()
    };

    let mut server = GameServer::new(&bind_addr, config)
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    log::info!("Server started on {}", server.local_addr());
    server.run();

    Ok(())
}
