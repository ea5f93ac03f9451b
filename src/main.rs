use std::sync::Arc;

use broadside::{
    init_logging, serve, GameApi, GameRegistry, GameState, Stub, TcpTransport, BOARD_SIZE,
};
use clap::{Parser, Subcommand};
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Host a game registry and accept clients over TCP.
    Serve {
        #[arg(long, default_value = "127.0.0.1:7878")]
        bind: String,
    },
    /// Play one game between two random shooters in this process.
    Sim {
        #[arg(long, help = "Fix RNG seed for reproducible fleets and target order (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Play one game between two random shooters on a remote server.
    Client {
        #[arg(long, default_value = "127.0.0.1:7878")]
        connect: String,
        #[arg(long, help = "Fix RNG seed for reproducible fleets and target order (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
}

fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_rng(&mut rand::rng()),
    }
}

/// Create a game, place both fleets from seeds drawn from `rng` and fire at
/// shuffled targets until someone wins.
async fn play_random_game(api: &dyn GameApi, rng: &mut SmallRng) -> anyhow::Result<()> {
    let created = api.create_game("Port", "Starboard").await?;
    let game = created.id;
    let seats = [created.player1.id, created.player2.id];
    for player in seats {
        api.random_placement(game, player, Some(rng.random())).await?;
        api.set_ready(game, player).await?;
    }

    let size = BOARD_SIZE as u8;
    let mut targets: Vec<Vec<(u8, u8)>> = Vec::with_capacity(seats.len());
    for _ in seats {
        let mut cells: Vec<(u8, u8)> = (0..size)
            .flat_map(|y| (0..size).map(move |x| (x, y)))
            .collect();
        cells.shuffle(rng);
        targets.push(cells);
    }

    let mut turn = 0;
    loop {
        let summary = api
            .game(game)
            .await?
            .ok_or_else(|| anyhow::anyhow!("game {} disappeared", game))?;
        if summary.state != GameState::InProgress {
            break;
        }
        let shooter = turn % 2;
        let (x, y) = targets[shooter]
            .pop()
            .ok_or_else(|| anyhow::anyhow!("ran out of targets"))?;
        let shot = api.fire_shot(game, seats[shooter], x, y).await?;
        debug!("turn {turn}: ({x}, {y}) -> {:?}", shot.result());
        turn += 1;
    }

    let summary = api
        .game(game)
        .await?
        .ok_or_else(|| anyhow::anyhow!("game {} disappeared", game))?;
    info!("game {} over after {} shots", summary.id, summary.turn_count);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind } => {
            let listener = TcpListener::bind(&bind).await?;
            serve(listener, Arc::new(GameRegistry::new())).await?;
        }
        Commands::Sim { seed } => {
            let registry = GameRegistry::new();
            play_random_game(&registry, &mut make_rng(seed)).await?;
        }
        Commands::Client { connect, seed } => {
            let stub = Stub::new(TcpTransport::connect(&connect).await?);
            play_random_game(&stub, &mut make_rng(seed)).await?;
        }
    }
    Ok(())
}
