//! TacoTex - Unified CLI
//!
//! Terminal tic-tac-toe, AI self-play and history inspection.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{BackendKind, Cli, Command};
use std::path::Path;
use std::sync::Arc;
use tacotex::backend::ContractBackend;
use tacotex::tui::{self, SharedStore};
use tacotex::wallet::LOCAL_ACCOUNT;
use tacotex::{
    AppConfig, Difficulty, GameHistory, JsonFileStore, LocalBackend, OpponentBackend,
    SeededRandom, SimulatedContract,
};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Play {
            difficulty,
            backend,
        } => run_play(config, difficulty, backend).await,
        Command::Simulate { x, o, games, seed } => {
            init_stderr_tracing();
            run_simulate(x, o, games, seed)
        }
        Command::History { clear, account } => {
            init_stderr_tracing();
            run_history(&config, clear, account)
        }
    }
}

fn init_stderr_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(path: &Path) -> Result<SharedStore> {
    Ok(Arc::new(JsonFileStore::open(path)?))
}

/// Run the terminal UI
async fn run_play(
    config: AppConfig,
    difficulty: Option<Difficulty>,
    backend: BackendKind,
) -> Result<()> {
    let store = open_store(config.store_path())?;
    let account = config
        .wallet_address()
        .clone()
        .unwrap_or_else(|| LOCAL_ACCOUNT.to_string());

    let opponent: Box<dyn OpponentBackend> = match backend {
        BackendKind::Local => Box::new(LocalBackend::new(
            SeededRandom::from_entropy(),
            config.opponent_delay(),
        )),
        BackendKind::Simulated => Box::new(ContractBackend::new(
            SimulatedContract::new(account.clone(), SeededRandom::from_entropy()),
            account,
        )),
    };

    let config = match difficulty {
        Some(difficulty) => config.with_default_difficulty(difficulty),
        None => config,
    };
    tui::run_tui(&config, opponent, store).await
}

/// Run AI self-play and print the tally
#[instrument]
fn run_simulate(x: Difficulty, o: Difficulty, games: usize, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => SeededRandom::seeded(seed),
        None => SeededRandom::from_entropy(),
    };
    info!("Starting self-play");
    let report = tacotex::simulate::run_batch(x, o, games, &mut rng);
    println!("X ({}) vs O ({}): {}", x, o, report);
    Ok(())
}

/// Print or clear the stored history
#[instrument(skip(config))]
fn run_history(config: &AppConfig, clear: bool, account: Option<String>) -> Result<()> {
    let store = open_store(config.store_path())?;
    let account = account
        .or_else(|| config.wallet_address().clone())
        .unwrap_or_else(|| LOCAL_ACCOUNT.to_string());
    let history = GameHistory::with_limit(store, &account, *config.history_limit());

    if clear {
        history.clear()?;
        println!("History cleared for {}", account);
        return Ok(());
    }

    let records = history.list()?;
    if records.is_empty() {
        println!("No games recorded for {}", account);
        return Ok(());
    }
    for record in &records {
        println!(
            "{}  {:<5} {}",
            record.timestamp().format("%Y-%m-%d %H:%M:%S"),
            record.result(),
            record.difficulty()
        );
    }
    let stats = history.stats()?;
    println!(
        "\n{} games: {} won, {} lost, {} drawn ({:.0}% win rate)",
        stats.total_games(),
        stats.wins(),
        stats.losses(),
        stats.draws(),
        stats.win_rate()
    );
    Ok(())
}
