//! Command-line interface for tacotex.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use tacotex::Difficulty;

/// TacoTex - Tic-tac-toe against an AI opponent
#[derive(Parser, Debug)]
#[command(name = "tacotex")]
#[command(about = "Tic-tac-toe against a local or contract-backed AI", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Where the opponent runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// In-process engine
    Local,
    /// In-process stand-in for the game contract
    Simulated,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play in the terminal UI
    Play {
        /// Skip the selector and start at this difficulty (easy, medium, hard)
        #[arg(short, long)]
        difficulty: Option<Difficulty>,

        /// Opponent backend
        #[arg(short, long, value_enum, default_value = "local")]
        backend: BackendKind,
    },

    /// Let two AIs play each other and print the tally
    Simulate {
        /// Policy for X
        #[arg(long, default_value = "hard")]
        x: Difficulty,

        /// Policy for O
        #[arg(long, default_value = "hard")]
        o: Difficulty,

        /// Number of games
        #[arg(short, long, default_value = "100")]
        games: usize,

        /// Seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print stored game history
    History {
        /// Delete the history instead of printing it
        #[arg(long)]
        clear: bool,

        /// Account whose history to use (defaults to the configured wallet)
        #[arg(long)]
        account: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_play_options() {
        let cli = Cli::parse_from(["tacotex", "play", "-d", "Hard", "--backend", "simulated"]);
        match cli.command {
            Command::Play { difficulty, backend } => {
                assert_eq!(difficulty, Some(Difficulty::Hard));
                assert_eq!(backend, BackendKind::Simulated);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_simulate_defaults() {
        let cli = Cli::parse_from(["tacotex", "simulate", "--x", "easy"]);
        match cli.command {
            Command::Simulate { x, o, games, seed } => {
                assert_eq!(x, Difficulty::Easy);
                assert_eq!(o, Difficulty::Hard);
                assert_eq!(games, 100);
                assert_eq!(seed, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
