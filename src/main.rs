//! TetrECS runner (default binary).
//!
//! `play` runs a local game, `join` plays against a relay, `relay` runs one.
//! Logging goes through env_logger; set `RUST_LOG` to see it.

mod view;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use tetrecs::adapter::{run_server, PeerLink, ServerConfig, WireLog};
use tetrecs::core::{insert_score, load_scores, save_scores, GameSnapshot, ScoreEntry};
use tetrecs::engine::{spawn_multiplayer, spawn_single_player, EngineConfig};

/// Entries kept in the local score file
const SCORE_LIST_LIMIT: usize = 10;

/// Block placement puzzle with a countdown on every turn.
#[derive(Debug, Parser)]
#[command(
    name = "tetrecs",
    version,
    about = "Place pieces on a 5x5 grid, clear full rows and columns before the timer runs out.",
    long_about = "Place pieces on a 5x5 grid; every full row or column clears for points.\n\
        Each turn has a countdown that shortens as your level rises. Let it run out and you lose a life.\n\n\
        CONTROLS:\n  Arrows       Move cursor   Enter      Place at cursor   Mouse click  Place at cell\n  \
        Q/Z/[        Rotate CW     E/C/]      Rotate CCW        Space/R      Swap pieces\n  Esc / Ctrl-C Quit"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play a local game
    Play {
        /// Seed for the piece generator. Random if not set.
        #[arg(long)]
        seed: Option<u32>,

        #[command(flatten)]
        player: PlayerArgs,
    },
    /// Join a relay and play against everyone connected to it
    Join {
        /// Relay address. Defaults to TETRECS_RELAY_HOST:TETRECS_RELAY_PORT.
        #[arg(long, value_name = "HOST:PORT")]
        addr: Option<String>,

        #[command(flatten)]
        player: PlayerArgs,
    },
    /// Run a relay server for multiplayer games
    Relay {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        /// Seed for the shared piece sequence
        #[arg(long)]
        seed: Option<u32>,
    },
}

#[derive(Debug, clap::Args)]
struct PlayerArgs {
    /// Name for the score file and the leaderboard
    #[arg(long, default_value = "player")]
    name: String,

    /// Score file. Defaults to TETRECS_SCORES_PATH or scores.txt.
    #[arg(long, value_name = "FILE")]
    scores: Option<PathBuf>,
}

impl PlayerArgs {
    fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::from_env();
        if let Some(path) = self.scores.clone() {
            config.scores_path = Some(path);
        }
        config.player_name = Some(self.name.clone());
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Play { seed, player } => {
            let mut config = player.engine_config();
            config.seed = seed.unwrap_or_else(clock_seed);
            log::info!("Starting local game with seed {}", config.seed);

            let last = view::run(spawn_single_player(config.clone())).await?;
            finish(&player, &config, &last)
        }
        Command::Join { addr, player } => {
            let addr = match addr {
                Some(addr) => addr,
                None => ServerConfig::from_env().socket_addr()?.to_string(),
            };
            let link = PeerLink::connect(addr.as_str(), WireLog::from_env())
                .await
                .with_context(|| format!("Could not join relay at {}", addr))?;

            let config = player.engine_config();
            let last = view::run(spawn_multiplayer(config.clone(), link)).await?;
            finish(&player, &config, &last)
        }
        Command::Relay { host, port, seed } => {
            let mut config = ServerConfig::from_env();
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(seed) = seed {
                config.seed = seed;
            }
            run_server(config, None).await
        }
    }
}

/// Report the result and record it in the score file
fn finish(player: &PlayerArgs, config: &EngineConfig, last: &GameSnapshot) -> Result<()> {
    println!("Final score: {} (level {})", last.score, last.level);

    let Some(path) = config.scores_path.as_deref() else {
        return Ok(());
    };
    if last.score == 0 {
        return Ok(());
    }

    let entries = record_score(path, ScoreEntry::new(player.name.clone(), last.score))?;
    log::info!("Score file {} now has {} entries", path.display(), entries.len());

    if last.score >= last.high_score {
        println!("New high score!");
    }
    Ok(())
}

/// Add `entry` to the score file. An unreadable file is replaced, not fatal.
fn record_score(path: &Path, entry: ScoreEntry) -> Result<Vec<ScoreEntry>> {
    let mut entries = if path.exists() {
        load_scores(path).unwrap_or_else(|e| {
            log::warn!("Starting a fresh score list: {}", e);
            Vec::new()
        })
    } else {
        Vec::new()
    };
    insert_score(&mut entries, entry, SCORE_LIST_LIMIT);
    save_scores(path, &entries)?;
    Ok(entries)
}

fn clock_seed() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_scores(tag: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("tetrecs-{}-{}.txt", tag, std::process::id()));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn test_malformed_score_file_is_replaced() {
        let path = temp_scores("malformed");
        std::fs::write(&path, "not a score line\n").unwrap();

        let entries = record_score(&path, ScoreEntry::new("ada", 300)).unwrap();
        assert_eq!(entries, vec![ScoreEntry::new("ada", 300)]);
        assert_eq!(load_scores(&path).unwrap(), entries);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_score_inserted_in_order() {
        let path = temp_scores("ordered");
        std::fs::write(&path, "bob:900\ncy:100\n").unwrap();

        let entries = record_score(&path, ScoreEntry::new("ada", 300)).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["bob", "ada", "cy"]);
        let _ = std::fs::remove_file(&path);
    }
}
