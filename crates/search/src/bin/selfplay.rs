//! Plays a game in the terminal. Engine seats are driven by the search
//! worker; human seats read their turn from stdin as compass directions
//! (`n ne e se s sw w nw`).

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use kickoff_core::{Board, Direction, GameConfig, Player};
use kickoff_search::{SearchConfig, SearchWorker};
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "selfplay", about = "Play paper soccer against the search engine")]
struct Cli {
    /// TOML file with `[game]` and `[search]` tables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Board width, overrides the config file
    #[arg(long)]
    width: Option<i32>,

    /// Board height without the gates, overrides the config file
    #[arg(long)]
    height: Option<i32>,

    /// Search depth in steps, overrides the config file
    #[arg(long)]
    depth: Option<i32>,

    /// Let a human play this seat (1 or 2)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=2))]
    human: Vec<u8>,

    /// Thinking time per engine turn in milliseconds
    #[arg(long, default_value_t = 2000)]
    think_ms: u64,

    /// Stop after this many turns
    #[arg(long, default_value_t = 200)]
    max_turns: usize,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct SettingsFile {
    game: GameConfig,
    search: SearchConfig,
}

fn load_settings(cli: &Cli) -> Result<(GameConfig, SearchConfig)> {
    let SettingsFile { mut game, mut search } = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => SettingsFile {
            // engine against engine unless asked otherwise
            game: GameConfig {
                human: [false, false],
                ..GameConfig::default()
            },
            search: SearchConfig::default(),
        },
    };

    if let Some(width) = cli.width {
        game.width = width;
    }
    if let Some(height) = cli.height {
        game.height = height;
    }
    if let Some(depth) = cli.depth {
        search.depth = depth;
    }
    for &seat in &cli.human {
        let player = Player::from_index(seat - 1).context("seat must be 1 or 2")?;
        game.set_player_human(player, true);
    }

    game.validate()?;
    Ok((game, search))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let (game, search) = load_settings(&cli)?;
    info!(width = game.width, height = game.height, depth = search.depth, "new game");

    let mut board = game.new_board()?;
    let mut worker = SearchWorker::new(search);
    let think = Duration::from_millis(cli.think_ms);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("{board}");
    for turn in 1..=cli.max_turns {
        if let Some(winner) = board.winner() {
            println!("{winner:?} wins after {} turns", turn - 1);
            return Ok(());
        }

        let player = board.current_player();
        if game.is_player_human(player) {
            loop {
                print!("{player:?}> ");
                io::stdout().flush()?;
                let Some(line) = lines.next() else {
                    bail!("stdin closed");
                };
                match play_human_turn(&mut board, &line?) {
                    Ok(()) => break,
                    Err(err) => println!("{err:#}"),
                }
            }
        } else {
            play_engine_turn(&mut board, &mut worker, think)?;
        }

        if board.winner().is_none() {
            board.finish_move();
        }
        println!("{board}");
    }

    match board.winner() {
        Some(winner) => println!("{winner:?} wins"),
        None => println!("no winner after {} turns", cli.max_turns),
    }
    Ok(())
}

fn play_engine_turn(board: &mut Board, worker: &mut SearchWorker, think: Duration) -> Result<()> {
    let start = Instant::now();
    worker.start(board)?;
    while worker.active_request().is_some() && start.elapsed() < think {
        if let Some(reply) = worker.poll() {
            info!(score = reply.score, nodes = reply.nodes, "engine move");
            *board = reply.board;
            return Ok(());
        }
        thread::sleep(Duration::from_millis(5));
    }

    worker.cancel();
    warn!(elapsed_ms = start.elapsed().as_millis() as u64, "search out of time, playing first legal turn");
    let steps = first_turn(board).context("no legal turn")?;
    for dir in steps {
        board.push_step(dir);
    }
    Ok(())
}

/// Steps of the first turn in enumeration order; cheap on any board size.
fn first_turn(board: &mut Board) -> Option<Vec<Direction>> {
    let before = board.current_move().len();
    let mut first = None;
    board.enumerate_moves(|_, steps| {
        first = Some(steps[before..].to_vec());
        false
    });
    first
}

/// Plays a whole typed turn or nothing.
fn play_human_turn(board: &mut Board, line: &str) -> Result<()> {
    let steps = line
        .split_whitespace()
        .map(parse_direction)
        .collect::<Result<Vec<_>>>()?;

    let mut next = board.clone();
    for dir in steps {
        if !next.can_step_in_direction(dir) {
            bail!("cannot step {dir:?} from ({}, {})", next.ball().x, next.ball().y);
        }
        next.push_step(dir);
    }
    if next.winner().is_none() && !next.can_finish_move() {
        bail!("turn is not over yet, keep going");
    }
    *board = next;
    Ok(())
}

fn parse_direction(token: &str) -> Result<Direction> {
    let dir = match token.to_ascii_lowercase().as_str() {
        "nw" => Direction::NorthWest,
        "n" => Direction::North,
        "ne" => Direction::NorthEast,
        "e" => Direction::East,
        "se" => Direction::SouthEast,
        "s" => Direction::South,
        "sw" => Direction::SouthWest,
        "w" => Direction::West,
        other => bail!("unknown direction {other:?}"),
    };
    Ok(dir)
}
