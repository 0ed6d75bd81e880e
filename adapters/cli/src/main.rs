#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line entry point that assembles and runs a snake arena game.

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use snake_arena_core::{CellCoord, Direction, GridSize};
use snake_arena_rendering::{compose, EventTicker, Presentation, RenderingBackend, Theme};
use snake_arena_rendering_macroquad::{KeyBindings, MacroquadBackend};
use snake_arena_system_bootstrap::{Controller, GameConfig, Session, SnakeSpawn};
use snake_arena_system_rules::Victory;

/// Victory rule selectable on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum VictoryArg {
    /// The game runs until every snake is dead.
    AllDead,
    /// The game stops as soon as one snake remains, which wins.
    LastSurvivor,
}

impl From<VictoryArg> for Victory {
    fn from(arg: VictoryArg) -> Self {
        match arg {
            VictoryArg::AllDead => Victory::AllDead,
            VictoryArg::LastSurvivor => Victory::LastSurvivor,
        }
    }
}

/// Multiplayer snake arena.
#[derive(Debug, Parser)]
#[command(name = "snake-arena", version, about)]
struct Args {
    /// Number of grid columns.
    #[arg(long, default_value_t = 32)]
    columns: u32,
    /// Number of grid rows.
    #[arg(long, default_value_t = 24)]
    rows: u32,
    /// Number of human players (0 to 2).
    #[arg(long, default_value_t = 1)]
    humans: u32,
    /// Number of computer-controlled snakes.
    #[arg(long, default_value_t = 1)]
    bots: u32,
    /// Starting body length of every snake.
    #[arg(long, default_value_t = 3)]
    length: u32,
    /// Presentation frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,
    /// World updates per second; must divide the frame rate evenly.
    #[arg(long, default_value_t = 10)]
    ups: u32,
    /// Number of food items kept on the field.
    #[arg(long, default_value_t = 3)]
    food_target: usize,
    /// Score credited per food item.
    #[arg(long, default_value_t = 1)]
    food_score: u32,
    /// Seed of the food spawn sequence.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Rule deciding when the game is over.
    #[arg(long, value_enum, default_value = "last-survivor")]
    victory: VictoryArg,
    /// Optional toml file overriding the built-in key layouts.
    #[arg(long)]
    key_bindings: Option<PathBuf>,
}

/// Spaced starting positions: seats alternate between the left and right
/// quarter columns, facing inward, with rows spread evenly down the field.
fn spawn_layout(grid: GridSize, seats: u32) -> Vec<(CellCoord, Direction)> {
    let left = grid.columns() / 4;
    let right = grid.columns().saturating_sub(1 + grid.columns() / 4);
    (0..seats)
        .map(|seat| {
            let row = grid.rows() * (seat + 1) / (seats + 1);
            let row = row.min(grid.rows().saturating_sub(1));
            if seat % 2 == 0 {
                (CellCoord::new(left, row), Direction::Right)
            } else {
                (CellCoord::new(right, row), Direction::Left)
            }
        })
        .collect()
}

fn build_config(args: &Args) -> Result<GameConfig> {
    if args.humans > 2 {
        bail!("at most 2 human players are supported, got {}", args.humans);
    }
    let seats = args.humans + args.bots;
    if seats == 0 {
        bail!("the game needs at least one snake; add a human or a bot");
    }

    let grid = GridSize::new(args.columns, args.rows);
    let layout = spawn_layout(grid, seats);
    let snakes = layout
        .into_iter()
        .enumerate()
        .map(|(seat, (head, heading))| {
            let seat = seat as u32;
            let (name, controller) = if seat < args.humans {
                (format!("player-{}", seat + 1), Controller::Human)
            } else {
                (format!("bot-{}", seat + 1 - args.humans), Controller::Greedy)
            };
            SnakeSpawn {
                name,
                head,
                heading,
                length: args.length,
                controller,
            }
        })
        .collect();

    Ok(GameConfig {
        grid,
        snakes,
        victory: args.victory.into(),
        fps: args.fps,
        ups: args.ups,
        food_target: args.food_target,
        food_score: args.food_score,
        seed: args.seed,
    })
}

fn load_key_bindings(path: Option<&PathBuf>) -> Result<KeyBindings> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read key bindings from {}", path.display()))?;
            KeyBindings::from_toml(&text)
        }
        None => Ok(KeyBindings::default()),
    }
}

/// Entry point for the snake arena command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = build_config(&args)?;
    config.validate().context("invalid game configuration")?;

    let bindings = load_key_bindings(args.key_bindings.as_ref())?;
    let layouts = bindings.layouts()?;
    if (layouts.len() as u32) < args.humans {
        bail!(
            "{} human players need {} key layouts, the bindings provide {}",
            args.humans,
            args.humans,
            layouts.len()
        );
    }

    let mut session = Session::new(config).context("failed to start the game")?;
    let seating = session.seating();
    let human_seats: Vec<_> = seating
        .iter()
        .take(args.humans as usize)
        .zip(layouts)
        .map(|((player, _), layout)| (*player, layout))
        .collect();

    let names = seating
        .iter()
        .enumerate()
        .map(|(seat, (player, _))| {
            let seat = seat as u32;
            let name = if seat < args.humans {
                format!("player-{}", seat + 1)
            } else {
                format!("bot-{}", seat + 1 - args.humans)
            };
            (*player, name)
        })
        .collect::<Vec<_>>();
    let ticker = Rc::new(RefCell::new(EventTicker::new(6, names)));
    let _ = EventTicker::attach(session.bus_mut(), Rc::clone(&ticker));

    let scoreboard = session.scoreboard();
    let theme = Theme::default();
    let initial = compose(
        session.world(),
        session.phase(),
        &scoreboard.borrow(),
        &ticker.borrow(),
        &theme,
    );
    let presentation = Presentation::new("Snake Arena", theme.background, initial);

    info!(fps = args.fps, ups = args.ups, "starting the game loop");
    let backend = MacroquadBackend::new()
        .with_target_fps(args.fps)
        .with_seats(human_seats);

    backend.run(presentation, move |input| {
        if input.toggle_pause {
            session.toggle_pause();
        }
        let _ = session
            .advance_frame(&input.intents)
            .context("an event handler failed; aborting the game")?;
        Ok(Some(compose(
            session.world(),
            session.phase(),
            &scoreboard.borrow(),
            &ticker.borrow(),
            &theme,
        )))
    })
}
