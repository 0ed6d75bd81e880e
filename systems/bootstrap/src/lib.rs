#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game bootstrapping: configuration validation and the session driver.
//!
//! [`GameConfig`] is validated in full before anything else happens, so
//! every configuration mistake aborts startup with a diagnostic instead of
//! being silently coerced mid-game. A validated config becomes a
//! [`Session`]: the world, the event bus, the rule engine, the scoreboard,
//! the food policy and one controller per player, driven frame by frame at
//! a fixed logical rate.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use thiserror::Error;
use tracing::info;

use snake_arena_core::{
    CellCoord, Direction, EventBus, GridSize, HandlerError, PlayerId, SnakeId,
};
use snake_arena_system_bots::GreedyBot;
use snake_arena_system_food::{Config as FoodConfig, FoodPolicy};
use snake_arena_system_rules::{DeathMode, Phase, Victory};
use snake_arena_system_scoring::Scoreboard;
use snake_arena_world::{self as world, query, MoveIntents, SpawnPlan, World, WorldError};

/// Who supplies a player's move intent each tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Controller {
    /// Intents arrive from the input adapter every frame.
    Human,
    /// A fixed list of headings, one consumed per tick; the snake continues
    /// straight once the script runs out.
    Scripted(Vec<Direction>),
    /// The deterministic greedy bot chooses each tick.
    Greedy,
}

/// Starting layout and control mode for one snake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnakeSpawn {
    /// Player and snake display name.
    pub name: String,
    /// Starting head position.
    pub head: CellCoord,
    /// Starting heading.
    pub heading: Direction,
    /// Starting body length, at least one.
    pub length: u32,
    /// Move-intent source for the snake.
    pub controller: Controller,
}

/// Complete startup parameters for a game.
#[derive(Clone, Debug)]
pub struct GameConfig {
    /// Field dimensions.
    pub grid: GridSize,
    /// One entry per joining player.
    pub snakes: Vec<SnakeSpawn>,
    /// Population threshold ending the game.
    pub victory: Victory,
    /// Presentation frames per second.
    pub fps: u32,
    /// Logical world updates per second; must divide `fps` evenly.
    pub ups: u32,
    /// Number of food items the spawn policy keeps on the field.
    pub food_target: usize,
    /// Score value carried by each food item.
    pub food_score: u32,
    /// Seed for the food spawn RNG; a fixed seed reproduces a run.
    pub seed: u64,
}

/// Configuration mistakes rejected before the loop starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The grid must have at least one column and one row.
    #[error("grid must be at least 1x1, got {columns}x{rows}")]
    EmptyGrid {
        /// Configured column count.
        columns: u32,
        /// Configured row count.
        rows: u32,
    },
    /// At least one snake must join the game.
    #[error("at least one snake is required")]
    NoSnakes,
    /// The frame rate must be positive.
    #[error("frames per second must be at least 1")]
    ZeroFps,
    /// The update rate must be positive.
    #[error("updates per second must be at least 1")]
    ZeroUps,
    /// Logic cannot run faster than presentation.
    #[error("updates per second ({ups}) must not exceed frames per second ({fps})")]
    UpsExceedsFps {
        /// Configured frame rate.
        fps: u32,
        /// Configured update rate.
        ups: u32,
    },
    /// The frame counter pattern requires an exact multiple.
    #[error("frames per second ({fps}) must be an exact multiple of updates per second ({ups})")]
    FpsNotMultipleOfUps {
        /// Configured frame rate.
        fps: u32,
        /// Configured update rate.
        ups: u32,
    },
    /// Snakes need at least one segment.
    #[error("snake '{name}' must start with at least one segment")]
    ZeroLength {
        /// Offending snake.
        name: String,
    },
    /// Two snakes were assigned the same starting head position.
    #[error("snakes '{first}' and '{second}' share the start position ({column}, {row})", column = head.column(), row = head.row())]
    DuplicateStart {
        /// First snake at the position.
        first: String,
        /// Second snake at the position.
        second: String,
        /// Shared head position.
        head: CellCoord,
    },
    /// The field must keep at least one empty cell next to the food target.
    #[error("food target {target} does not fit: {occupied} cells occupied on a {cells}-cell field")]
    FoodTargetTooLarge {
        /// Configured food target.
        target: usize,
        /// Cells taken by starting snake bodies.
        occupied: u64,
        /// Total cells on the field.
        cells: u64,
    },
    /// Spawning a starting body failed against the actual field.
    #[error(transparent)]
    World(#[from] WorldError),
}

impl GameConfig {
    /// Checks every startup parameter, failing fast with a diagnostic.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.columns() == 0 || self.grid.rows() == 0 {
            return Err(ConfigError::EmptyGrid {
                columns: self.grid.columns(),
                rows: self.grid.rows(),
            });
        }
        if self.snakes.is_empty() {
            return Err(ConfigError::NoSnakes);
        }
        if self.fps == 0 {
            return Err(ConfigError::ZeroFps);
        }
        if self.ups == 0 {
            return Err(ConfigError::ZeroUps);
        }
        if self.ups > self.fps {
            return Err(ConfigError::UpsExceedsFps {
                fps: self.fps,
                ups: self.ups,
            });
        }
        if self.fps % self.ups != 0 {
            return Err(ConfigError::FpsNotMultipleOfUps {
                fps: self.fps,
                ups: self.ups,
            });
        }
        for (index, spawn) in self.snakes.iter().enumerate() {
            if spawn.length == 0 {
                return Err(ConfigError::ZeroLength {
                    name: spawn.name.clone(),
                });
            }
            for earlier in &self.snakes[..index] {
                if earlier.head == spawn.head {
                    return Err(ConfigError::DuplicateStart {
                        first: earlier.name.clone(),
                        second: spawn.name.clone(),
                        head: spawn.head,
                    });
                }
            }
        }
        let occupied: u64 = self.snakes.iter().map(|spawn| u64::from(spawn.length)).sum();
        if self.food_target as u64 + occupied >= self.grid.cell_count() {
            return Err(ConfigError::FoodTargetTooLarge {
                target: self.food_target,
                occupied,
                cells: self.grid.cell_count(),
            });
        }
        Ok(())
    }
}

/// What a single frame of the session amounted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A render-only frame between logical ticks.
    Idle,
    /// A tick frame skipped because the world is paused.
    Paused,
    /// The world advanced one tick.
    Ticked,
    /// The rule engine is in its terminal phase; ticks no longer run.
    GameOver,
}

enum ControllerState {
    Human,
    Scripted(VecDeque<Direction>),
    Greedy(GreedyBot),
}

struct Seat {
    player: PlayerId,
    snake: SnakeId,
    controller: ControllerState,
}

/// A fully assembled game, driven one presentation frame at a time.
pub struct Session {
    world: World,
    bus: EventBus,
    rule: Rc<RefCell<DeathMode>>,
    scoreboard: Rc<RefCell<Scoreboard>>,
    food: FoodPolicy,
    seats: Vec<Seat>,
    frames_per_tick: u64,
    frame: u64,
}

impl Session {
    /// Validates the config and assembles the session: players join, the
    /// rule engine and scoreboard subscribe to the bus, and the food policy
    /// stocks the field.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut bus = EventBus::new();
        let mut world = World::new(config.grid);
        let mut seats = Vec::with_capacity(config.snakes.len());
        for spawn in &config.snakes {
            let (player, snake) = world.join_player(
                &spawn.name,
                SpawnPlan {
                    head: spawn.head,
                    heading: spawn.heading,
                    length: spawn.length,
                },
                &mut bus,
            )?;
            let controller = match &spawn.controller {
                Controller::Human => ControllerState::Human,
                Controller::Scripted(moves) => {
                    ControllerState::Scripted(moves.iter().copied().collect())
                }
                Controller::Greedy => ControllerState::Greedy(GreedyBot),
            };
            seats.push(Seat {
                player,
                snake,
                controller,
            });
        }

        let players: Vec<PlayerId> = seats.iter().map(|seat| seat.player).collect();
        let rule = Rc::new(RefCell::new(DeathMode::new(config.victory, players.clone())));
        let _ = DeathMode::attach(&mut bus, Rc::clone(&rule));
        let scoreboard = Rc::new(RefCell::new(Scoreboard::new(players)));
        let _ = Scoreboard::attach(&mut bus, Rc::clone(&scoreboard));

        let mut food = FoodPolicy::new(FoodConfig::new(
            config.food_target,
            config.food_score,
            config.seed,
        ));
        food.replenish(&mut world, &mut bus)
            .map_err(WorldError::from)?;

        info!(
            columns = config.grid.columns(),
            rows = config.grid.rows(),
            players = seats.len(),
            fps = config.fps,
            ups = config.ups,
            "session ready"
        );

        Ok(Self {
            world,
            bus,
            rule,
            scoreboard,
            food,
            seats,
            frames_per_tick: u64::from(config.fps / config.ups),
            frame: 0,
        })
    }

    /// Advances one presentation frame.
    ///
    /// A logical tick fires on every `fps / ups`-th frame unless the world
    /// is paused or the rule engine reached game over; all other frames are
    /// render-only. The caller polls input every frame regardless, so
    /// unpausing stays responsive.
    pub fn advance_frame(
        &mut self,
        human_intents: &MoveIntents,
    ) -> Result<FrameOutcome, HandlerError> {
        let frame = self.frame;
        self.frame = self.frame.wrapping_add(1);
        if frame % self.frames_per_tick != 0 {
            return Ok(FrameOutcome::Idle);
        }
        if self.rule.borrow().is_game_over() {
            return Ok(FrameOutcome::GameOver);
        }
        if self.world.is_paused() {
            return Ok(FrameOutcome::Paused);
        }

        let intents = self.collect_intents(human_intents);
        world::update(&mut self.world, &intents, &mut self.bus)?;
        self.food.replenish(&mut self.world, &mut self.bus)?;

        if self.rule.borrow().is_game_over() {
            Ok(FrameOutcome::GameOver)
        } else {
            Ok(FrameOutcome::Ticked)
        }
    }

    fn collect_intents(&mut self, human_intents: &MoveIntents) -> MoveIntents {
        let snakes = query::snake_view(&self.world);
        let foods = query::food_view(&self.world);
        let grid = query::grid(&self.world);

        let mut intents = MoveIntents::new();
        for seat in self.seats.iter_mut() {
            let chosen = match &mut seat.controller {
                ControllerState::Human => human_intents.get(seat.player),
                ControllerState::Scripted(moves) => moves.pop_front(),
                ControllerState::Greedy(bot) => bot.choose(seat.snake, &snakes, &foods, grid),
            };
            if let Some(direction) = chosen {
                intents.set(seat.player, direction);
            }
        }
        intents
    }

    /// Flips the pause flag; the next tick frame freezes or resumes.
    pub fn toggle_pause(&mut self) {
        let paused = !self.world.is_paused();
        self.world.set_paused(paused);
        info!(paused, "pause toggled");
    }

    /// Whether the world is currently paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.world.is_paused()
    }

    /// Current phase of the rule engine.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.rule.borrow().phase()
    }

    /// Read-only access to the world for composing frames.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Shared scoreboard handle for presentation.
    #[must_use]
    pub fn scoreboard(&self) -> Rc<RefCell<Scoreboard>> {
        Rc::clone(&self.scoreboard)
    }

    /// Bus access for adapters that subscribe to the event stream.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Players in seat order with their snakes.
    #[must_use]
    pub fn seating(&self) -> Vec<(PlayerId, SnakeId)> {
        self.seats
            .iter()
            .map(|seat| (seat.player, seat.snake))
            .collect()
    }
}
