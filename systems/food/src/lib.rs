#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic food spawn policy.
//!
//! After every tick the policy tops the field back up to its target food
//! count, picking uniformly random empty cells from a seeded RNG so a fixed
//! seed reproduces an identical food sequence across runs.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::warn;

use snake_arena_core::{CellCoord, EventBus, HandlerError};
use snake_arena_world::{query, CellState, World, WorldError};

/// Attempts per missing food before the policy gives up for the tick.
///
/// Rejection sampling degenerates on a packed field; the cap keeps a tick
/// bounded and the next tick simply tries again.
const PLACEMENT_ATTEMPTS: u32 = 128;

/// Configuration parameters required to construct the spawn policy.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    target_count: usize,
    food_score: u32,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration with the given target food count, score
    /// per food and RNG seed.
    #[must_use]
    pub const fn new(target_count: usize, food_score: u32, rng_seed: u64) -> Self {
        Self {
            target_count,
            food_score,
            rng_seed,
        }
    }
}

/// Spawn policy that keeps the field stocked with food.
#[derive(Debug)]
pub struct FoodPolicy {
    target_count: usize,
    food_score: u32,
    rng: ChaCha8Rng,
}

impl FoodPolicy {
    /// Creates a new policy using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            target_count: config.target_count,
            food_score: config.food_score,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Target number of food items kept on the field.
    #[must_use]
    pub const fn target_count(&self) -> usize {
        self.target_count
    }

    /// Spawns food on random empty cells until the field holds the target
    /// count, emitting [`snake_arena_core::Event::FoodSpawned`] per item.
    pub fn replenish(
        &mut self,
        world: &mut World,
        bus: &mut EventBus,
    ) -> Result<(), HandlerError> {
        let grid = query::grid(world);
        while world.food_count() < self.target_count {
            let Some(cell) = self.pick_empty_cell(world) else {
                warn!("no empty cell found for food, retrying next tick");
                return Ok(());
            };
            match world.spawn_food(cell, self.food_score, bus) {
                Ok(_) => {}
                Err(WorldError::Handler(error)) => return Err(error),
                Err(error) => {
                    // The picked cell was verified empty; anything else is a
                    // bookkeeping bug worth surfacing loudly.
                    unreachable!("food placement rejected on {grid:?}: {error}");
                }
            }
        }
        Ok(())
    }

    fn pick_empty_cell(&mut self, world: &World) -> Option<CellCoord> {
        let grid = query::grid(world);
        for _ in 0..PLACEMENT_ATTEMPTS {
            let cell = CellCoord::new(
                self.rng.gen_range(0..grid.columns()),
                self.rng.gen_range(0..grid.rows()),
            );
            if query::cell_state(world, cell) == Some(CellState::Empty) {
                return Some(cell);
            }
        }
        None
    }
}
