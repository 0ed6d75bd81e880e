#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the snake arena.
//!
//! The world owns the field, the snakes, the players and the food. One call
//! to [`update`] advances the simulation by a single tick: headings are
//! applied, every collision is resolved against the pre-move snapshot so the
//! outcome never depends on player processing order, the dead vacate their
//! cells, and survivors advance. Everything observable happens through the
//! [`Event`] stream emitted on the bus passed into each mutating call.

mod field;
mod snake;
pub mod query;

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::{debug, info};

use snake_arena_core::{
    CellCoord, DeathCause, Direction, Event, EventBus, FoodId, GridSize, HandlerError, PlayerId,
    SnakeId,
};

pub use field::{CellState, Field};
pub use snake::Snake;

/// Errors raised while mutating world state outside the tick algorithm.
#[derive(Debug, Error)]
pub enum WorldError {
    /// A snake's starting body does not fit on the field.
    #[error("snake '{name}' does not fit on the field with its head at ({column}, {row})", column = head.column(), row = head.row())]
    SpawnOutOfBounds {
        /// Name of the snake that failed to spawn.
        name: String,
        /// Requested head position.
        head: CellCoord,
    },
    /// A snake's starting body overlaps an occupied cell.
    #[error("snake '{name}' overlaps an occupied cell at ({column}, {row})", column = cell.column(), row = cell.row())]
    SpawnOverlap {
        /// Name of the snake that failed to spawn.
        name: String,
        /// First occupied cell encountered.
        cell: CellCoord,
    },
    /// Food can only be placed on an empty, in-bounds cell.
    #[error("cannot place food at ({column}, {row}): cell is occupied or out of bounds", column = cell.column(), row = cell.row())]
    FoodPlacement {
        /// Offending cell.
        cell: CellCoord,
    },
    /// An event handler aborted the emit that accompanied the mutation.
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

/// Initial body layout requested for a joining player's snake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnPlan {
    /// Starting head position.
    pub head: CellCoord,
    /// Starting heading.
    pub heading: Direction,
    /// Number of body segments, at least one.
    pub length: u32,
}

/// A participant in the game; owns exactly one snake for its lifetime.
#[derive(Clone, Debug)]
pub struct Player {
    id: PlayerId,
    name: String,
    snake: SnakeId,
}

impl Player {
    /// Identifier of the player.
    #[must_use]
    pub const fn id(&self) -> PlayerId {
        self.id
    }

    /// Display name of the player.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snake owned by this player.
    #[must_use]
    pub const fn snake(&self) -> SnakeId {
        self.snake
    }
}

/// A piece of food waiting on the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Food {
    id: FoodId,
    cell: CellCoord,
    score: u32,
}

impl Food {
    /// Identifier of the food.
    #[must_use]
    pub const fn id(&self) -> FoodId {
        self.id
    }

    /// Cell the food occupies.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Score credited to the eater.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }
}

/// Per-tick move intents, one optional heading per player.
///
/// Absent entries mean "no input this tick": the snake keeps its heading.
#[derive(Clone, Debug, Default)]
pub struct MoveIntents {
    moves: HashMap<PlayerId, Direction>,
}

impl MoveIntents {
    /// Creates an empty intent set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the intended heading for a player; the last write wins.
    pub fn set(&mut self, player: PlayerId, direction: Direction) {
        let _ = self.moves.insert(player, direction);
    }

    /// Intended heading for the player, if any was supplied this tick.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> Option<Direction> {
        self.moves.get(&player).copied()
    }

    /// Drops all recorded intents.
    pub fn clear(&mut self) {
        self.moves.clear();
    }
}

/// Represents the authoritative arena state.
#[derive(Debug)]
pub struct World {
    field: Field,
    snakes: Vec<Snake>,
    players: Vec<Player>,
    foods: Vec<Food>,
    paused: bool,
    tick_index: u64,
    next_snake: u32,
    next_player: u32,
    next_food: u32,
}

impl World {
    /// Creates an empty world with the given field dimensions.
    #[must_use]
    pub fn new(grid: GridSize) -> Self {
        Self {
            field: Field::new(grid),
            snakes: Vec::new(),
            players: Vec::new(),
            foods: Vec::new(),
            paused: false,
            tick_index: 0,
            next_snake: 0,
            next_player: 0,
            next_food: 0,
        }
    }

    /// Joins a player: creates the player record, materialises its snake on
    /// the field and emits [`Event::SnakeBorn`].
    pub fn join_player(
        &mut self,
        name: &str,
        plan: SpawnPlan,
        bus: &mut EventBus,
    ) -> Result<(PlayerId, SnakeId), WorldError> {
        let snake_id = SnakeId::new(self.next_snake);
        let player_id = PlayerId::new(self.next_player);
        let snake = Snake::materialise(
            snake_id,
            name.to_owned(),
            player_id,
            plan.head,
            plan.heading,
            plan.length,
            self.field.grid(),
        )
        .ok_or_else(|| WorldError::SpawnOutOfBounds {
            name: name.to_owned(),
            head: plan.head,
        })?;

        for cell in snake.segments() {
            if self.field.state(cell) != Some(CellState::Empty) {
                return Err(WorldError::SpawnOverlap {
                    name: name.to_owned(),
                    cell,
                });
            }
        }
        for cell in snake.segments() {
            self.field.set_state(cell, CellState::Snake(snake_id));
        }

        self.next_snake += 1;
        self.next_player += 1;
        self.snakes.push(snake);
        self.players.push(Player {
            id: player_id,
            name: name.to_owned(),
            snake: snake_id,
        });

        info!(player = name, snake = snake_id.get(), "player joined");
        bus.emit(Event::SnakeBorn {
            snake: snake_id,
            player: player_id,
        })?;
        Ok((player_id, snake_id))
    }

    /// Places food on an empty cell and emits [`Event::FoodSpawned`].
    pub fn spawn_food(
        &mut self,
        cell: CellCoord,
        score: u32,
        bus: &mut EventBus,
    ) -> Result<FoodId, WorldError> {
        if self.field.state(cell) != Some(CellState::Empty) {
            return Err(WorldError::FoodPlacement { cell });
        }
        let id = FoodId::new(self.next_food);
        self.next_food += 1;
        self.field.set_state(cell, CellState::Food(id));
        self.foods.push(Food { id, cell, score });
        bus.emit(Event::FoodSpawned {
            food: id,
            cell,
            score,
        })?;
        Ok(id)
    }

    /// Freezes or resumes the simulation; a paused world ignores ticks.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Whether the simulation is currently frozen.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Number of completed ticks since the world was created.
    #[must_use]
    pub const fn tick_index(&self) -> u64 {
        self.tick_index
    }

    /// Number of food items currently on the field.
    #[must_use]
    pub fn food_count(&self) -> usize {
        self.foods.len()
    }

    /// Number of live snakes.
    #[must_use]
    pub fn live_snake_count(&self) -> usize {
        self.snakes.len()
    }

    /// Read-only access to the field.
    #[must_use]
    pub const fn field(&self) -> &Field {
        &self.field
    }
}

fn snakes_with_pending<'a>(
    snakes: &'a [Snake],
    pending: &'a [PendingMove],
) -> impl Iterator<Item = (&'a Snake, &'a PendingMove)> {
    snakes.iter().zip(pending.iter())
}

struct PendingMove {
    candidate: Option<CellCoord>,
    grew: bool,
}

/// Number of body cells a snake keeps occupied during the coming move.
///
/// The tail is vacated unless the snake grows, so a length-one snake frees
/// its only cell the moment it moves and never blocks itself.
fn kept_cells(snake: &Snake, pending: &PendingMove) -> usize {
    if pending.grew {
        snake.len()
    } else {
        snake.len().saturating_sub(1)
    }
}

/// Advances the world by one simulation tick.
///
/// The fixed order is load-bearing for deterministic multi-snake outcomes:
/// candidate heads are computed for every live snake first, all collisions
/// are resolved against that pre-move snapshot, the dead vacate their cells,
/// and only then do survivors commit their moves. A paused world skips the
/// tick entirely.
pub fn update(
    world: &mut World,
    intents: &MoveIntents,
    bus: &mut EventBus,
) -> Result<(), HandlerError> {
    if world.paused {
        return Ok(());
    }
    world.tick_index = world.tick_index.wrapping_add(1);
    let grid = world.field.grid();

    // 1. Headings and candidate head positions, no mutation of bodies yet.
    let mut pending = Vec::with_capacity(world.snakes.len());
    for snake in world.snakes.iter_mut() {
        snake.apply_intent(intents.get(snake.player()));
        let candidate = snake.candidate_head(grid);
        let grew =
            candidate.is_some_and(|cell| world.foods.iter().any(|food| food.cell() == cell));
        pending.push(PendingMove { candidate, grew });
    }

    // 2. Cells that stay occupied through this tick, from the snapshot.
    let mut blocked: HashSet<CellCoord> = HashSet::new();
    for (snake, pending) in snakes_with_pending(&world.snakes, &pending) {
        for cell in snake.segments().take(kept_cells(snake, pending)) {
            let _ = blocked.insert(cell);
        }
    }

    let mut claims: HashMap<CellCoord, Vec<usize>> = HashMap::new();
    for (index, pending) in pending.iter().enumerate() {
        if let Some(cell) = pending.candidate {
            claims.entry(cell).or_default().push(index);
        }
    }

    // 3. Verdicts, resolved entirely against the pre-move snapshot.
    let mut verdicts: Vec<Option<DeathCause>> = Vec::with_capacity(pending.len());
    for (index, pending_move) in pending.iter().enumerate() {
        let verdict = match pending_move.candidate {
            None => Some(DeathCause::Wall),
            Some(cell) => {
                if blocked.contains(&cell) {
                    let struck = snakes_with_pending(&world.snakes, &pending)
                        .find(|(snake, pending)| {
                            snake
                                .segments()
                                .take(kept_cells(snake, pending))
                                .any(|occupied| occupied == cell)
                        })
                        .map(|(snake, _)| snake.id())
                        .expect("blocked cell belongs to a snake");
                    if struck == world.snakes[index].id() {
                        Some(DeathCause::SelfCollision)
                    } else {
                        Some(DeathCause::SnakeCollision { other: struck })
                    }
                } else {
                    let rivals = &claims[&cell];
                    if rivals.len() > 1 {
                        let other = rivals
                            .iter()
                            .find(|rival| **rival != index)
                            .map(|rival| world.snakes[*rival].id())
                            .expect("head-on collision involves another snake");
                        Some(DeathCause::HeadOnCollision { other })
                    } else {
                        None
                    }
                }
            }
        };
        verdicts.push(verdict);
    }

    // 4. Deaths: emit, vacate, but keep indices stable until survivors move.
    for (index, verdict) in verdicts.iter().enumerate() {
        let Some(cause) = verdict else {
            continue;
        };
        world.snakes[index].kill();
        for cell in world.snakes[index].segments() {
            world.field.set_state(cell, CellState::Empty);
        }
        let snake = &world.snakes[index];
        debug!(snake = snake.id().get(), ?cause, "snake died");
        bus.emit(Event::SnakeDied {
            snake: snake.id(),
            player: snake.player(),
            cause: *cause,
        })?;
    }

    // 5. Survivors: consume food and advance, vacating tails before any new
    // head is written so a snake may follow another's (or its own) tail.
    let mut new_heads: Vec<(SnakeId, CellCoord)> = Vec::with_capacity(pending.len());
    for (index, verdict) in verdicts.iter().enumerate() {
        if verdict.is_some() {
            continue;
        }
        let candidate = pending[index]
            .candidate
            .expect("surviving snake has a candidate head");
        let grew = pending[index].grew;
        if grew {
            if let Some(position) = world
                .foods
                .iter()
                .position(|food| food.cell() == candidate)
            {
                let food = world.foods.remove(position);
                let snake = &world.snakes[index];
                debug!(
                    snake = snake.id().get(),
                    score = food.score(),
                    "snake ate food"
                );
                bus.emit(Event::SnakeAte {
                    snake: snake.id(),
                    player: snake.player(),
                    food: food.id(),
                    cell: candidate,
                    score: food.score(),
                })?;
                bus.emit(Event::FoodRemoved {
                    food: food.id(),
                    cell: candidate,
                })?;
            }
        }
        let vacated = world.snakes[index].advance(candidate, grew);
        if let Some(tail) = vacated {
            world.field.set_state(tail, CellState::Empty);
        }
        new_heads.push((world.snakes[index].id(), candidate));
    }

    // 6. Field catches up with every surviving body's new head.
    for (id, head) in new_heads {
        world.field.set_state(head, CellState::Snake(id));
    }

    world.snakes.retain(Snake::is_alive);
    Ok(())
}
