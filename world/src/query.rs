//! Read-only views over world state for renderers, rules and bots.
//!
//! Every view is a detached snapshot in deterministic order (ascending
//! identifiers), so consumers can never mutate the world or observe it
//! mid-tick.

use snake_arena_core::{CellCoord, Direction, FoodId, GridSize, PlayerId, SnakeId};

use crate::{CellState, World};

/// Dimensions of the world's field.
#[must_use]
pub fn grid(world: &World) -> GridSize {
    world.field.grid()
}

/// State of a single cell; `None` outside the field.
#[must_use]
pub fn cell_state(world: &World, cell: CellCoord) -> Option<CellState> {
    world.field.state(cell)
}

/// Whether the simulation is currently frozen.
#[must_use]
pub fn is_paused(world: &World) -> bool {
    world.is_paused()
}

/// Read-only snapshot of a live snake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnakeSnapshot {
    /// Identifier of the snake.
    pub id: SnakeId,
    /// Player owning the snake.
    pub player: PlayerId,
    /// Display name, matching the player's name.
    pub name: String,
    /// Current heading.
    pub heading: Direction,
    /// Body cells ordered head first.
    pub segments: Vec<CellCoord>,
}

impl SnakeSnapshot {
    /// Position of the head segment.
    #[must_use]
    pub fn head(&self) -> CellCoord {
        self.segments[0]
    }
}

/// Captures a read-only view of every live snake, ordered by identifier.
#[must_use]
pub fn snake_view(world: &World) -> Vec<SnakeSnapshot> {
    let mut snapshots: Vec<SnakeSnapshot> = world
        .snakes
        .iter()
        .map(|snake| SnakeSnapshot {
            id: snake.id(),
            player: snake.player(),
            name: snake.name().to_owned(),
            heading: snake.heading(),
            segments: snake.segments().collect(),
        })
        .collect();
    snapshots.sort_by_key(|snapshot| snapshot.id);
    snapshots
}

/// Read-only snapshot of a piece of food.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FoodSnapshot {
    /// Identifier of the food.
    pub id: FoodId,
    /// Cell the food occupies.
    pub cell: CellCoord,
    /// Score credited on consumption.
    pub score: u32,
}

/// Captures every food item on the field, ordered by identifier.
#[must_use]
pub fn food_view(world: &World) -> Vec<FoodSnapshot> {
    let mut snapshots: Vec<FoodSnapshot> = world
        .foods
        .iter()
        .map(|food| FoodSnapshot {
            id: food.id(),
            cell: food.cell(),
            score: food.score(),
        })
        .collect();
    snapshots.sort_by_key(|snapshot| snapshot.id);
    snapshots
}

/// Read-only snapshot of a player record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerSnapshot {
    /// Identifier of the player.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Snake owned by the player.
    pub snake: SnakeId,
}

/// Captures every player that ever joined, ordered by identifier.
#[must_use]
pub fn players(world: &World) -> Vec<PlayerSnapshot> {
    let mut snapshots: Vec<PlayerSnapshot> = world
        .players
        .iter()
        .map(|player| PlayerSnapshot {
            id: player.id(),
            name: player.name().to_owned(),
            snake: player.snake(),
        })
        .collect();
    snapshots.sort_by_key(|snapshot| snapshot.id);
    snapshots
}
