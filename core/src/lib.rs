#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the snake arena engine.
//!
//! This crate defines the vocabulary that connects the authoritative world,
//! the pure systems (rules, food spawning, scoring, bots) and the
//! presentation adapters: grid coordinates, headings, entity identifiers,
//! the [`Event`] stream the simulation broadcasts, and the [`EventBus`] that
//! delivers it synchronously to registered handlers. Nothing in here mutates
//! world state; everything is plain data plus the bus.

mod bus;

use serde::{Deserialize, Serialize};

pub use bus::{EventBus, FollowUps, Handler, HandlerError, HandlerId};

/// Unique identifier assigned to a snake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnakeId(u32);

impl SnakeId {
    /// Creates a new snake identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a piece of food.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FoodId(u32);

impl FoodId {
    /// Creates a new food identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }
}

/// Dimensions of the playing field measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    columns: u32,
    rows: u32,
}

impl GridSize {
    /// Creates a new grid size descriptor.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of cells contained in the grid.
    #[must_use]
    pub const fn cell_count(&self) -> u64 {
        self.columns as u64 * self.rows as u64
    }

    /// Returns `true` when the coordinate lies inside the grid bounds.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }
}

/// Cardinal headings available to a snake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every heading in a fixed, deterministic order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Returns the heading pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Returns `true` when the two headings point in opposite directions.
    #[must_use]
    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }

    /// Computes the cell adjacent to `from` along this heading.
    ///
    /// Returns `None` when the step would leave the grid, which callers treat
    /// as a wall collision rather than an error.
    #[must_use]
    pub fn step(self, from: CellCoord, grid: GridSize) -> Option<CellCoord> {
        let next = match self {
            Direction::Up => CellCoord::new(from.column(), from.row().checked_sub(1)?),
            Direction::Down => CellCoord::new(from.column(), from.row().checked_add(1)?),
            Direction::Left => CellCoord::new(from.column().checked_sub(1)?, from.row()),
            Direction::Right => CellCoord::new(from.column().checked_add(1)?, from.row()),
        };
        grid.contains(next).then_some(next)
    }
}

/// Cause recorded when a snake is removed from the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeathCause {
    /// The candidate head position left the playing field.
    Wall,
    /// The candidate head position landed on the snake's own body.
    SelfCollision,
    /// The candidate head position landed on another snake's body.
    SnakeCollision {
        /// Snake whose body was struck.
        other: SnakeId,
    },
    /// Two snakes attempted to enter the same cell in the same tick.
    HeadOnCollision {
        /// The other snake involved in the simultaneous collision.
        other: SnakeId,
    },
}

/// Events broadcast by the world while resolving a simulation tick.
///
/// Events are transient value objects: created during a tick, consumed
/// synchronously by bus subscribers, never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a player joined and a snake was written into the field.
    SnakeBorn {
        /// Identifier of the newly created snake.
        snake: SnakeId,
        /// Player owning the snake.
        player: PlayerId,
    },
    /// Announces that a snake collided and was removed from the active set.
    SnakeDied {
        /// Identifier of the snake that died.
        snake: SnakeId,
        /// Player who owned the snake.
        player: PlayerId,
        /// Collision outcome that killed the snake.
        cause: DeathCause,
    },
    /// Announces that a snake consumed a piece of food and grew.
    SnakeAte {
        /// Identifier of the snake that ate.
        snake: SnakeId,
        /// Player owning the snake, credited with the score.
        player: PlayerId,
        /// Identifier of the consumed food.
        food: FoodId,
        /// Cell where the food was consumed.
        cell: CellCoord,
        /// Score value carried by the food.
        score: u32,
    },
    /// Announces that the spawn policy placed new food on the field.
    FoodSpawned {
        /// Identifier assigned to the food.
        food: FoodId,
        /// Cell the food occupies.
        cell: CellCoord,
        /// Score value awarded on consumption.
        score: u32,
    },
    /// Announces that food left the field, either eaten or despawned.
    FoodRemoved {
        /// Identifier of the removed food.
        food: FoodId,
        /// Cell the food previously occupied.
        cell: CellCoord,
    },
}

/// Field-less discriminant of [`Event`], used for handler registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Matches [`Event::SnakeBorn`].
    SnakeBorn,
    /// Matches [`Event::SnakeDied`].
    SnakeDied,
    /// Matches [`Event::SnakeAte`].
    SnakeAte,
    /// Matches [`Event::FoodSpawned`].
    FoodSpawned,
    /// Matches [`Event::FoodRemoved`].
    FoodRemoved,
}

impl EventKind {
    /// Every event kind in a fixed, deterministic order.
    pub const ALL: [EventKind; 5] = [
        EventKind::SnakeBorn,
        EventKind::SnakeDied,
        EventKind::SnakeAte,
        EventKind::FoodSpawned,
        EventKind::FoodRemoved,
    ];
}

impl Event {
    /// Returns the discriminant handlers register against.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Event::SnakeBorn { .. } => EventKind::SnakeBorn,
            Event::SnakeDied { .. } => EventKind::SnakeDied,
            Event::SnakeAte { .. } => EventKind::SnakeAte,
            Event::FoodSpawned { .. } => EventKind::FoodSpawned,
            Event::FoodRemoved { .. } => EventKind::FoodRemoved,
        }
    }
}
