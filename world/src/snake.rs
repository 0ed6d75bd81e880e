//! Snake bodies: ordered segments with head/tail semantics and a heading.

use std::collections::VecDeque;

use snake_arena_core::{CellCoord, Direction, GridSize, PlayerId, SnakeId};

/// An ordered body of grid cells, head first, owned by a single player.
#[derive(Clone, Debug)]
pub struct Snake {
    id: SnakeId,
    name: String,
    player: PlayerId,
    body: VecDeque<CellCoord>,
    heading: Direction,
    alive: bool,
}

impl Snake {
    /// Builds a straight body of `length` cells trailing behind `head`
    /// opposite the heading. Returns `None` when the body does not fit on
    /// the grid.
    pub(crate) fn materialise(
        id: SnakeId,
        name: String,
        player: PlayerId,
        head: CellCoord,
        heading: Direction,
        length: u32,
        grid: GridSize,
    ) -> Option<Self> {
        if length == 0 || !grid.contains(head) {
            return None;
        }
        let mut body = VecDeque::with_capacity(length as usize);
        body.push_back(head);
        let mut cursor = head;
        for _ in 1..length {
            cursor = heading.opposite().step(cursor, grid)?;
            body.push_back(cursor);
        }
        Some(Self {
            id,
            name,
            player,
            body,
            heading,
            alive: true,
        })
    }

    /// Identifier of the snake.
    #[must_use]
    pub const fn id(&self) -> SnakeId {
        self.id
    }

    /// Display name of the snake, matching its player's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Player owning this snake.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Current heading of the snake's head.
    #[must_use]
    pub const fn heading(&self) -> Direction {
        self.heading
    }

    /// Whether the snake is still part of the active set.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Position of the head segment.
    #[must_use]
    pub fn head(&self) -> CellCoord {
        *self.body.front().expect("snake body is never empty")
    }

    /// Number of body segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns `true` when the snake has no segments; never the case for a
    /// live snake.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Iterates over the body from head to tail.
    pub fn segments(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.body.iter().copied()
    }

    /// Adopts the requested heading unless it would reverse a multi-segment
    /// snake 180 degrees, which is an illegal move and leaves the heading
    /// unchanged (the snake continues straight).
    pub(crate) fn apply_intent(&mut self, requested: Option<Direction>) {
        if let Some(direction) = requested {
            if self.body.len() > 1 && direction.is_opposite(self.heading) {
                return;
            }
            self.heading = direction;
        }
    }

    /// Candidate next head position along the current heading, without
    /// mutating any state; `None` when the move leaves the grid.
    #[must_use]
    pub fn candidate_head(&self, grid: GridSize) -> Option<CellCoord> {
        self.heading.step(self.head(), grid)
    }

    /// Commits a move: prepends the new head and, unless the snake grew,
    /// removes the tail segment. Returns the vacated tail cell, if any.
    pub(crate) fn advance(&mut self, next_head: CellCoord, grew: bool) -> Option<CellCoord> {
        self.body.push_front(next_head);
        if grew {
            None
        } else {
            self.body.pop_back()
        }
    }

    /// Marks the snake dead; the world releases its cells in the same tick.
    pub(crate) fn kill(&mut self) {
        self.alive = false;
    }
}
