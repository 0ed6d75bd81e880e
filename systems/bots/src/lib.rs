#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic computer-controlled move source.
//!
//! The greedy bot fills the same "current intended move" slot a human
//! player does: once per tick it inspects a read-only world snapshot and
//! answers with a heading, or `None` to keep going straight. It chases the
//! nearest food while refusing any step that is immediately lethal. No RNG
//! is involved, so replays with bots stay reproducible.

use snake_arena_core::{CellCoord, Direction, GridSize, SnakeId};
use snake_arena_world::query::{FoodSnapshot, SnakeSnapshot};

/// Greedy food-chasing bot.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreedyBot;

impl GreedyBot {
    /// Picks the next heading for the identified snake.
    ///
    /// Among the non-reversing headings whose next cell is on the grid and
    /// not occupied by any snake, the bot takes the one that brings the head
    /// closest to the nearest food (ties broken in a fixed direction order).
    /// With no food in sight it settles for any safe heading, and with no
    /// safe heading it keeps its course and accepts the outcome.
    #[must_use]
    pub fn choose(
        &self,
        snake_id: SnakeId,
        snakes: &[SnakeSnapshot],
        foods: &[FoodSnapshot],
        grid: GridSize,
    ) -> Option<Direction> {
        let me = snakes.iter().find(|snapshot| snapshot.id == snake_id)?;
        let head = me.head();

        let mut best: Option<(Direction, u32)> = None;
        let mut fallback = None;
        for direction in Direction::ALL {
            if me.segments.len() > 1 && direction.is_opposite(me.heading) {
                continue;
            }
            let Some(next) = direction.step(head, grid) else {
                continue;
            };
            if occupied(next, snakes) {
                continue;
            }
            if fallback.is_none() {
                fallback = Some(direction);
            }
            let Some(distance) = nearest_food_distance(next, foods) else {
                continue;
            };
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((direction, distance));
            }
        }

        best.map(|(direction, _)| direction).or(fallback)
    }
}

fn occupied(cell: CellCoord, snakes: &[SnakeSnapshot]) -> bool {
    snakes
        .iter()
        .any(|snapshot| snapshot.segments.contains(&cell))
}

fn nearest_food_distance(cell: CellCoord, foods: &[FoodSnapshot]) -> Option<u32> {
    foods
        .iter()
        .map(|food| cell.manhattan_distance(food.cell))
        .min()
}
