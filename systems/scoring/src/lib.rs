#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Score tracking fed exclusively by the event stream.
//!
//! Scores are mutated only by the handler reacting to
//! [`Event::SnakeAte`]; no other code path touches the tallies. Renderers
//! read the board through the shared handle.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::debug;

use snake_arena_core::{Event, EventBus, EventKind, HandlerId, PlayerId};

/// Per-player score tallies, keyed and iterated in ascending player order.
#[derive(Clone, Debug, Default)]
pub struct Scoreboard {
    scores: BTreeMap<PlayerId, u32>,
}

impl Scoreboard {
    /// Creates a board with a zeroed tally per player.
    #[must_use]
    pub fn new(players: impl IntoIterator<Item = PlayerId>) -> Self {
        Self {
            scores: players.into_iter().map(|player| (player, 0)).collect(),
        }
    }

    /// Current score of the given player; zero for unknown players.
    #[must_use]
    pub fn score(&self, player: PlayerId) -> u32 {
        self.scores.get(&player).copied().unwrap_or(0)
    }

    /// All tallies in ascending player order.
    #[must_use]
    pub fn standings(&self) -> Vec<(PlayerId, u32)> {
        self.scores.iter().map(|(player, score)| (*player, *score)).collect()
    }

    /// Subscribes the shared board to [`Event::SnakeAte`] on the bus.
    pub fn attach(bus: &mut EventBus, board: Rc<RefCell<Scoreboard>>) -> HandlerId {
        bus.bind(
            EventKind::SnakeAte,
            Box::new(move |event, _| {
                if let Event::SnakeAte { player, score, .. } = event {
                    board.borrow_mut().credit(*player, *score);
                }
                Ok(())
            }),
        )
    }

    fn credit(&mut self, player: PlayerId, amount: u32) {
        let tally = self.scores.entry(player).or_insert(0);
        *tally = tally.saturating_add(amount);
        debug!(player = player.get(), score = *tally, "score updated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snake_arena_core::{CellCoord, FoodId, SnakeId};

    fn ate(player: PlayerId, score: u32) -> Event {
        Event::SnakeAte {
            snake: SnakeId::new(player.get()),
            player,
            food: FoodId::new(0),
            cell: CellCoord::new(0, 0),
            score,
        }
    }

    #[test]
    fn only_eat_events_move_the_tallies() {
        let mut bus = EventBus::new();
        let players = [PlayerId::new(0), PlayerId::new(1)];
        let board = Rc::new(RefCell::new(Scoreboard::new(players)));
        let _ = Scoreboard::attach(&mut bus, Rc::clone(&board));

        bus.emit(ate(players[0], 5)).expect("dispatch succeeds");
        bus.emit(ate(players[0], 3)).expect("dispatch succeeds");
        bus.emit(Event::SnakeBorn {
            snake: SnakeId::new(9),
            player: players[1],
        })
        .expect("dispatch succeeds");

        assert_eq!(board.borrow().score(players[0]), 8);
        assert_eq!(board.borrow().score(players[1]), 0);
        assert_eq!(
            board.borrow().standings(),
            vec![(players[0], 8), (players[1], 0)]
        );
    }
}
