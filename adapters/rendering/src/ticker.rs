//! Bounded feed of human-readable event lines for the overlay.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use snake_arena_core::{DeathCause, Event, EventBus, EventKind, HandlerId, PlayerId};

/// Rolling window of the most recent simulation events, formatted for
/// display. Subscribes to every event kind on the bus; old lines fall off
/// the front once the window is full.
#[derive(Clone, Debug)]
pub struct EventTicker {
    capacity: usize,
    names: HashMap<PlayerId, String>,
    lines: VecDeque<String>,
}

impl EventTicker {
    /// Creates a ticker keeping at most `capacity` lines, resolving player
    /// ids to the given display names.
    #[must_use]
    pub fn new(capacity: usize, names: impl IntoIterator<Item = (PlayerId, String)>) -> Self {
        Self {
            capacity: capacity.max(1),
            names: names.into_iter().collect(),
            lines: VecDeque::new(),
        }
    }

    /// Current lines, oldest first.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }

    /// Subscribes the shared ticker to every event kind on the bus.
    pub fn attach(bus: &mut EventBus, ticker: Rc<RefCell<EventTicker>>) -> Vec<HandlerId> {
        EventKind::ALL
            .iter()
            .map(|kind| {
                let ticker = Rc::clone(&ticker);
                bus.bind(
                    *kind,
                    Box::new(move |event, _| {
                        ticker.borrow_mut().record(event);
                        Ok(())
                    }),
                )
            })
            .collect()
    }

    fn record(&mut self, event: &Event) {
        let line = self.format(event);
        if self.lines.len() == self.capacity {
            let _ = self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    fn name(&self, player: PlayerId) -> &str {
        self.names
            .get(&player)
            .map_or("unknown", |name| name.as_str())
    }

    fn format(&self, event: &Event) -> String {
        match event {
            Event::SnakeBorn { player, .. } => {
                format!("{} joined the game", self.name(*player))
            }
            Event::SnakeDied { player, cause, .. } => {
                let reason = match cause {
                    DeathCause::Wall => "hit the wall".to_owned(),
                    DeathCause::SelfCollision => "ran into itself".to_owned(),
                    DeathCause::SnakeCollision { .. } => "ran into another snake".to_owned(),
                    DeathCause::HeadOnCollision { .. } => "collided head on".to_owned(),
                };
                format!("{} {reason}", self.name(*player))
            }
            Event::SnakeAte { player, score, .. } => {
                format!("{} ate food (+{score})", self.name(*player))
            }
            Event::FoodSpawned { cell, .. } => {
                format!("food appeared at ({}, {})", cell.column(), cell.row())
            }
            Event::FoodRemoved { cell, .. } => {
                format!("food at ({}, {}) was eaten", cell.column(), cell.row())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snake_arena_core::{CellCoord, FoodId, SnakeId};

    #[test]
    fn the_window_drops_the_oldest_line_first() {
        let mut bus = EventBus::new();
        let player = PlayerId::new(0);
        let ticker = Rc::new(RefCell::new(EventTicker::new(
            2,
            [(player, "alice".to_owned())],
        )));
        let _ = EventTicker::attach(&mut bus, Rc::clone(&ticker));

        for score in 1..=3 {
            bus.emit(Event::SnakeAte {
                snake: SnakeId::new(0),
                player,
                food: FoodId::new(score),
                cell: CellCoord::new(1, 1),
                score,
            })
            .expect("dispatch succeeds");
        }

        let lines = ticker.borrow().lines();
        assert_eq!(lines, vec!["alice ate food (+2)", "alice ate food (+3)"]);
    }

    #[test]
    fn deaths_are_described_by_cause() {
        let ticker = EventTicker::new(4, [(PlayerId::new(1), "bob".to_owned())]);
        let line = ticker.format(&Event::SnakeDied {
            snake: SnakeId::new(1),
            player: PlayerId::new(1),
            cause: DeathCause::Wall,
        });
        assert_eq!(line, "bob hit the wall");
    }
}
