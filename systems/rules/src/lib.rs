#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rule engine deciding when the game is over.
//!
//! The default "death mode" rule observes [`Event::SnakeDied`] on the bus
//! and counts the players still in the game. Which population ends the game
//! is a constructor parameter, not a hardcoded policy: the classic variant
//! runs until nobody is left, the competitive variant stops as soon as a
//! single survivor remains and records the winner.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use tracing::info;

use snake_arena_core::{Event, EventBus, EventKind, HandlerId, PlayerId};

/// Population at which death mode declares the game over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Victory {
    /// The game ends when no players remain.
    AllDead,
    /// The game ends when a single player remains, who wins.
    LastSurvivor,
}

/// Current phase of the rule engine's state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// The simulation keeps ticking.
    Running,
    /// Terminal phase: ticks stop, the final frame keeps rendering.
    GameOver {
        /// Winning player under [`Victory::LastSurvivor`], if any.
        winner: Option<PlayerId>,
    },
}

/// Death-mode rule engine: every collision is lethal, the game ends when
/// the active population reaches the configured threshold.
#[derive(Clone, Debug)]
pub struct DeathMode {
    victory: Victory,
    live: BTreeSet<PlayerId>,
    phase: Phase,
}

impl DeathMode {
    /// Creates the rule engine over the players that joined the game.
    #[must_use]
    pub fn new(victory: Victory, players: impl IntoIterator<Item = PlayerId>) -> Self {
        Self {
            victory,
            live: players.into_iter().collect(),
            phase: Phase::Running,
        }
    }

    /// Current phase; `GameOver` is terminal.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the engine reached its terminal phase.
    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver { .. })
    }

    /// Number of players still in the game.
    #[must_use]
    pub fn live_players(&self) -> usize {
        self.live.len()
    }

    /// Subscribes the shared engine to [`Event::SnakeDied`] on the bus.
    ///
    /// The simulation is single-threaded by contract, so a shared
    /// `Rc<RefCell<_>>` handle is how the loop and the bus observe the same
    /// state machine.
    pub fn attach(bus: &mut EventBus, engine: Rc<RefCell<DeathMode>>) -> HandlerId {
        bus.bind(
            EventKind::SnakeDied,
            Box::new(move |event, _| {
                if let Event::SnakeDied { player, .. } = event {
                    engine.borrow_mut().on_player_eliminated(*player);
                }
                Ok(())
            }),
        )
    }

    fn on_player_eliminated(&mut self, player: PlayerId) {
        if self.is_game_over() {
            // Terminal: late deaths can no longer change the outcome.
            return;
        }
        let _ = self.live.remove(&player);
        let over = match self.victory {
            Victory::AllDead => self.live.is_empty(),
            Victory::LastSurvivor => self.live.len() <= 1,
        };
        if over {
            let winner = match self.victory {
                Victory::AllDead => None,
                Victory::LastSurvivor => self.live.iter().next().copied(),
            };
            self.phase = Phase::GameOver { winner };
            info!(?winner, "game over");
        }
    }
}
