#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for the snake arena adapters.
//!
//! A [`Scene`] is rebuilt from scratch every frame by the pure [`compose`]
//! function and handed to whichever [`RenderingBackend`] is in use. The
//! scene is an ordered list of typed draw batches rather than an open layer
//! stack, so backends match on a closed enum instead of downcasting.

mod ticker;

pub use ticker::EventTicker;

use anyhow::Result as AnyResult;
use glam::Vec2;

use snake_arena_core::CellCoord;
use snake_arena_system_rules::Phase;
use snake_arena_system_scoring::Scoreboard;
use snake_arena_world::{query, MoveIntents, World};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Fixed snake palette cycled by seat order.
pub const SNAKE_PALETTE: [Color; 6] = [
    Color::from_rgb_u8(66, 135, 245),
    Color::from_rgb_u8(235, 94, 52),
    Color::from_rgb_u8(52, 199, 89),
    Color::from_rgb_u8(255, 204, 0),
    Color::from_rgb_u8(175, 82, 222),
    Color::from_rgb_u8(90, 200, 250),
];

/// Visual constants shared by every composed frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    /// Side length of a single grid cell in pixels.
    pub cell_length: f32,
    /// Solid color used to clear each frame.
    pub background: Color,
    /// Color used when drawing grid lines.
    pub grid_line: Color,
    /// Fill color of food items.
    pub food: Color,
    /// Color of overlay text.
    pub text: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            cell_length: 24.0,
            background: Color::from_rgb_u8(24, 24, 28),
            grid_line: Color::from_rgb_u8(52, 52, 60),
            food: Color::from_rgb_u8(230, 57, 70),
            text: Color::from_rgb_u8(235, 235, 235),
        }
    }
}

/// Playfield geometry drawn beneath everything else.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldBatch {
    /// Number of columns in the grid.
    pub columns: u32,
    /// Number of rows in the grid.
    pub rows: u32,
    /// Side length of a single cell in pixels.
    pub cell_length: f32,
    /// Solid color used to clear the frame.
    pub background: Color,
    /// Color used when drawing grid lines.
    pub line_color: Color,
}

impl FieldBatch {
    /// Total width of the playfield in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_length
    }

    /// Total height of the playfield in pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_length
    }

    /// Top-left pixel corner of a cell.
    #[must_use]
    pub fn cell_origin(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(
            cell.column() as f32 * self.cell_length,
            cell.row() as f32 * self.cell_length,
        )
    }
}

/// One food item rendered as a filled circle inside its cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoodGlyph {
    /// Top-left pixel corner of the occupied cell.
    pub origin: Vec2,
    /// Fill color.
    pub color: Color,
}

/// All food visible this frame.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FoodBatch {
    /// Food glyphs in ascending food id order.
    pub glyphs: Vec<FoodGlyph>,
}

/// One snake rendered as filled squares, head first.
#[derive(Clone, Debug, PartialEq)]
pub struct SnakeGlyph {
    /// Display name shown next to the head.
    pub name: String,
    /// Top-left pixel corners of the body cells, head first.
    pub segments: Vec<Vec2>,
    /// Body fill color; the head is drawn lightened.
    pub color: Color,
}

/// All live snakes this frame.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct SnakeBatch {
    /// Snake glyphs in ascending snake id order.
    pub glyphs: Vec<SnakeGlyph>,
}

/// Text drawn above the playfield: scores, recent events and banners.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayBatch {
    /// One `name: score` line per player, in ascending player order.
    pub score_lines: Vec<String>,
    /// Recent event lines, oldest first.
    pub ticker_lines: Vec<String>,
    /// Full-screen banner shown while paused or after game over.
    pub banner: Option<String>,
    /// Color of all overlay text.
    pub text_color: Color,
}

/// Closed set of drawable batches, listed in draw order.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawBatch {
    /// Background and grid lines.
    Field(FieldBatch),
    /// Food items.
    Food(FoodBatch),
    /// Snake bodies.
    Snakes(SnakeBatch),
    /// Scores, ticker and banners.
    Overlay(OverlayBatch),
}

/// Frame description consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Batches in the order they must be drawn.
    pub batches: Vec<DrawBatch>,
}

impl Scene {
    /// Creates a scene from pre-ordered batches.
    #[must_use]
    pub fn new(batches: Vec<DrawBatch>) -> Self {
        Self { batches }
    }

    /// The field batch, when the scene contains one.
    #[must_use]
    pub fn field(&self) -> Option<&FieldBatch> {
        self.batches.iter().find_map(|batch| match batch {
            DrawBatch::Field(field) => Some(field),
            _ => None,
        })
    }
}

/// Builds the frame for the current world state.
///
/// Pure function of the read-only queries: batches always appear in the
/// fixed order field, food, snakes, overlay.
#[must_use]
pub fn compose(
    world: &World,
    phase: Phase,
    scores: &Scoreboard,
    ticker: &EventTicker,
    theme: &Theme,
) -> Scene {
    let grid = query::grid(world);
    let field = FieldBatch {
        columns: grid.columns(),
        rows: grid.rows(),
        cell_length: theme.cell_length,
        background: theme.background,
        line_color: theme.grid_line,
    };

    let food = FoodBatch {
        glyphs: query::food_view(world)
            .iter()
            .map(|item| FoodGlyph {
                origin: field.cell_origin(item.cell),
                color: theme.food,
            })
            .collect(),
    };

    let players = query::players(world);
    let snakes = SnakeBatch {
        glyphs: query::snake_view(world)
            .iter()
            .map(|snake| {
                let seat = players
                    .iter()
                    .position(|player| player.id == snake.player)
                    .unwrap_or(0);
                SnakeGlyph {
                    name: snake.name.clone(),
                    segments: snake
                        .segments
                        .iter()
                        .map(|cell| field.cell_origin(*cell))
                        .collect(),
                    color: SNAKE_PALETTE[seat % SNAKE_PALETTE.len()],
                }
            })
            .collect(),
    };

    let score_lines = scores
        .standings()
        .iter()
        .map(|(player, score)| {
            let name = players
                .iter()
                .find(|candidate| candidate.id == *player)
                .map_or("?", |candidate| candidate.name.as_str());
            format!("{name}: {score}")
        })
        .collect();
    let banner = match phase {
        Phase::GameOver { winner } => {
            let line = winner
                .and_then(|id| {
                    players
                        .iter()
                        .find(|candidate| candidate.id == id)
                        .map(|candidate| format!("Game over: {} wins", candidate.name))
                })
                .unwrap_or_else(|| "Game over".to_owned());
            Some(line)
        }
        Phase::Running if query::is_paused(world) => Some("Paused".to_owned()),
        Phase::Running => None,
    };
    let overlay = OverlayBatch {
        score_lines,
        ticker_lines: ticker.lines(),
        banner,
        text_color: theme.text,
    };

    Scene::new(vec![
        DrawBatch::Field(field),
        DrawBatch::Food(food),
        DrawBatch::Snakes(snakes),
        DrawBatch::Overlay(overlay),
    ])
}

/// Input snapshot gathered by a backend before advancing the session.
#[derive(Clone, Debug, Default)]
pub struct FrameInput {
    /// Heading intents of the human players for this frame.
    pub intents: MoveIntents,
    /// Whether the pause key was pressed this frame (edge triggered).
    pub toggle_pause: bool,
    /// Whether a quit key was pressed this frame.
    pub quit: bool,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene shown on the very first frame.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting snake arena scenes.
pub trait RenderingBackend {
    /// Runs the backend until a quit key is pressed or the closure stops.
    ///
    /// The `update_scene` closure receives the input gathered for the frame
    /// and answers with the scene to draw, `Ok(None)` to close the window,
    /// or an error which aborts the loop and propagates out of `run`.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(FrameInput) -> AnyResult<Option<Scene>> + 'static;
}
