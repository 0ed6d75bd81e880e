#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed presenter for the snake arena.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without
//! its default `audio` feature.
//!
//! The backend owns the window loop: every frame it polls the configured
//! key layouts into a [`FrameInput`], hands it to the session closure and
//! draws whatever [`Scene`] comes back.

mod bindings;

pub use bindings::{KeyBindings, KeyLayout, PlayerKeys};

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use macroquad::input::{is_key_down, is_key_pressed, KeyCode};

use snake_arena_core::{Direction, PlayerId};
use snake_arena_rendering::{
    Color, DrawBatch, FieldBatch, FoodBatch, FrameInput, OverlayBatch, Presentation,
    RenderingBackend, Scene, SnakeBatch,
};

const FALLBACK_WINDOW_SIDE: i32 = 960;
const TEXT_SIZE: f32 = 18.0;
const BANNER_TEXT_SIZE: f32 = 40.0;

/// Duration of one frame at the given rate.
#[must_use]
pub fn frame_budget(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(fps.max(1)))
}

/// Sleeps away the remainder of each frame to hold a fixed frame rate.
#[derive(Debug)]
struct FramePacer {
    frame_budget: Duration,
    frame_start: Instant,
}

impl FramePacer {
    fn new(fps: u32) -> Self {
        Self {
            frame_budget: frame_budget(fps),
            frame_start: Instant::now(),
        }
    }

    fn wait(&mut self) {
        let elapsed = self.frame_start.elapsed();
        if let Some(remaining) = self.frame_budget.checked_sub(elapsed) {
            thread::sleep(remaining);
        }
        self.frame_start = Instant::now();
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    target_fps: Option<u32>,
    seats: Vec<(PlayerId, KeyLayout)>,
}

impl MacroquadBackend {
    /// Returns a backend with no human seats and uncapped frame rate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the frame rate the pacer holds.
    #[must_use]
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = Some(fps);
        self
    }

    /// Assigns one key layout per human player, in seat order.
    #[must_use]
    pub fn with_seats(mut self, seats: Vec<(PlayerId, KeyLayout)>) -> Self {
        self.seats = seats;
        self
    }
}

fn poll_input(seats: &[(PlayerId, KeyLayout)]) -> FrameInput {
    let mut input = FrameInput::default();
    for (player, layout) in seats {
        let direction = if is_key_down(layout.up) {
            Some(Direction::Up)
        } else if is_key_down(layout.down) {
            Some(Direction::Down)
        } else if is_key_down(layout.left) {
            Some(Direction::Left)
        } else if is_key_down(layout.right) {
            Some(Direction::Right)
        } else {
            None
        };
        if let Some(direction) = direction {
            input.intents.set(*player, direction);
        }
    }
    input.toggle_pause = is_key_pressed(KeyCode::P);
    input.quit = is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q);
    input
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(FrameInput) -> Result<Option<Scene>> + 'static,
    {
        let Self { target_fps, seats } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let (window_width, window_height) = scene.field().map_or(
            (FALLBACK_WINDOW_SIDE, FALLBACK_WINDOW_SIDE),
            |field| (field.width().ceil() as i32, field.height().ceil() as i32),
        );
        let config = macroquad::window::Conf {
            window_title,
            window_width,
            window_height,
            ..macroquad::window::Conf::default()
        };

        let (error_sender, error_receiver) = mpsc::channel::<anyhow::Error>();

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let mut pacer = target_fps.map(FramePacer::new);
            let background = to_macroquad_color(clear_color);

            loop {
                let input = poll_input(&seats);
                if input.quit {
                    break;
                }

                match update_scene(input) {
                    Ok(Some(next)) => scene = next,
                    Ok(None) => break,
                    Err(error) => {
                        let _ = error_sender.send(error);
                        break;
                    }
                }

                macroquad::window::clear_background(background);
                draw_scene(&scene);

                if let Some(pacer) = pacer.as_mut() {
                    pacer.wait();
                }
                macroquad::window::next_frame().await;
            }
        });

        if let Ok(error) = error_receiver.try_recv() {
            return Err(error);
        }
        Ok(())
    }
}

fn draw_scene(scene: &Scene) {
    let cell_length = scene
        .field()
        .map_or(24.0, |field| field.cell_length);
    for batch in &scene.batches {
        match batch {
            DrawBatch::Field(field) => draw_field(field),
            DrawBatch::Food(food) => draw_food(food, cell_length),
            DrawBatch::Snakes(snakes) => draw_snakes(snakes, cell_length),
            DrawBatch::Overlay(overlay) => draw_overlay(overlay),
        }
    }
}

fn draw_field(field: &FieldBatch) {
    let width = field.width();
    let height = field.height();
    macroquad::shapes::draw_rectangle(0.0, 0.0, width, height, to_macroquad_color(field.background));

    let line_color = to_macroquad_color(field.line_color);
    for column in 0..=field.columns {
        let x = column as f32 * field.cell_length;
        macroquad::shapes::draw_line(x, 0.0, x, height, 1.0, line_color);
    }
    for row in 0..=field.rows {
        let y = row as f32 * field.cell_length;
        macroquad::shapes::draw_line(0.0, y, width, y, 1.0, line_color);
    }
}

fn draw_food(food: &FoodBatch, cell_length: f32) {
    let radius = cell_length * 0.35;
    let half = cell_length * 0.5;
    for glyph in &food.glyphs {
        macroquad::shapes::draw_circle(
            glyph.origin.x + half,
            glyph.origin.y + half,
            radius,
            to_macroquad_color(glyph.color),
        );
    }
}

fn draw_snakes(snakes: &SnakeBatch, cell_length: f32) {
    let inset = 1.0;
    let side = (cell_length - 2.0 * inset).max(1.0);
    for glyph in &snakes.glyphs {
        for (index, segment) in glyph.segments.iter().enumerate() {
            let color = if index == 0 {
                glyph.color.lighten(0.35)
            } else {
                glyph.color
            };
            macroquad::shapes::draw_rectangle(
                segment.x + inset,
                segment.y + inset,
                side,
                side,
                to_macroquad_color(color),
            );
        }
        if let Some(head) = glyph.segments.first() {
            macroquad::text::draw_text(
                &glyph.name,
                head.x,
                head.y - 4.0,
                TEXT_SIZE * 0.8,
                to_macroquad_color(glyph.color.lighten(0.6)),
            );
        }
    }
}

fn draw_overlay(overlay: &OverlayBatch) {
    let text_color = to_macroquad_color(overlay.text_color);
    let mut y = TEXT_SIZE;
    for line in &overlay.score_lines {
        macroquad::text::draw_text(line, 8.0, y, TEXT_SIZE, text_color);
        y += TEXT_SIZE;
    }

    let screen_height = macroquad::window::screen_height();
    let mut ticker_y = screen_height - 8.0;
    for line in overlay.ticker_lines.iter().rev() {
        macroquad::text::draw_text(line, 8.0, ticker_y, TEXT_SIZE * 0.8, text_color);
        ticker_y -= TEXT_SIZE * 0.9;
    }

    if let Some(banner) = &overlay.banner {
        let screen_width = macroquad::window::screen_width();
        let metrics = macroquad::text::measure_text(banner, None, BANNER_TEXT_SIZE as u16, 1.0);
        let x = (screen_width - metrics.width) * 0.5;
        let y = screen_height * 0.5;
        macroquad::text::draw_text(banner, x, y, BANNER_TEXT_SIZE, text_color);
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_frame_budget_matches_the_rate() {
        assert_eq!(frame_budget(60), Duration::from_secs_f64(1.0 / 60.0));
        assert_eq!(frame_budget(1), Duration::from_secs(1));
        // A zero rate is clamped instead of dividing by zero.
        assert_eq!(frame_budget(0), Duration::from_secs(1));
    }

    #[test]
    fn the_pacer_does_not_sleep_when_the_budget_is_spent() {
        let mut pacer = FramePacer::new(1_000_000);
        let start = Instant::now();
        pacer.wait();
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
