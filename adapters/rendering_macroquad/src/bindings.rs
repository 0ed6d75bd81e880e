//! Per-player key layouts, loadable from a small toml file.

use anyhow::{anyhow, Context, Result};
use macroquad::input::KeyCode;
use serde::Deserialize;

/// Key names steering one player, as they appear in the toml file.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct PlayerKeys {
    /// Key turning the snake upward.
    pub up: String,
    /// Key turning the snake downward.
    pub down: String,
    /// Key turning the snake left.
    pub left: String,
    /// Key turning the snake right.
    pub right: String,
}

/// Key layouts for every human seat, in seat order.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct KeyBindings {
    /// One layout per human player.
    pub players: Vec<PlayerKeys>,
}

impl Default for KeyBindings {
    /// Built-in layouts: arrows for the first seat, WASD for the second.
    fn default() -> Self {
        Self {
            players: vec![
                PlayerKeys {
                    up: "Up".to_owned(),
                    down: "Down".to_owned(),
                    left: "Left".to_owned(),
                    right: "Right".to_owned(),
                },
                PlayerKeys {
                    up: "W".to_owned(),
                    down: "S".to_owned(),
                    left: "A".to_owned(),
                    right: "D".to_owned(),
                },
            ],
        }
    }
}

impl KeyBindings {
    /// Parses key bindings from toml text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse key bindings")
    }

    /// Resolves every named key into a concrete layout, failing on the
    /// first unknown key name.
    pub fn layouts(&self) -> Result<Vec<KeyLayout>> {
        self.players
            .iter()
            .map(|keys| {
                Ok(KeyLayout {
                    up: parse_key(&keys.up)?,
                    down: parse_key(&keys.down)?,
                    left: parse_key(&keys.left)?,
                    right: parse_key(&keys.right)?,
                })
            })
            .collect()
    }
}

/// Resolved steering keys for one player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyLayout {
    /// Key turning the snake upward.
    pub up: KeyCode,
    /// Key turning the snake downward.
    pub down: KeyCode,
    /// Key turning the snake left.
    pub left: KeyCode,
    /// Key turning the snake right.
    pub right: KeyCode,
}

fn parse_key(name: &str) -> Result<KeyCode> {
    let key = match name.to_ascii_lowercase().as_str() {
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "a" => KeyCode::A,
        "b" => KeyCode::B,
        "c" => KeyCode::C,
        "d" => KeyCode::D,
        "e" => KeyCode::E,
        "f" => KeyCode::F,
        "g" => KeyCode::G,
        "h" => KeyCode::H,
        "i" => KeyCode::I,
        "j" => KeyCode::J,
        "k" => KeyCode::K,
        "l" => KeyCode::L,
        "m" => KeyCode::M,
        "n" => KeyCode::N,
        "o" => KeyCode::O,
        "r" => KeyCode::R,
        "s" => KeyCode::S,
        "t" => KeyCode::T,
        "u" => KeyCode::U,
        "v" => KeyCode::V,
        "w" => KeyCode::W,
        "x" => KeyCode::X,
        "y" => KeyCode::Y,
        "z" => KeyCode::Z,
        _ => return Err(anyhow!("unknown key name '{name}' in key bindings")),
    };
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_defaults_cover_two_seats() {
        let layouts = KeyBindings::default()
            .layouts()
            .expect("built-in names resolve");
        assert_eq!(layouts.len(), 2);
        assert_eq!(layouts[0].up, KeyCode::Up);
        assert_eq!(layouts[1].up, KeyCode::W);
    }

    #[test]
    fn a_toml_file_overrides_the_layouts() {
        let bindings = KeyBindings::from_toml(
            r#"
            [[players]]
            up = "I"
            down = "K"
            left = "J"
            right = "L"
            "#,
        )
        .expect("well-formed toml parses");
        let layouts = bindings.layouts().expect("names resolve");
        assert_eq!(layouts.len(), 1);
        assert_eq!(
            layouts[0],
            KeyLayout {
                up: KeyCode::I,
                down: KeyCode::K,
                left: KeyCode::J,
                right: KeyCode::L,
            }
        );
    }

    #[test]
    fn unknown_key_names_are_rejected() {
        let bindings = KeyBindings {
            players: vec![PlayerKeys {
                up: "VolumeUp".to_owned(),
                down: "Down".to_owned(),
                left: "Left".to_owned(),
                right: "Right".to_owned(),
            }],
        };
        let error = bindings.layouts().expect_err("unknown name fails");
        assert!(error.to_string().contains("VolumeUp"));
    }
}
