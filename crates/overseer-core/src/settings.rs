//! Player display settings.

use serde::{Deserialize, Serialize};

use crate::error::Rejection;
use crate::state::PersistentState;

pub const DEFAULT_MAIN_COLOR: &str = "#33ff66";
pub const DEFAULT_ACCENT_COLOR: &str = "#1a1a1a";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    main_color: String,
    accent_color: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            main_color: DEFAULT_MAIN_COLOR.to_string(),
            accent_color: DEFAULT_ACCENT_COLOR.to_string(),
        }
    }
}

/// True for `#rrggbb`.
pub fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

impl Settings {
    pub fn main_color(&self) -> &str {
        &self.main_color
    }

    pub fn accent_color(&self) -> &str {
        &self.accent_color
    }

    pub fn set_main_color(&mut self, color: &str) -> Result<(), Rejection> {
        self.main_color = Self::validate(color)?;
        Ok(())
    }

    pub fn set_accent_color(&mut self, color: &str) -> Result<(), Rejection> {
        self.accent_color = Self::validate(color)?;
        Ok(())
    }

    fn validate(color: &str) -> Result<String, Rejection> {
        if is_hex_color(color) {
            Ok(color.to_ascii_lowercase())
        } else {
            Err(Rejection::InvalidColor(color.to_string()))
        }
    }

    /// Reads `settings.*`; invalid or missing colors keep their defaults.
    pub fn load(state: &PersistentState) -> Self {
        let mut settings = Self::default();
        if let Some(color) = state.get::<String>("settings.main-color") {
            let _ = settings.set_main_color(&color);
        }
        if let Some(color) = state.get::<String>("settings.accent-color") {
            let _ = settings.set_accent_color(&color);
        }
        settings
    }

    pub fn store(&self, state: &mut PersistentState) {
        state.set_value("settings.main-color", self.main_color.clone().into());
        state.set_value("settings.accent-color", self.accent_color.clone().into());
    }
}
