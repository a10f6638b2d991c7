//! Game configuration
//!
//! `Options` is fixed when a game is created; the only runtime-togglable
//! flag is move validation, which lives on `GameState` directly so the
//! frozen record stays frozen.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pre-game configuration, frozen once a `GameState` is constructed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Add the Lady Bug to each roster
    pub lady_bug: bool,
    /// Add the Mosquito to each roster
    pub mosquito: bool,
    /// Add the Pill Bug to each roster
    pub pill_bug: bool,
    /// Forbid placing the Queen as a player's first placement
    pub no_first_move_queen: bool,
    /// Allow placements adjacent to opposing pieces after the opening
    pub relaxed_placement: bool,
    /// Let a piece use the Pill Bug ability on the turn after it was moved
    /// or carried
    pub allow_special_ability_after_yoink: bool,
}

impl Options {
    /// Load options from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let options = serde_json::from_str(&content)?;
        Ok(options)
    }

    /// Save options to a JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_base_game() {
        let options = Options::default();
        assert!(!options.lady_bug);
        assert!(!options.mosquito);
        assert!(!options.pill_bug);
        assert!(!options.no_first_move_queen);
        assert!(!options.relaxed_placement);
        assert!(!options.allow_special_ability_after_yoink);
    }

    #[test]
    fn test_json_round_trip() {
        let options = Options {
            mosquito: true,
            pill_bug: true,
            ..Options::default()
        };
        let json = serde_json::to_string(&options).unwrap();
        let back: Options = serde_json::from_str(&json).unwrap();
        assert_eq!(options, back);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let options: Options = serde_json::from_str(r#"{"lady_bug": true}"#).unwrap();
        assert!(options.lady_bug);
        assert!(!options.pill_bug);
    }
}
