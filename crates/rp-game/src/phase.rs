//! Explicit game phase

use serde::{Deserialize, Serialize};

/// Where the installation is in a round of play.
///
/// Transitions are driven only by the session tick and the spin completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum GamePhase {
    /// Waiting for a button press
    #[default]
    Idle,
    /// Reels are moving; the outcome is already decided
    Spinning { won: bool },
    /// Reels stopped; waiting for the prize prompt (wins only)
    Resolving { won: bool },
    /// Prize prompt on screen, or cooling down after it
    Presenting { prompt_visible: bool },
}

impl GamePhase {
    /// Only an idle machine accepts a new spin
    pub fn accepts_spin(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_spinning(&self) -> bool {
        matches!(self, Self::Spinning { .. })
    }

    pub fn prompt_visible(&self) -> bool {
        matches!(self, Self::Presenting { prompt_visible: true })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Spinning { .. } => "spinning",
            Self::Resolving { .. } => "resolving",
            Self::Presenting { .. } => "presenting",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_idle_accepts_spin() {
        assert!(GamePhase::Idle.accepts_spin());
        assert!(!GamePhase::Spinning { won: false }.accepts_spin());
        assert!(!GamePhase::Resolving { won: true }.accepts_spin());
        assert!(!GamePhase::Presenting { prompt_visible: false }.accepts_spin());
    }

    #[test]
    fn test_phase_serializes_tagged() {
        let json = serde_json::to_string(&GamePhase::Resolving { won: true }).unwrap();
        assert_eq!(json, r#"{"phase":"resolving","won":true}"#);
    }
}
