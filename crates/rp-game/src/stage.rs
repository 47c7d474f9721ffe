//! Stage events: what happened during a tick
//!
//! The session reports every externally visible step of a round as a
//! `StageEvent`. They drive logging and make the flow testable without
//! hardware.

use serde::{Deserialize, Serialize};

/// A step of a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stage {
    /// A spin was accepted
    SpinStart { won: bool },
    /// A button press arrived while the machine was busy
    SpinRejected,
    /// One reel came to rest
    ReelStop { reel_index: usize, symbol: char },
    /// All reels came to rest
    SpinEnd { won: bool, symbols: String },
    /// Print job handed to the print service
    PrintQueued { destination: String },
    PromptShow,
    PromptHide,
    /// Ready for the next press
    Idle,
}

impl Stage {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SpinStart { .. } => "spin_start",
            Self::SpinRejected => "spin_rejected",
            Self::ReelStop { .. } => "reel_stop",
            Self::SpinEnd { .. } => "spin_end",
            Self::PrintQueued { .. } => "print_queued",
            Self::PromptShow => "prompt_show",
            Self::PromptHide => "prompt_hide",
            Self::Idle => "idle",
        }
    }
}

/// A stage with the session time it happened at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEvent {
    pub stage: Stage,
    /// Seconds since the session started
    pub timestamp_s: f64,
}

impl StageEvent {
    pub fn new(stage: Stage, timestamp_s: f64) -> Self {
        Self { stage, timestamp_s }
    }

    pub fn type_name(&self) -> &'static str {
        self.stage.type_name()
    }

    /// Single-line JSON for logs
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.type_name().to_string())
    }
}
