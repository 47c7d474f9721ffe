//! # rp-game: Game layer for ReelPrint
//!
//! Everything around the reel engine that shapes a round of play:
//!
//! - **Outcome policy**: one random draw against a win threshold picks the
//!   decisive reel's target
//! - **Phases**: `Idle → Spinning → Resolving → Presenting → Idle`
//! - **Timers**: delayed actions polled once per tick
//! - **Stages**: serializable events describing what happened each tick
//! - **Collaborators**: button, indicator LED, audio, printer and renderer
//!   traits, each with an absent-hardware implementation
//! - **Configuration**: YAML-loadable installation settings
//!
//! ```text
//! InputSource ──▶ InstallationSession::tick(elapsed)
//!                     │
//!                     ├── GameOutcomeDecider → SpinRequest
//!                     ├── MachineController (rp-reel)
//!                     ├── TimerQueue<TimerAction>
//!                     └── Vec<StageEvent> ──▶ Indicator / AudioPlayer / PrintService
//! ```

pub mod config;
pub mod error;
pub mod io;
pub mod outcome;
pub mod phase;
pub mod session;
pub mod stage;
pub mod timer;

pub use config::*;
pub use error::*;
pub use io::*;
pub use outcome::*;
pub use phase::*;
pub use session::*;
pub use stage::*;
pub use timer::*;
