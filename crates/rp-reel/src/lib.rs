//! # rp-reel: Reel spin engine for ReelPrint
//!
//! The deterministic core of the installation: letter rings, reels that sit
//! at fractional positions on them, a scheduler that works out how far each
//! reel must travel to land exactly on its target, and a controller that
//! integrates reel motion frame by frame.
//!
//! ## Architecture
//!
//! ```text
//! SpinRequest (targets + settle durations)
//!     │
//!     v
//! SpinScheduler ── base speed, speedup
//!     │  total distance per reel
//!     v
//! MachineController
//!     ├── Reel ── Arc<SymbolRing>
//!     ├── Reel ── Arc<SymbolRing>
//!     └── ...
//!           │ tick(elapsed)
//!           v
//!     TickReport → completion handler (once per spin)
//! ```

pub mod error;
pub mod machine;
pub mod reel;
pub mod ring;
pub mod scheduler;

pub use error::*;
pub use machine::*;
pub use reel::*;
pub use ring::*;
pub use scheduler::*;

/// Tolerance used when comparing reel positions and remaining distances.
pub const POSITION_EPSILON: f64 = 1e-9;
