//! Collaborator contracts: input, indicator, audio, printing, rendering
//!
//! The session only ever talks to hardware through these traits. Every trait
//! has a `Null*` implementation so the game runs with the hardware layer
//! entirely absent.

use std::path::Path;

use serde::{Deserialize, Serialize};

use rp_reel::{ReelRect, WindowCell};

use crate::error::DeviceResult;
use crate::phase::GamePhase;

/// Sound clips the game triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clip {
    /// Loops while the reels turn
    Spin,
    /// Played when a winning spin comes to rest
    Win,
}

/// Pushbutton (or anything else that can start a spin)
pub trait InputSource {
    /// True once per physical press
    fn poll_button_pressed(&mut self) -> bool;
}

/// Status light
pub trait Indicator {
    fn set_indicator(&mut self, on: bool) -> DeviceResult<()>;
}

pub trait AudioPlayer {
    fn play(&mut self, clip: Clip) -> DeviceResult<()>;

    fn fade_out(&mut self, clip: Clip, duration_ms: u32) -> DeviceResult<()>;
}

/// Prize printer. Must return without waiting for the job to finish.
pub trait PrintService {
    fn print_image(&mut self, path: &Path, destination: &str) -> DeviceResult<()>;
}

/// Draws one frame; pulls state, pushes nothing back
pub trait Renderer {
    fn render(&mut self, frame: &Frame<'_>) -> DeviceResult<()>;
}

/// What a renderer needs to draw one reel
#[derive(Debug, Clone, PartialEq)]
pub struct ReelView {
    pub column: usize,
    pub rect: ReelRect,
    pub window: Vec<WindowCell>,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<'a> {
    pub reels: Vec<ReelView>,
    pub phase: GamePhase,
    /// Prize prompt text while it is visible
    pub prompt: Option<&'a str>,
    /// Frame-rate overlay value, when enabled
    pub fps: Option<f64>,
}

// ═══════════════════════════════════════════════════════════════════════════
// ABSENT HARDWARE
// ═══════════════════════════════════════════════════════════════════════════

/// Never pressed
#[derive(Debug, Clone, Copy, Default)]
pub struct NullInput;

impl InputSource for NullInput {
    fn poll_button_pressed(&mut self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullIndicator;

impl Indicator for NullIndicator {
    fn set_indicator(&mut self, on: bool) -> DeviceResult<()> {
        log::trace!("indicator (absent) -> {}", on);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioPlayer for NullAudio {
    fn play(&mut self, clip: Clip) -> DeviceResult<()> {
        log::trace!("audio (absent): play {:?}", clip);
        Ok(())
    }

    fn fade_out(&mut self, clip: Clip, duration_ms: u32) -> DeviceResult<()> {
        log::trace!("audio (absent): fade {:?} over {}ms", clip, duration_ms);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullPrinter;

impl PrintService for NullPrinter {
    fn print_image(&mut self, path: &Path, destination: &str) -> DeviceResult<()> {
        log::info!("printer (absent): would send {} to {}", path.display(), destination);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _frame: &Frame<'_>) -> DeviceResult<()> {
        Ok(())
    }
}

/// The set of collaborators a session drives
pub struct Collaborators {
    pub input: Box<dyn InputSource>,
    pub indicator: Box<dyn Indicator>,
    pub audio: Box<dyn AudioPlayer>,
    pub printer: Box<dyn PrintService>,
}

impl Collaborators {
    /// No hardware at all
    pub fn absent() -> Self {
        Self {
            input: Box::new(NullInput),
            indicator: Box::new(NullIndicator),
            audio: Box::new(NullAudio),
            printer: Box::new(NullPrinter),
        }
    }

    pub fn with_input(mut self, input: impl InputSource + 'static) -> Self {
        self.input = Box::new(input);
        self
    }

    pub fn with_indicator(mut self, indicator: impl Indicator + 'static) -> Self {
        self.indicator = Box::new(indicator);
        self
    }

    pub fn with_audio(mut self, audio: impl AudioPlayer + 'static) -> Self {
        self.audio = Box::new(audio);
        self
    }

    pub fn with_printer(mut self, printer: impl PrintService + 'static) -> Self {
        self.printer = Box::new(printer);
        self
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::absent()
    }
}
