//! Installation configuration
//!
//! Loaded from YAML; every field falls back to the installation's standard
//! five-reel letter machine, so an empty file is a valid configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use rp_reel::{DEFAULT_BASE_SPEED, Denylist, LETTERS, MachineController, SpinScheduler, SymbolRing};

use crate::error::{ConfigError, ConfigResult};

/// Complete configuration of the installation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallationConfig {
    pub display: DisplayConfig,
    pub machine: MachineConfig,
    pub game: GameConfig,
    pub print: PrintConfig,
    pub audio: AudioConfig,
    pub hardware: HardwareConfig,
}

/// Window and frame settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub fullscreen: bool,
    /// Frame-rate overlay
    pub show_fps: bool,
    pub width: u32,
    pub height: u32,
    /// Glyph size in pixels; bounds how many rows fit in `height`
    pub symbol_size: u32,
    /// Target update rate (Hz)
    pub frame_rate: u32,
    /// Symbols drawn above and below the centre row, at most
    pub neighbors: usize,
}

impl DisplayConfig {
    /// Neighbour rows actually shown: `neighbors`, capped by how many
    /// `symbol_size` rows fit around the centre row
    pub fn visible_neighbors(&self) -> usize {
        let rows = (self.height / self.symbol_size.max(1)) as usize;
        self.neighbors.min(rows.saturating_sub(1) / 2)
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            fullscreen: false,
            show_fps: false,
            width: 1920,
            height: 1080,
            symbol_size: 220,
            frame_rate: 120,
            neighbors: 1,
        }
    }
}

/// Reel rings and motion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Ring positions per second
    pub base_speed: f64,
    /// Settle durations are divided by this
    pub speedup: f64,
    /// One ring per reel, as the symbols in order
    pub rings: Vec<String>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        let mut rings = vec![format!("{LETTERS}#")];
        rings.extend(std::iter::repeat_n(LETTERS.to_string(), 4));
        Self {
            base_speed: DEFAULT_BASE_SPEED,
            speedup: 1.0,
            rings,
        }
    }
}

impl MachineConfig {
    pub fn reel_count(&self) -> usize {
        self.rings.len()
    }

    /// Build one ring per reel; identical rings share one allocation
    pub fn build_rings(&self) -> ConfigResult<Vec<Arc<SymbolRing>>> {
        let mut built: Vec<Arc<SymbolRing>> = Vec::with_capacity(self.rings.len());
        for (reel, spec) in self.rings.iter().enumerate() {
            let ring = SymbolRing::new(spec.chars()).map_err(|source| ConfigError::Ring { reel, source })?;
            let shared = built
                .iter()
                .find(|existing| ***existing == ring)
                .cloned()
                .unwrap_or_else(|| Arc::new(ring));
            built.push(shared);
        }
        Ok(built)
    }

    pub fn build_scheduler(&self, denylist: Denylist) -> ConfigResult<SpinScheduler> {
        Ok(SpinScheduler::new(self.base_speed)?
            .with_speedup(self.speedup)?
            .with_denylist(denylist))
    }

    /// A machine with every reel added, resting on the first symbols
    pub fn build_machine(&self, denylist: Denylist) -> ConfigResult<MachineController> {
        let mut machine = MachineController::new(self.build_scheduler(denylist)?);
        for ring in self.build_rings()? {
            machine.add_reel(ring);
        }
        Ok(machine)
    }
}

/// Outcome policy and round pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Shown on start-up
    pub resting_word: String,
    /// Spin targets; the decisive reel's letter is replaced by the outcome
    pub target_word: String,
    /// Free-run seconds per reel before it settles
    pub settle_seconds: Vec<f64>,
    /// Reel whose target decides the round
    pub decisive_reel: usize,
    pub win_symbol: char,
    /// Win probability in `[0, 1]`
    pub win_threshold: f64,
    /// Extra settle time on the decisive reel when the round is a win
    pub suspense_seconds: f64,
    /// Symbols a random landing must avoid
    pub denylist: Denylist,
    pub prompt_delay_seconds: f64,
    pub prompt_duration_seconds: f64,
    /// Pause after the prompt before the next press is accepted
    pub cooldown_seconds: f64,
    pub prompt_text: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            resting_word: "#MAGA".into(),
            target_word: "#MAGA".into(),
            settle_seconds: vec![4.0, 5.5, 7.0, 10.0, 8.0],
            decisive_reel: 3,
            win_symbol: 'G',
            win_threshold: 0.15,
            suspense_seconds: 2.0,
            denylist: Denylist::new().with_rule('G', None),
            prompt_delay_seconds: 5.0,
            prompt_duration_seconds: 10.0,
            cooldown_seconds: 1.0,
            prompt_text: "You won! Take your print.".into(),
        }
    }
}

/// Prize printing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    pub image_path: PathBuf,
    /// Bluetooth address of the printer; printing is skipped without one
    pub printer_address: Option<String>,
    /// OBEX channel
    pub channel: u8,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            image_path: PathBuf::from("prize.jpg"),
            printer_address: None,
            channel: 4,
        }
    }
}

/// Sound clips (WAV)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub spin_clip: Option<PathBuf>,
    pub win_clip: Option<PathBuf>,
    pub fade_out_ms: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            spin_clip: None,
            win_clip: None,
            fade_out_ms: 500,
        }
    }
}

/// GPIO wiring (BCM numbering)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// Pushbutton to ground, internal pull-up
    pub button_pin: u8,
    pub led_pin: Option<u8>,
    /// Read presses from stdin instead of GPIO
    pub keyboard: bool,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            button_pin: 23,
            led_pin: None,
            keyboard: false,
        }
    }
}

impl InstallationConfig {
    /// Parse YAML text
    pub fn from_yaml_str(text: &str) -> ConfigResult<Self> {
        Ok(serde_yml::from_str(text)?)
    }

    /// Read and parse a YAML file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yml::to_string(self)?)
    }

    /// Check ranges and cross-references between sections
    pub fn validate(&self) -> ConfigResult<()> {
        let game = &self.game;
        let machine = &self.machine;

        check_range("game.win_threshold", game.win_threshold, 0.0, 1.0)?;
        check_positive("machine.base_speed", machine.base_speed)?;
        check_positive("machine.speedup", machine.speedup)?;
        check_range("game.suspense_seconds", game.suspense_seconds, 0.0, f64::MAX)?;
        check_range("game.prompt_delay_seconds", game.prompt_delay_seconds, 0.0, f64::MAX)?;
        check_range("game.prompt_duration_seconds", game.prompt_duration_seconds, 0.0, f64::MAX)?;
        check_range("game.cooldown_seconds", game.cooldown_seconds, 0.0, f64::MAX)?;
        if self.display.frame_rate == 0 {
            return Err(ConfigError::OutOfRange {
                field: "display.frame_rate",
                value: "0".into(),
            });
        }
        if self.display.symbol_size == 0 {
            return Err(ConfigError::OutOfRange {
                field: "display.symbol_size",
                value: "0".into(),
            });
        }

        let rings = machine.build_rings()?;
        let reels = rings.len();
        if reels == 0 {
            return Err(ConfigError::OutOfRange {
                field: "machine.rings",
                value: "[]".into(),
            });
        }

        check_len("game.settle_seconds", reels, game.settle_seconds.len())?;
        for &seconds in &game.settle_seconds {
            check_range("game.settle_seconds", seconds, 0.0, f64::MAX)?;
        }
        check_word("game.resting_word", &game.resting_word, &rings)?;
        check_word("game.target_word", &game.target_word, &rings)?;

        if game.decisive_reel >= reels {
            return Err(ConfigError::OutOfRange {
                field: "game.decisive_reel",
                value: game.decisive_reel.to_string(),
            });
        }
        let decisive = &rings[game.decisive_reel];
        let on_decisive = |field: &'static str, symbol: char| {
            if decisive.contains(symbol) {
                Ok(())
            } else {
                Err(ConfigError::UnknownSymbol {
                    field,
                    symbol,
                    reel: game.decisive_reel,
                })
            }
        };
        on_decisive("game.win_symbol", game.win_symbol)?;
        for rule in game.denylist.rules() {
            on_decisive("game.denylist", rule.symbol)?;
            if let Some(substitute) = rule.substitute {
                on_decisive("game.denylist", substitute)?;
            }
        }
        // No fractional slot may resolve onto the win symbol
        for index in 0..decisive.len() {
            let landed = game.denylist.apply(decisive, index)?;
            if decisive.symbol_at(landed as i64) == game.win_symbol {
                return Err(ConfigError::WinSymbolReachable {
                    symbol: game.win_symbol,
                    reel: game.decisive_reel,
                });
            }
        }
        Ok(())
    }

    /// Check that every referenced file exists; fatal at start-up
    pub fn validate_assets(&self) -> ConfigResult<()> {
        let clips = [&self.audio.spin_clip, &self.audio.win_clip];
        std::iter::once(&self.print.image_path)
            .chain(clips.into_iter().flatten())
            .try_for_each(|path| {
                if path.exists() {
                    Ok(())
                } else {
                    Err(ConfigError::MissingAsset(path.clone()))
                }
            })
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> ConfigResult<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: value.to_string(),
        })
    }
}

fn check_positive(field: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: value.to_string(),
        })
    }
}

fn check_len(field: &'static str, expected: usize, got: usize) -> ConfigResult<()> {
    if expected == got {
        Ok(())
    } else {
        Err(ConfigError::LengthMismatch { field, expected, got })
    }
}

fn check_word(field: &'static str, word: &str, rings: &[Arc<SymbolRing>]) -> ConfigResult<()> {
    check_len(field, rings.len(), word.chars().count())?;
    for (reel, (symbol, ring)) in word.chars().zip(rings).enumerate() {
        if !ring.contains(symbol) {
            return Err(ConfigError::UnknownSymbol { field, symbol, reel });
        }
    }
    Ok(())
}
