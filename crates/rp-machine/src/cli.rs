//! Command line

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use rp_game::InstallationConfig;

#[derive(Parser, Debug, Default)]
#[command(
    name = "reelprint",
    version,
    about = "Letter slot machine that prints a prize on a win"
)]
pub struct Cli {
    /// Take over the whole terminal
    #[arg(long)]
    pub fullscreen: bool,

    /// Show the frame-rate overlay
    #[arg(long)]
    pub fps: bool,

    /// Glyph size in pixels; larger glyphs leave fewer neighbour rows
    #[arg(long, value_name = "PX")]
    pub size: Option<u32>,

    /// Win probability in [0, 1]
    #[arg(long, value_name = "P")]
    pub threshold: Option<f64>,

    /// Image sent to the printer on a win
    #[arg(long, value_name = "PATH")]
    pub picfile: Option<PathBuf>,

    /// Bluetooth address of the printer
    #[arg(long, value_name = "ADDR")]
    pub printer_mac: Option<String>,

    /// Divide every settle duration by this
    #[arg(long, value_name = "X")]
    pub speedup: Option<f64>,

    /// Reel speed in ring positions per second
    #[arg(long, value_name = "UNITS")]
    pub speed: Option<f64>,

    /// YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Seed the outcome generator for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Read button presses from stdin (one per line)
    #[arg(long)]
    pub keyboard: bool,

    /// WAV looped while the reels turn
    #[arg(long, value_name = "WAV")]
    pub spin_clip: Option<PathBuf>,

    /// WAV played on a win
    #[arg(long, value_name = "WAV")]
    pub win_clip: Option<PathBuf>,
}

impl Cli {
    /// Defaults, then the config file, then flags
    pub fn load_config(&self) -> Result<InstallationConfig> {
        let config = match &self.config {
            Some(path) => InstallationConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => InstallationConfig::default(),
        };
        Ok(self.apply(config))
    }

    /// Overlay the flags that were given onto `config`
    pub fn apply(&self, mut config: InstallationConfig) -> InstallationConfig {
        if self.fullscreen {
            config.display.fullscreen = true;
        }
        if self.fps {
            config.display.show_fps = true;
        }
        if let Some(size) = self.size {
            config.display.symbol_size = size;
        }
        if let Some(threshold) = self.threshold {
            config.game.win_threshold = threshold;
        }
        if let Some(path) = &self.picfile {
            config.print.image_path = path.clone();
        }
        if let Some(address) = &self.printer_mac {
            config.print.printer_address = Some(address.clone());
        }
        if let Some(speedup) = self.speedup {
            config.machine.speedup = speedup;
        }
        if let Some(speed) = self.speed {
            config.machine.base_speed = speed;
        }
        if self.keyboard {
            config.hardware.keyboard = true;
        }
        if let Some(path) = &self.spin_clip {
            config.audio.spin_clip = Some(path.clone());
        }
        if let Some(path) = &self.win_clip {
            config.audio.win_clip = Some(path.clone());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_keeps_defaults() {
        let cli = Cli::parse_from(["reelprint"]);
        assert_eq!(cli.load_config().unwrap(), InstallationConfig::default());
    }

    #[test]
    fn test_flags_override() {
        let cli = Cli::parse_from([
            "reelprint",
            "--fullscreen",
            "--fps",
            "--size",
            "180",
            "--threshold",
            "0.5",
            "--printer-mac",
            "C4:30:18:35:13:FA",
            "--speedup",
            "2",
            "--speed",
            "12.5",
            "--keyboard",
            "--win-clip",
            "win.wav",
        ]);
        let config = cli.apply(InstallationConfig::default());

        assert!(config.display.fullscreen);
        assert!(config.display.show_fps);
        assert_eq!(config.display.symbol_size, 180);
        assert_eq!(config.game.win_threshold, 0.5);
        assert_eq!(config.print.printer_address.as_deref(), Some("C4:30:18:35:13:FA"));
        assert_eq!(config.machine.speedup, 2.0);
        assert_eq!(config.machine.base_speed, 12.5);
        assert!(config.hardware.keyboard);
        assert_eq!(config.audio.win_clip, Some(PathBuf::from("win.wav")));
        assert_eq!(config.audio.spin_clip, None);
    }

    #[test]
    fn test_flags_beat_config_file() {
        let path = std::env::temp_dir().join("reelprint-cli-test.yaml");
        std::fs::write(&path, "game:\n  win_threshold: 0.9\nmachine:\n  speedup: 3.0\n").unwrap();

        let cli = Cli::parse_from([
            "reelprint",
            "--config",
            path.to_str().unwrap(),
            "--threshold",
            "0.2",
        ]);
        let config = cli.load_config().unwrap();
        assert_eq!(config.game.win_threshold, 0.2);
        assert_eq!(config.machine.speedup, 3.0);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = Cli::parse_from(["reelprint", "--config", "/no/such/reelprint.yaml"]);
        let err = cli.load_config().unwrap_err();
        assert!(format!("{:#}", err).contains("/no/such/reelprint.yaml"));
    }
}
