//! ReelPrint - letter slot machine installation
//!
//! Press the button, five letter reels spin, and a win sends a prize image
//! to a Bluetooth printer.
//!
//! Usage:
//!   reelprint --keyboard --threshold 0.3 --printer-mac C4:30:18:35:13:FA
//!   RUST_LOG=debug reelprint --config installation.yaml

mod cli;
mod devices;
mod frame_clock;
mod render;

use std::io;

use anyhow::{Context, Result};
use clap::Parser;

use rp_game::{InstallationConfig, InstallationSession, Renderer};

use crate::cli::Cli;
use crate::frame_clock::FrameClock;
use crate::render::{SymbolAtlas, TerminalRenderer};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let (config, session) = start(&cli).inspect_err(|err| log::error!("startup failed: {:#}", err))?;
    log::info!(
        "reelprint running at {} Hz (threshold {}, printer {})",
        config.display.frame_rate,
        config.game.win_threshold,
        config.print.printer_address.as_deref().unwrap_or("none")
    );
    run(session, &config)
}

/// Everything that can fail happens here, before the loop starts
fn start(cli: &Cli) -> Result<(InstallationConfig, InstallationSession)> {
    let config = cli.load_config()?;
    config.validate().context("invalid configuration")?;
    config.validate_assets().context("missing asset")?;

    let devices = devices::build(&config)?;
    let mut session = InstallationSession::new(&config, devices).context("failed to start session")?;
    if let Some(seed) = cli.seed {
        session = session.with_seed(seed);
    }
    Ok((config, session))
}

fn run(mut session: InstallationSession, config: &InstallationConfig) -> Result<()> {
    let rings = config.machine.build_rings()?;
    let atlas = SymbolAtlas::for_rings(&rings);
    log::debug!("symbol atlas: {} glyphs", atlas.len());
    let mut renderer = TerminalRenderer::new(io::stdout(), atlas);
    if config.display.fullscreen {
        renderer.take_over_screen().context("failed to clear the terminal")?;
    }

    let mut clock = FrameClock::new(config.display.frame_rate);
    log::debug!("frame period {:?}", clock.period());
    loop {
        let elapsed = clock.begin_frame();
        session.tick(elapsed);

        let fps = config.display.show_fps.then(|| clock.fps());
        if let Err(err) = renderer.render(&session.frame(fps)) {
            log::warn!("render failed: {}", err);
        }
        clock.wait_for_next_frame();
    }
}
