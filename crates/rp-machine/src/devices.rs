//! Picks a collaborator for every device the configuration asks for

use anyhow::{Context, Result};

use rp_game::{Collaborators, InstallationConfig};
use rp_hw::{ClipBank, ClipPlayer, KeyboardButton, ObexPrinter};

/// Devices that are configured but cannot be opened fall back to their
/// absent implementations with a warning. Only unreadable clip files abort.
pub fn build(config: &InstallationConfig) -> Result<Collaborators> {
    let mut devices = Collaborators::absent().with_printer(ObexPrinter::new(config.print.channel));

    devices = with_gpio(devices, config);

    let audio = &config.audio;
    if audio.spin_clip.is_some() || audio.win_clip.is_some() {
        let bank = ClipBank::load(audio.spin_clip.as_deref(), audio.win_clip.as_deref())
            .context("failed to load sound clips")?;
        match ClipPlayer::start(bank) {
            Ok(player) => devices = devices.with_audio(player),
            Err(err) => log::warn!("sound disabled: {}", err),
        }
    }

    Ok(devices)
}

#[cfg(feature = "gpio")]
fn with_gpio(devices: Collaborators, config: &InstallationConfig) -> Collaborators {
    use rp_hw::{GpioButton, GpioLed, open_gpio};

    let hardware = &config.hardware;
    if hardware.keyboard {
        return devices.with_input(KeyboardButton::stdin());
    }

    let gpio = match open_gpio() {
        Ok(gpio) => gpio,
        Err(err) => {
            log::warn!("GPIO unavailable ({}), reading presses from stdin", err);
            return devices.with_input(KeyboardButton::stdin());
        }
    };

    let mut devices = match GpioButton::new(&gpio, hardware.button_pin) {
        Ok(button) => devices.with_input(button),
        Err(err) => {
            log::warn!("button unavailable ({}), reading presses from stdin", err);
            devices.with_input(KeyboardButton::stdin())
        }
    };
    if let Some(pin) = hardware.led_pin {
        match GpioLed::new(&gpio, pin) {
            Ok(led) => devices = devices.with_indicator(led),
            Err(err) => log::warn!("indicator LED unavailable: {}", err),
        }
    }
    devices
}

#[cfg(not(feature = "gpio"))]
fn with_gpio(devices: Collaborators, config: &InstallationConfig) -> Collaborators {
    if !config.hardware.keyboard {
        log::info!("built without GPIO support, reading presses from stdin");
    }
    devices.with_input(KeyboardButton::stdin())
}
