//! Raspberry Pi GPIO: pushbutton and status LED (BCM numbering)

use rppal::gpio::{Gpio, InputPin, OutputPin};

use rp_game::{DeviceError, DeviceResult, Indicator, InputSource};

use crate::button::EdgeDetector;

fn gpio_error(err: rppal::gpio::Error) -> DeviceError {
    DeviceError::Gpio(err.to_string())
}

/// Pushbutton wired to ground with the internal pull-up enabled
pub struct GpioButton {
    pin: InputPin,
    edge: EdgeDetector,
}

impl GpioButton {
    pub fn new(gpio: &Gpio, bcm_pin: u8) -> DeviceResult<Self> {
        let pin = gpio.get(bcm_pin).map_err(gpio_error)?.into_input_pullup();
        log::info!("button on BCM {}", bcm_pin);
        Ok(Self {
            pin,
            edge: EdgeDetector::new(),
        })
    }
}

impl InputSource for GpioButton {
    fn poll_button_pressed(&mut self) -> bool {
        // Pulled up, so pressed reads low
        self.edge.update(self.pin.is_low())
    }
}

pub struct GpioLed {
    pin: OutputPin,
}

impl GpioLed {
    pub fn new(gpio: &Gpio, bcm_pin: u8) -> DeviceResult<Self> {
        let mut pin = gpio.get(bcm_pin).map_err(gpio_error)?.into_output();
        pin.set_low();
        log::info!("indicator LED on BCM {}", bcm_pin);
        Ok(Self { pin })
    }
}

impl Indicator for GpioLed {
    fn set_indicator(&mut self, on: bool) -> DeviceResult<()> {
        if on {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
        Ok(())
    }
}

/// Open the GPIO peripheral
pub fn open_gpio() -> DeviceResult<Gpio> {
    Gpio::new().map_err(gpio_error)
}
