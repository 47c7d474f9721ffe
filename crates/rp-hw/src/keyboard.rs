//! Stdin as a pushbutton

use std::io::{BufRead, BufReader};
use std::thread;

use crossbeam_channel::{Receiver, TryRecvError, unbounded};

use rp_game::InputSource;

/// Every line read counts as one press.
///
/// Lines are read on a background thread; polling never blocks.
pub struct KeyboardButton {
    presses: Receiver<()>,
    closed: bool,
}

impl KeyboardButton {
    /// Read presses from the process's stdin
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(std::io::stdin()))
    }

    /// Read presses from any line source
    pub fn from_reader<R: BufRead + Send + 'static>(reader: R) -> Self {
        let (tx, rx) = unbounded();
        let spawned = thread::Builder::new()
            .name("keyboard-button".into())
            .spawn(move || {
                for line in reader.lines() {
                    if line.is_err() || tx.send(()).is_err() {
                        break;
                    }
                }
                log::debug!("keyboard input closed");
            });
        if let Err(err) = spawned {
            log::warn!("keyboard reader not started: {}", err);
        }
        Self {
            presses: rx,
            closed: false,
        }
    }
}

impl InputSource for KeyboardButton {
    fn poll_button_pressed(&mut self) -> bool {
        match self.presses.try_recv() {
            Ok(()) => true,
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                if !self.closed {
                    log::info!("keyboard button: end of input");
                    self.closed = true;
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    fn count_presses(button: &mut KeyboardButton, wait: Duration) -> usize {
        let deadline = Instant::now() + wait;
        let mut presses = 0;
        while Instant::now() < deadline {
            if button.poll_button_pressed() {
                presses += 1;
            } else {
                thread::sleep(Duration::from_millis(1));
            }
        }
        presses
    }

    #[test]
    fn test_one_press_per_line() {
        let mut button = KeyboardButton::from_reader(Cursor::new("\n\nspin\n"));
        assert_eq!(count_presses(&mut button, Duration::from_millis(200)), 3);
        assert!(!button.poll_button_pressed());
    }

    #[test]
    fn test_empty_input_never_presses() {
        let mut button = KeyboardButton::from_reader(Cursor::new(""));
        assert_eq!(count_presses(&mut button, Duration::from_millis(50)), 0);
    }
}
