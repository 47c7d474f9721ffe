//! Bluetooth printing over OBEX
//!
//! The image is pushed with the `obexftp` command-line tool. The child runs
//! detached from the control loop; a reaper thread waits on it and logs how
//! it ended.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;

use rp_game::{DeviceResult, PrintService};

/// Default OBEX object-push channel on the installation's printer
pub const DEFAULT_OBEX_CHANNEL: u8 = 4;

/// Prints by spawning `obexftp` for every job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObexPrinter {
    program: OsString,
    channel: u8,
}

impl ObexPrinter {
    pub fn new(channel: u8) -> Self {
        Self {
            program: "obexftp".into(),
            channel,
        }
    }

    /// Use a different executable (an absolute path, or a wrapper script)
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Arguments for pushing `image` to the printer at `address`
    pub fn command_args(&self, image: &Path, address: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["--nopath", "--noconn", "--uuid", "none", "--bluetooth"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(address.into());
        args.push("--channel".into());
        args.push(self.channel.to_string().into());
        args.push("-p".into());
        args.push(image.as_os_str().to_os_string());
        args
    }

    fn spawn(&self, image: &Path, address: &str) -> std::io::Result<Child> {
        Command::new(&self.program)
            .args(self.command_args(image, address))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
    }
}

impl Default for ObexPrinter {
    fn default() -> Self {
        Self::new(DEFAULT_OBEX_CHANNEL)
    }
}

impl PrintService for ObexPrinter {
    fn print_image(&mut self, path: &Path, destination: &str) -> DeviceResult<()> {
        if destination.trim().is_empty() {
            log::warn!("print skipped: no printer address");
            return Ok(());
        }

        let mut child = self.spawn(path, destination)?;
        let pid = child.id();
        log::info!("print job {} started: {} -> {}", pid, path.display(), destination);

        thread::Builder::new()
            .name(format!("print-{pid}"))
            .spawn(move || match child.wait() {
                Ok(status) if status.success() => log::info!("print job {} done", pid),
                Ok(status) => log::warn!("print job {} failed: {}", pid, status),
                Err(err) => log::warn!("print job {} lost: {}", pid, err),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_args() {
        let printer = ObexPrinter::default();
        let args = printer.command_args(Path::new("/srv/prize.jpg"), "C4:30:18:35:13:FA");
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec![
                "--nopath",
                "--noconn",
                "--uuid",
                "none",
                "--bluetooth",
                "C4:30:18:35:13:FA",
                "--channel",
                "4",
                "-p",
                "/srv/prize.jpg",
            ]
        );
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let mut printer = ObexPrinter::new(7).with_program("/nonexistent/obexftp-missing");
        assert!(printer.print_image(Path::new("prize.jpg"), "00:11:22:33:44:55").is_err());
    }

    #[test]
    fn test_empty_address_is_skipped() {
        let mut printer = ObexPrinter::default().with_program("/nonexistent/obexftp-missing");
        assert!(printer.print_image(Path::new("prize.jpg"), "  ").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_spawned_job_is_not_awaited() {
        use std::time::{Duration, Instant};

        // `true` ignores the obexftp arguments and exits successfully
        let mut printer = ObexPrinter::default().with_program("true");
        let start = Instant::now();
        printer.print_image(Path::new("prize.jpg"), "00:11:22:33:44:55").unwrap();
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
