//! Error types for the LCD backpack hardware library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when interacting with the hardware.
#[derive(Error, Debug)]
pub enum Error {
    /// Backpack not found or could not be opened.
    #[error("LCD backpack not found (VID:PID 0403:6001)")]
    DeviceNotFound,

    /// FTDI adapter error (mode switch or bulk write).
    #[error("FTDI error: {0}")]
    Ftdi(#[from] ftdi::Error),

    /// I/O error on the bulk write path.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Only lines 1 and 2 exist on the supported displays.
    #[error("Unsupported display line: {0} (only 1 or 2)")]
    UnsupportedLine(u8),

    /// Message does not fit on a 16-character line.
    #[error("Message too long: {len} bytes (maximum {max})")]
    MessageTooLong { len: usize, max: usize },
}
