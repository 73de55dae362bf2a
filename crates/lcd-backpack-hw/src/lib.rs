//! LCD Backpack Hardware Library
//!
//! Drives an HD44780-class character LCD through an FTDI USB adapter in
//! bitbang mode. The adapter's eight output pins feed two daisy-chained
//! serial-in/parallel-out shift registers, which expand them into the
//! eleven signals the LCD bus needs (eight data lines plus register-select,
//! read/write, and enable).

pub mod error;
pub mod lcd;
pub mod pins;
pub mod shift;
pub mod transport;

pub use error::{Error, Result};
pub use lcd::{Backpack, FunctionSet, LcdRegisters, Line, RegisterSelect};
pub use shift::{BusWidth, Frame};
pub use transport::{FtdiTransport, Transport};

/// USB VID:PID of the FTDI chip on the backpack (FT232R with default IDs).
pub const USB_VID: u16 = 0x0403;
pub const USB_PID: u16 = 0x6001;
