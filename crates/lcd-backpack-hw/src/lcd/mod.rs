//! HD44780 LCD module.
//!
//! `protocol` holds the instruction set and the bus-word encoding;
//! `session` owns a transport and drives the display through it.

mod protocol;
mod session;

pub use protocol::{bus_word, write_words, LcdRegisters, RegisterSelect};
pub use session::{Backpack, FunctionSet, Line, LINE_WIDTH};
