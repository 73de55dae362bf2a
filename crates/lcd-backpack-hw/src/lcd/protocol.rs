//! HD44780 instruction set and bus-word encoding.
//!
//! Instruction bytes are the standard HD44780 layout: the highest set bit
//! selects the instruction, the bits below it are its flags. The display is
//! write-only in this wiring, so the cached register bytes below are the
//! only record of what the controller was told.

use crate::pins::{LCD_E, LCD_RS};

/// Clear entire display and reset the DDRAM address.
pub const CLEAR_DISPLAY: u8 = 0x01;
/// Reset the DDRAM address and undo any display shift.
pub const RETURN_HOME: u8 = 0x02;

/// Entry mode set opcode and flags.
pub const ENTRY_MODE: u8 = 0x04;
pub const INCREMENT_ADDR: u8 = 0x02;
pub const SHIFT_DISPLAY: u8 = 0x01;

/// Display control opcode and flags.
pub const DISPLAY_CONTROL: u8 = 0x08;
pub const DISPLAY_ON: u8 = 0x04;
pub const CURSOR_ON: u8 = 0x02;
pub const BLINK_ON: u8 = 0x01;

/// Cursor/display shift opcode and flags.
pub const SHIFT: u8 = 0x10;
pub const CURSOR_SHIFT: u8 = 0x08;
pub const DISPLAY_SHIFT: u8 = 0x04;

/// Function set opcode and flags.
pub const FUNCTION_SET: u8 = 0x20;
pub const BUS_8_BIT: u8 = 0x10;
pub const TWO_LINES: u8 = 0x08;
pub const FONT_5X10: u8 = 0x04;

/// Address-set opcodes. DDRAM line 2 starts at 0x40.
pub const SET_CGRAM_ADDR: u8 = 0x40;
pub const SET_DDRAM_ADDR: u8 = 0x80;
pub const LINE2_OFFSET: u8 = 0x40;

/// Which LCD register a transfer targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterSelect {
    /// Command register (RS low).
    Instruction,
    /// Character data register (RS high).
    Data,
}

/// The four cached command bytes of the controller.
///
/// Each starts out as its bare opcode (function set additionally carries
/// the 8-bit-bus flag, the only mode this wiring supports). Operations
/// flip single flag bits and rewrite the whole byte; nothing is ever read
/// back from the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LcdRegisters {
    pub entry_mode: u8,
    pub display_control: u8,
    pub shift: u8,
    pub function: u8,
}

impl Default for LcdRegisters {
    fn default() -> Self {
        Self {
            entry_mode: ENTRY_MODE,
            display_control: DISPLAY_CONTROL,
            shift: SHIFT,
            function: FUNCTION_SET | BUS_8_BIT,
        }
    }
}

/// Sets or clears one flag in a cached register byte.
pub(crate) fn apply_flag(register: &mut u8, mask: u8, on: bool) {
    if on {
        *register |= mask;
    } else {
        *register &= !mask;
    }
}

/// Builds the 16-bit shift word for one LCD transfer, enable low.
///
/// The wiring between shift-register outputs and LCD pins fixes the
/// layout: RS sits at bit 8, data bits 0-4 land on word bits 11-15 and
/// data bits 5-7 on word bits 0-2. This permutation is a property of the
/// board, not of the protocol.
pub fn bus_word(rs: RegisterSelect, value: u8) -> u16 {
    let mut word = 0u16;
    if rs == RegisterSelect::Data {
        word |= LCD_RS;
    }
    word |= (u16::from(value & 0x1F)) << 11;
    word |= u16::from(value & 0xE0) >> 5;
    word
}

/// The three shift words of one complete bus write.
///
/// The controller latches on the enable falling edge, so data and RS must
/// be stable before enable rises and held until it falls: same word three
/// times, with only the enable bit raised in the middle.
pub fn write_words(rs: RegisterSelect, value: u8) -> [u16; 3] {
    let word = bus_word(rs, value);
    [word, word | LCD_E, word]
}

/// Inverse of the board's data-line permutation, for test assertions.
#[cfg(test)]
pub(crate) fn data_byte(word: u16) -> u8 {
    (((word >> 11) & 0x1F) as u8) | (((word & 0x07) as u8) << 5)
}
