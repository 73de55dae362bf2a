//! Pin assignments and the cached output state.
//!
//! The FTDI chip exposes eight bitbang outputs. Seven drive the shift
//! registers and the backlight switch directly; the remaining LCD control
//! lines (register-select, read/write, enable) come out of the upper
//! daisy-chained shift register and exist only as bits of the 16-bit word
//! shifted into it, never as adapter pins.

/// Shift register serial data in (adapter pin 0).
pub const SR_SER: u8 = 1 << 0;
/// Shift register storage clock, latches the parallel outputs (adapter pin 2).
pub const SR_RCLK: u8 = 1 << 2;
/// Shift register serial clock (adapter pin 3).
pub const SR_SCLK: u8 = 1 << 3;
/// Shift register async clear, active low (adapter pin 4).
pub const SR_NSCLR: u8 = 1 << 4;
/// Shift register output enable, active low (adapter pin 5).
pub const SR_NOE: u8 = 1 << 5;
/// Backlight enable, active low (adapter pin 6).
pub const BL_NEN: u8 = 1 << 6;
/// Backlight open-collector drive, active low (adapter pin 7).
pub const BL_NOC: u8 = 1 << 7;

/// LCD register select, instruction/data (shift word bit 8).
pub const LCD_RS: u16 = 1 << 8;
/// LCD read/write. The wiring cannot support reads, so this stays low.
pub const LCD_RNW: u16 = 1 << 9;
/// LCD enable; the controller latches the bus on its falling edge.
pub const LCD_E: u16 = 1 << 10;

/// Last adapter output byte actually transmitted.
///
/// The adapter offers no pin read-back in bitbang output mode, so every
/// operation must read-modify-write this cached value; writing a byte
/// computed from anything else would clobber pins owned by other features
/// (backlight, output-enable, clear).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinState(pub u8);

impl PinState {
    /// All outputs low, the state the adapter is assumed to be in when a
    /// session opens.
    pub const fn new() -> Self {
        PinState(0)
    }

    /// Returns a copy with the masked pins driven high.
    #[must_use]
    pub const fn with_high(self, mask: u8) -> Self {
        PinState(self.0 | mask)
    }

    /// Returns a copy with the masked pins driven low.
    #[must_use]
    pub const fn with_low(self, mask: u8) -> Self {
        PinState(self.0 & !mask)
    }

    /// Whether every pin in `mask` is currently high.
    pub const fn is_high(self, mask: u8) -> bool {
        self.0 & mask == mask
    }
}
