//! Shift-register frame encoding.
//!
//! The shift registers are loaded serially: for every bit of the word,
//! MSB first, the serial clock is dropped, the data pin is set, and the
//! clock is raised again. Each of those pin states is one byte the adapter
//! will replay in order. A final storage-clock pulse latches the shifted
//! word onto the parallel outputs.

use crate::pins::{PinState, SR_RCLK, SR_SCLK, SR_SER};

/// Number of bits clocked into the chain per frame.
///
/// One register holds eight bits; the LCD needs eleven signals, so two
/// registers are daisy-chained and LCD traffic always shifts sixteen.
/// Eight-bit frames reach only the lower register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusWidth {
    Eight,
    Sixteen,
}

impl BusWidth {
    pub const fn bits(self) -> u32 {
        match self {
            BusWidth::Eight => 8,
            BusWidth::Sixteen => 16,
        }
    }
}

/// One complete adapter transmission: an ordered run of pin-state bytes.
///
/// Frames are ephemeral; they are built, sent atomically, and dropped. The
/// last byte of a frame is the pin state the adapter is left in, which the
/// caller must carry into the next frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8>,
}

impl Frame {
    /// Encodes the serial load of `word` starting from `pins`.
    ///
    /// Layout: one latch-low byte, then four bytes per shifted bit
    /// (clock low, data, clock high, and a repeat of the clock-high byte
    /// to even out the clock dwell), then one latch-high byte. Total
    /// length is `4 * width + 2`.
    pub fn encode(pins: PinState, word: u16, width: BusWidth) -> Frame {
        let bits = width.bits();
        let mut bytes = Vec::with_capacity(4 * bits as usize + 2);

        let mut cur = pins.with_low(SR_RCLK);
        bytes.push(cur.0);

        for i in (0..bits).rev() {
            cur = cur.with_low(SR_SCLK);
            bytes.push(cur.0);
            cur = if word & (1 << i) != 0 {
                cur.with_high(SR_SER)
            } else {
                cur.with_low(SR_SER)
            };
            bytes.push(cur.0);
            cur = cur.with_high(SR_SCLK);
            bytes.push(cur.0);
            // duplicate to give the clock equal high and low dwell
            bytes.push(cur.0);
        }

        cur = cur.with_high(SR_RCLK);
        bytes.push(cur.0);

        Frame { bytes }
    }

    /// A one-byte frame that drives the adapter pins without shifting
    /// anything. Used for the backlight and the boot-time shift-register
    /// control lines, which are adapter pins rather than register outputs.
    pub fn pin_write(pins: PinState) -> Frame {
        Frame {
            bytes: vec![pins.0],
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The pin state the adapter holds after this frame is transmitted.
    pub fn final_pins(&self) -> PinState {
        // frames are never empty by construction
        PinState(*self.bytes.last().unwrap())
    }
}

/// Replays a frame against a software model of the daisy-chained registers:
/// data is sampled on the serial-clock rising edge, and the shifted word
/// appears on the outputs on the storage-clock rising edge.
#[cfg(test)]
pub(crate) fn replay(bytes: &[u8]) -> u16 {
    let mut shifted: u16 = 0;
    let mut latched: u16 = 0;
    let mut prev = bytes[0];
    for &byte in &bytes[1..] {
        let rising = byte & !prev;
        if rising & SR_SCLK != 0 {
            shifted = (shifted << 1) | u16::from(byte & SR_SER != 0);
        }
        if rising & SR_RCLK != 0 {
            latched = shifted;
        }
        prev = byte;
    }
    latched
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eight_bit_round_trip_all_values() {
        for v in 0..=255u16 {
            let frame = Frame::encode(PinState::new(), v, BusWidth::Eight);
            assert_eq!(replay(frame.bytes()), v, "value {v:#04x}");
        }
    }

    #[test]
    fn sixteen_bit_round_trip() {
        for v in [0x0000, 0xFFFF, 0x8001, 0xA5A5, 0x0400, 0xF81F] {
            let frame = Frame::encode(PinState::new(), v, BusWidth::Sixteen);
            assert_eq!(replay(frame.bytes()), v, "value {v:#06x}");
        }
    }

    #[test]
    fn frame_length_is_deterministic() {
        for width in [BusWidth::Eight, BusWidth::Sixteen] {
            let frame = Frame::encode(PinState::new(), 0x5A5A, width);
            assert_eq!(frame.len(), 4 * width.bits() as usize + 2);
        }
    }

    #[test]
    fn frame_preserves_unrelated_pins() {
        use crate::pins::{BL_NEN, BL_NOC, SR_NOE, SR_NSCLR};

        let pins = PinState::new().with_high(SR_NSCLR | BL_NEN | BL_NOC);
        let frame = Frame::encode(pins, 0x1234, BusWidth::Sixteen);
        for &byte in frame.bytes() {
            assert_eq!(byte & (SR_NSCLR | BL_NEN | BL_NOC), SR_NSCLR | BL_NEN | BL_NOC);
            assert_eq!(byte & SR_NOE, 0);
        }
    }

    #[test]
    fn frame_ends_with_latch_high() {
        let frame = Frame::encode(PinState::new(), 0xBEEF, BusWidth::Sixteen);
        assert_eq!(frame.bytes()[0] & SR_RCLK, 0);
        assert!(frame.final_pins().is_high(SR_RCLK));
    }

    #[test]
    fn clock_high_bytes_are_duplicated() {
        let frame = Frame::encode(PinState::new(), 0xFF, BusWidth::Eight);
        // per bit: [clk low, data, clk high, clk high]
        for bit in 0..8 {
            let base = 1 + bit * 4;
            assert_eq!(frame.bytes()[base] & SR_SCLK, 0);
            assert_eq!(frame.bytes()[base + 2], frame.bytes()[base + 3]);
            assert!(frame.bytes()[base + 2] & SR_SCLK != 0);
        }
    }

    #[test]
    fn pin_write_is_single_byte() {
        let pins = PinState(0x42);
        let frame = Frame::pin_write(pins);
        assert_eq!(frame.bytes(), &[0x42]);
        assert_eq!(frame.final_pins(), pins);
    }
}
