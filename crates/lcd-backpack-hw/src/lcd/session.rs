//! Backpack session: owns the adapter and the cached LCD state.

use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use super::protocol::{self, write_words, LcdRegisters, RegisterSelect};
use crate::pins::{PinState, BL_NEN, BL_NOC, SR_NOE, SR_NSCLR};
use crate::shift::{BusWidth, Frame};
use crate::transport::{FtdiTransport, Transport};
use crate::{Error, Result};

/// Characters per display line.
///
/// Longer messages are rejected up front; the controller would accept the
/// extra bytes but they land in off-screen DDRAM, which reads as silent
/// data loss to the user.
pub const LINE_WIDTH: usize = 16;

/// Display line selector. Only two-line modules are wired up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    One,
    Two,
}

impl Line {
    /// DDRAM address of the first cell of this line.
    pub const fn ddram_address(self) -> u8 {
        match self {
            Line::One => protocol::SET_DDRAM_ADDR,
            Line::Two => protocol::SET_DDRAM_ADDR | protocol::LINE2_OFFSET,
        }
    }
}

impl TryFrom<u8> for Line {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Line::One),
            2 => Ok(Line::Two),
            other => Err(Error::UnsupportedLine(other)),
        }
    }
}

/// Function-set flags written during init.
#[derive(Debug, Clone, Copy)]
pub struct FunctionSet {
    pub eight_bit_bus: bool,
    pub two_lines: bool,
    pub font_5x10: bool,
}

impl Default for FunctionSet {
    /// 8-bit bus, one line, 5x8 font.
    fn default() -> Self {
        Self {
            eight_bit_bus: true,
            two_lines: false,
            font_5x10: false,
        }
    }
}

/// An open session against one backpack.
///
/// Owns the transport, the cached adapter pin byte, and the four cached
/// LCD command registers. All operations are blocking and issue in strict
/// call order; the bus protocol is order-sensitive, so a session must not
/// be shared between threads without external serialization.
///
/// Construction runs the one-time arming sequence (async-clear pulse,
/// output enable); the LCD itself is untouched until [`Backpack::init`].
pub struct Backpack<T: Transport> {
    transport: T,
    pins: PinState,
    registers: LcdRegisters,
}

impl Backpack<FtdiTransport> {
    /// Opens the USB device and arms the shift registers.
    pub fn open() -> Result<Self> {
        Self::with_transport(FtdiTransport::open()?)
    }
}

impl<T: Transport> Backpack<T> {
    /// Arms the shift registers over an already-open transport.
    pub fn with_transport(transport: T) -> Result<Self> {
        let mut session = Self {
            transport,
            pins: PinState::new(),
            registers: LcdRegisters::default(),
        };
        session.arm()?;
        Ok(session)
    }

    /// Boot-time shift-register setup: hold async-clear low, drive
    /// output-enable low so the registers own the LCD bus, then release
    /// clear. Must happen before the first data shift.
    fn arm(&mut self) -> Result<()> {
        self.write_pins(self.pins.with_low(SR_NSCLR))?;
        self.write_pins(self.pins.with_low(SR_NOE))?;
        self.write_pins(self.pins.with_high(SR_NSCLR))?;
        debug!("Shift registers armed");
        Ok(())
    }

    /// Transmits a bare pin byte (no shifting) and caches it.
    fn write_pins(&mut self, pins: PinState) -> Result<()> {
        let frame = Frame::pin_write(pins);
        self.transport.send(frame.bytes())?;
        self.pins = pins;
        Ok(())
    }

    /// One complete LCD bus write: the same shift word transmitted with
    /// enable low, high, then low again. The controller latches on the
    /// falling edge, so the data lines stay stable across all three
    /// frames. No busy-flag poll follows; the wiring cannot read back,
    /// so callers must respect the controller's processing time.
    pub fn bus_write(&mut self, rs: RegisterSelect, value: u8) -> Result<()> {
        for word in write_words(rs, value) {
            let frame = Frame::encode(self.pins, word, BusWidth::Sixteen);
            self.transport.send(frame.bytes())?;
            self.pins = frame.final_pins();
        }
        debug!("Bus write {:?} {:#04x}", rs, value);
        Ok(())
    }

    fn instruction(&mut self, value: u8) -> Result<()> {
        self.bus_write(RegisterSelect::Instruction, value)
    }

    /// Initializes the controller: clear display, one combined
    /// function-set write, then display on. Exactly three bus writes.
    /// Callers wanting a particular entry mode issue [`set_entry_mode`]
    /// afterwards.
    ///
    /// [`set_entry_mode`]: Backpack::set_entry_mode
    pub fn init(&mut self, function: FunctionSet) -> Result<()> {
        self.clear_display()?;

        protocol::apply_flag(&mut self.registers.function, protocol::BUS_8_BIT, function.eight_bit_bus);
        protocol::apply_flag(&mut self.registers.function, protocol::TWO_LINES, function.two_lines);
        protocol::apply_flag(&mut self.registers.function, protocol::FONT_5X10, function.font_5x10);
        let byte = self.registers.function;
        self.instruction(byte)?;

        self.display_on(true)?;
        info!("LCD initialized ({:?})", function);
        Ok(())
    }

    /// Clears the display and resets the address counter.
    pub fn clear_display(&mut self) -> Result<()> {
        self.instruction(protocol::CLEAR_DISPLAY)
    }

    /// Returns the cursor home and undoes any display shift.
    pub fn return_home(&mut self) -> Result<()> {
        self.instruction(protocol::RETURN_HOME)
    }

    fn entry_mode_flag(&mut self, mask: u8, on: bool) -> Result<()> {
        protocol::apply_flag(&mut self.registers.entry_mode, mask, on);
        let byte = self.registers.entry_mode;
        self.instruction(byte)
    }

    fn display_control_flag(&mut self, mask: u8, on: bool) -> Result<()> {
        protocol::apply_flag(&mut self.registers.display_control, mask, on);
        let byte = self.registers.display_control;
        self.instruction(byte)
    }

    fn shift_flag(&mut self, mask: u8, on: bool) -> Result<()> {
        protocol::apply_flag(&mut self.registers.shift, mask, on);
        let byte = self.registers.shift;
        self.instruction(byte)
    }

    fn function_flag(&mut self, mask: u8, on: bool) -> Result<()> {
        protocol::apply_flag(&mut self.registers.function, mask, on);
        let byte = self.registers.function;
        self.instruction(byte)
    }

    /// Whether the address counter increments after each data transfer.
    pub fn increment_address(&mut self, on: bool) -> Result<()> {
        self.entry_mode_flag(protocol::INCREMENT_ADDR, on)
    }

    /// Whether the whole display shifts on each data transfer.
    pub fn entry_shift(&mut self, on: bool) -> Result<()> {
        self.entry_mode_flag(protocol::SHIFT_DISPLAY, on)
    }

    pub fn display_on(&mut self, on: bool) -> Result<()> {
        self.display_control_flag(protocol::DISPLAY_ON, on)
    }

    pub fn cursor_on(&mut self, on: bool) -> Result<()> {
        self.display_control_flag(protocol::CURSOR_ON, on)
    }

    pub fn blink_on(&mut self, on: bool) -> Result<()> {
        self.display_control_flag(protocol::BLINK_ON, on)
    }

    pub fn cursor_shift(&mut self, on: bool) -> Result<()> {
        self.shift_flag(protocol::CURSOR_SHIFT, on)
    }

    pub fn display_shift(&mut self, on: bool) -> Result<()> {
        self.shift_flag(protocol::DISPLAY_SHIFT, on)
    }

    pub fn eight_bit_bus(&mut self, on: bool) -> Result<()> {
        self.function_flag(protocol::BUS_8_BIT, on)
    }

    pub fn two_lines(&mut self, on: bool) -> Result<()> {
        self.function_flag(protocol::TWO_LINES, on)
    }

    pub fn font_5x10(&mut self, on: bool) -> Result<()> {
        self.function_flag(protocol::FONT_5X10, on)
    }

    /// Sets all three display-control flags in one instruction write.
    pub fn set_display_control(&mut self, display: bool, cursor: bool, blink: bool) -> Result<()> {
        protocol::apply_flag(&mut self.registers.display_control, protocol::DISPLAY_ON, display);
        protocol::apply_flag(&mut self.registers.display_control, protocol::CURSOR_ON, cursor);
        protocol::apply_flag(&mut self.registers.display_control, protocol::BLINK_ON, blink);
        let byte = self.registers.display_control;
        self.instruction(byte)
    }

    /// Sets both entry-mode flags in one instruction write.
    pub fn set_entry_mode(&mut self, increment: bool, shift: bool) -> Result<()> {
        protocol::apply_flag(&mut self.registers.entry_mode, protocol::INCREMENT_ADDR, increment);
        protocol::apply_flag(&mut self.registers.entry_mode, protocol::SHIFT_DISPLAY, shift);
        let byte = self.registers.entry_mode;
        self.instruction(byte)
    }

    /// Writes `text` starting at the first cell of `line`.
    ///
    /// Emits one DDRAM address instruction, one data write per byte, and a
    /// trailing display-on write. Rejects messages longer than
    /// [`LINE_WIDTH`] bytes before touching the bus.
    pub fn write_text(&mut self, line: Line, text: &str) -> Result<()> {
        let len = text.len();
        if len > LINE_WIDTH {
            return Err(Error::MessageTooLong {
                len,
                max: LINE_WIDTH,
            });
        }

        self.instruction(line.ddram_address())?;
        for &byte in text.as_bytes() {
            self.bus_write(RegisterSelect::Data, byte)?;
        }
        self.display_on(true)?;
        info!("Wrote {} characters to {:?}", len, line);
        Ok(())
    }

    /// Switches the backlight. Both backlight pins are active low and
    /// always move together.
    pub fn backlight(&mut self, on: bool) -> Result<()> {
        let pins = if on {
            self.pins.with_low(BL_NEN | BL_NOC)
        } else {
            self.pins.with_high(BL_NEN | BL_NOC)
        };
        self.write_pins(pins)?;
        debug!("Backlight {}", if on { "on" } else { "off" });
        Ok(())
    }

    /// Turns the backlight on for `duration`, then off. A zero duration
    /// means indefinitely: the backlight stays lit, surviving session end
    /// and process exit.
    pub fn backlight_on_for(&mut self, duration: Duration) -> Result<()> {
        self.backlight(true)?;
        if !duration.is_zero() {
            thread::sleep(duration);
            self.backlight(false)?;
        }
        Ok(())
    }

    /// The cached LCD command registers.
    pub fn registers(&self) -> &LcdRegisters {
        &self.registers
    }

    /// The last pin byte transmitted to the adapter.
    pub fn pins(&self) -> PinState {
        self.pins
    }
}

// No teardown on drop: the LCD keeps displaying and the backlight keeps
// its last state after the session ends.

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::lcd::protocol::data_byte;
    use crate::pins::{LCD_E, LCD_RS};
    use crate::shift::replay;

    type Log = Rc<RefCell<Vec<Vec<u8>>>>;

    struct MockTransport {
        log: Log,
    }

    impl Transport for MockTransport {
        fn send(&mut self, frame: &[u8]) -> Result<()> {
            self.log.borrow_mut().push(frame.to_vec());
            Ok(())
        }
    }

    fn session() -> (Backpack<MockTransport>, Log) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let transport = MockTransport { log: log.clone() };
        let backpack = Backpack::with_transport(transport).unwrap();
        log.borrow_mut().clear();
        (backpack, log)
    }

    /// Groups the logged 16-bit shift frames into bus-write cycles and
    /// recovers (data?, byte) from each by replaying the shift protocol.
    fn decode_cycles(log: &Log) -> Vec<(bool, u8)> {
        let log = log.borrow();
        assert_eq!(log.len() % 3, 0, "partial bus cycle logged");
        log.chunks(3)
            .map(|cycle| {
                let words: Vec<u16> = cycle.iter().map(|bytes| replay(bytes)).collect();
                assert_eq!(words[0], words[2]);
                assert_eq!(words[0] ^ words[1], LCD_E);
                (words[0] & LCD_RS != 0, data_byte(words[0]))
            })
            .collect()
    }

    #[test]
    fn arming_sequence_pulses_clear_and_enables_outputs() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let transport = MockTransport { log: log.clone() };
        let backpack = Backpack::with_transport(transport).unwrap();

        let frames = log.borrow();
        assert_eq!(frames.len(), 3);
        assert!(frames.iter().all(|f| f.len() == 1));
        assert_eq!(frames[0][0] & SR_NSCLR, 0);
        assert_eq!(frames[1][0] & SR_NOE, 0);
        assert_eq!(frames[2][0] & SR_NSCLR, SR_NSCLR);
        assert!(backpack.pins().is_high(SR_NSCLR));
        assert!(!backpack.pins().is_high(SR_NOE));
    }

    #[test]
    fn init_is_three_bus_cycles() {
        let (mut backpack, log) = session();
        backpack.init(FunctionSet::default()).unwrap();

        let cycles = decode_cycles(&log);
        assert_eq!(
            cycles,
            vec![(false, 0x01), (false, 0x30), (false, 0x0C)]
        );
    }

    #[test]
    fn init_with_two_lines_combines_function_flags() {
        let (mut backpack, log) = session();
        backpack
            .init(FunctionSet {
                eight_bit_bus: true,
                two_lines: true,
                font_5x10: false,
            })
            .unwrap();

        assert_eq!(backpack.registers().function, 0x38);
        assert_eq!(decode_cycles(&log)[1], (false, 0x38));
    }

    #[test]
    fn display_control_flags_accumulate() {
        let (mut backpack, log) = session();
        backpack.init(FunctionSet::default()).unwrap();
        backpack.set_display_control(true, true, true).unwrap();

        assert_eq!(backpack.registers().display_control, 0x0F);
        // 1 clear + function set + init display-control + explicit one
        assert_eq!(decode_cycles(&log).len(), 4);
    }

    #[test]
    fn flag_toggles_are_idempotent_and_surgical() {
        let (mut backpack, _log) = session();
        backpack.cursor_on(true).unwrap();
        let after_first = backpack.registers().display_control;
        backpack.cursor_on(true).unwrap();
        assert_eq!(backpack.registers().display_control, after_first);
        assert_eq!(after_first, 0x0A);

        backpack.blink_on(true).unwrap();
        backpack.cursor_on(false).unwrap();
        assert_eq!(backpack.registers().display_control, 0x09);
    }

    #[test]
    fn line_addresses() {
        let (mut backpack, log) = session();
        backpack.write_text(Line::One, "a").unwrap();
        assert_eq!(decode_cycles(&log)[0], (false, 0x80));

        log.borrow_mut().clear();
        backpack.write_text(Line::Two, "a").unwrap();
        assert_eq!(decode_cycles(&log)[0], (false, 0xC0));
    }

    #[test]
    fn unsupported_line_is_rejected_before_any_transmission() {
        let (_backpack, log) = session();
        for n in [0u8, 3, 200] {
            assert!(matches!(
                Line::try_from(n),
                Err(Error::UnsupportedLine(v)) if v == n
            ));
        }
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn fifteen_characters_take_seventeen_cycles() {
        let (mut backpack, log) = session();
        let text = "welcome aboard!";
        assert_eq!(text.len(), 15);
        backpack.write_text(Line::Two, text).unwrap();

        let cycles = decode_cycles(&log);
        assert_eq!(cycles.len(), 17);
        assert_eq!(cycles[0], (false, 0xC0));
        for (cycle, byte) in cycles[1..16].iter().zip(text.bytes()) {
            assert_eq!(*cycle, (true, byte));
        }
        assert_eq!(cycles[16], (false, backpack.registers().display_control));
    }

    #[test]
    fn oversized_message_is_rejected_without_bus_activity() {
        let (mut backpack, log) = session();
        let result = backpack.write_text(Line::One, "seventeen chars!!");
        assert!(matches!(
            result,
            Err(Error::MessageTooLong { len: 17, max: 16 })
        ));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn backlight_pins_move_in_lock_step() {
        let (mut backpack, log) = session();
        backpack.backlight(false).unwrap();
        let off = log.borrow().last().unwrap().clone();
        assert_eq!(off[0] & (BL_NEN | BL_NOC), BL_NEN | BL_NOC);

        backpack.backlight(true).unwrap();
        let on = log.borrow().last().unwrap().clone();
        assert_eq!(on[0] & (BL_NEN | BL_NOC), 0);
    }

    #[test]
    fn zero_duration_backlight_stays_on() {
        let (mut backpack, log) = session();
        backpack.backlight_on_for(Duration::ZERO).unwrap();
        assert_eq!(log.borrow().len(), 1);
        assert!(!backpack.pins().is_high(BL_NEN | BL_NOC));
    }

    #[test]
    fn timed_backlight_always_toggles_off() {
        let (mut backpack, log) = session();
        backpack
            .backlight_on_for(Duration::from_millis(1))
            .unwrap();
        assert_eq!(log.borrow().len(), 2);
        assert!(backpack.pins().is_high(BL_NEN | BL_NOC));
    }

    #[test]
    fn bus_writes_preserve_side_channel_pins() {
        let (mut backpack, log) = session();
        backpack.backlight(false).unwrap();
        log.borrow_mut().clear();

        backpack.display_on(true).unwrap();
        for frame in log.borrow().iter() {
            for &byte in frame {
                assert_eq!(byte & (BL_NEN | BL_NOC), BL_NEN | BL_NOC);
                assert_eq!(byte & SR_NSCLR, SR_NSCLR);
            }
        }
    }
}
