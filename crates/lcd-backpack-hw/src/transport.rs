//! Adapter transport.
//!
//! The backpack is an FT232R driven in asynchronous bitbang mode: every
//! byte written becomes the state of the eight output pins. A frame must go
//! out as a single bulk write so the pin sequence is never interleaved with
//! anything else.

use std::io::Write;

use tracing::{debug, info};

use crate::{Error, Result, USB_PID, USB_VID};

/// Something that can push an ordered byte sequence at the adapter.
///
/// One call per frame; the implementation must transmit the bytes in order
/// and must not split them across transfers. There is no retry: a failed
/// transmission leaves the LCD bus in an unknown state and the session
/// should be reinitialized.
pub trait Transport {
    fn send(&mut self, frame: &[u8]) -> Result<()>;
}

/// The real FTDI adapter.
pub struct FtdiTransport {
    device: ftdi::Device,
}

impl FtdiTransport {
    /// Opens the backpack by VID:PID and leaves it ready for bitbang writes.
    pub fn open() -> Result<Self> {
        let device = ftdi::find_by_vid_pid(USB_VID, USB_PID)
            .interface(ftdi::Interface::A)
            .open()
            .map_err(|e| {
                debug!("Failed to open FTDI device: {}", e);
                Error::DeviceNotFound
            })?;

        info!("LCD backpack opened (VID:{:04X} PID:{:04X})", USB_VID, USB_PID);

        Ok(Self { device })
    }
}

impl Transport for FtdiTransport {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        // Re-enter bitbang output mode before every transmission, the way
        // the reference firmware driver does; the mode sticks but re-arming
        // it is harmless and recovers from anything else touching the chip.
        self.device.set_bitmode(0xFF, ftdi::BitMode::Bitbang)?;
        self.device.write_all(frame)?;
        debug!("Transmitted {} pin bytes", frame.len());
        Ok(())
    }
}

// Bitbang mode is deliberately left enabled on drop so the last pin state
// (in particular a lit backlight) persists after the process exits.
