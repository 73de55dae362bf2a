//! Fixed-script demo: brings the display up, writes two lines, and leaves
//! the backlight lit. Everything goes through the same library the CLI
//! uses; this is the quickest smoke test after rewiring a backpack.

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use lcd_backpack_hw::{Backpack, FunctionSet, Line};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut backpack =
        Backpack::open().context("Failed to open the LCD backpack. Is it plugged in?")?;

    backpack.init(FunctionSet {
        eight_bit_bus: true,
        two_lines: true,
        font_5x10: false,
    })?;
    backpack.backlight(true)?;

    backpack.write_text(Line::One, "LCD backpack")?;
    backpack.write_text(Line::Two, "up and running")?;

    thread::sleep(Duration::from_secs(2));
    backpack.cursor_on(true)?;
    backpack.blink_on(true)?;

    // No teardown: the text and backlight persist after exit.
    Ok(())
}
