//! LCD Backpack Control Tool
//!
//! Flag-driven CLI for the USB universal LCD backpack. Options are applied
//! in a fixed order: init, clear, register flags, message, backlight.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use lcd_backpack_hw::{Backpack, FunctionSet, Line};
use tracing_subscriber::EnvFilter;

/// A 0/1 flag value, matching the backpack's documented option format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum Switch {
    /// Clear the flag
    #[value(alias = "0")]
    Off,
    /// Set the flag
    #[value(alias = "1")]
    On,
}

impl From<Switch> for bool {
    fn from(switch: Switch) -> bool {
        matches!(switch, Switch::On)
    }
}

#[derive(Parser)]
#[command(name = "lcdctl")]
#[command(about = "Control tool for the USB universal LCD backpack")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Initialize the LCD (clear display, 8-bit bus, display on)
    #[arg(short = 'I', long)]
    init: bool,

    /// Clear the display
    #[arg(short = 'R', long)]
    clear: bool,

    /// Message to display
    #[arg(short, long)]
    message: Option<String>,

    /// Line to display the message on (1 or 2)
    #[arg(short = 'n', long, default_value_t = 1)]
    line: u8,

    /// Turn the backlight on or off
    #[arg(short = 'B', long, value_enum)]
    backlight: Option<Switch>,

    /// Seconds to keep the backlight on (0 = indefinitely)
    #[arg(short = 't', long, default_value_t = 0)]
    backlight_secs: u64,

    /// Increment the DDRAM address after each character
    #[arg(short = 'i', long, value_enum)]
    increment: Option<Switch>,

    /// Shift the display on each character write
    #[arg(short = 'L', long, value_enum)]
    entry_shift: Option<Switch>,

    /// Display on or off
    #[arg(short = 'd', long, value_enum)]
    display: Option<Switch>,

    /// Cursor on or off
    #[arg(short = 'c', long, value_enum)]
    cursor: Option<Switch>,

    /// Cursor blink on or off
    #[arg(short = 'b', long, value_enum)]
    blink: Option<Switch>,

    /// Shift the cursor instead of moving it
    #[arg(short = 'C', long, value_enum)]
    cursor_shift: Option<Switch>,

    /// Shift the whole display
    #[arg(short = 'D', long, value_enum)]
    display_shift: Option<Switch>,

    /// Bus width: 0 = 4-bit, 1 = 8-bit
    #[arg(short = 'w', long, value_enum)]
    bus_width: Option<Switch>,

    /// Line count: 0 = one line, 1 = two lines
    #[arg(short = 'l', long, value_enum)]
    lines: Option<Switch>,

    /// Font: 0 = 5x8, 1 = 5x10
    #[arg(short = 'f', long, value_enum)]
    font: Option<Switch>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut backpack =
        Backpack::open().context("Failed to open the LCD backpack. Is it plugged in?")?;

    if cli.init {
        backpack.init(FunctionSet::default())?;
    }
    if cli.clear {
        backpack.clear_display()?;
    }

    if let Some(on) = cli.increment {
        backpack.increment_address(on.into())?;
    }
    if let Some(on) = cli.entry_shift {
        backpack.entry_shift(on.into())?;
    }
    if let Some(on) = cli.display {
        backpack.display_on(on.into())?;
    }
    if let Some(on) = cli.cursor {
        backpack.cursor_on(on.into())?;
    }
    if let Some(on) = cli.blink {
        backpack.blink_on(on.into())?;
    }
    if let Some(on) = cli.cursor_shift {
        backpack.cursor_shift(on.into())?;
    }
    if let Some(on) = cli.display_shift {
        backpack.display_shift(on.into())?;
    }
    if let Some(on) = cli.bus_width {
        backpack.eight_bit_bus(on.into())?;
    }
    if let Some(on) = cli.lines {
        backpack.two_lines(on.into())?;
    }
    if let Some(on) = cli.font {
        backpack.font_5x10(on.into())?;
    }

    if let Some(message) = &cli.message {
        let line = Line::try_from(cli.line)?;
        backpack.write_text(line, message)?;
    }

    if let Some(backlight) = cli.backlight {
        if backlight.into() {
            backpack.backlight_on_for(Duration::from_secs(cli.backlight_secs))?;
        } else {
            backpack.backlight(false)?;
        }
    }

    Ok(())
}
