//! The demonstration sequence shown on the display.

use std::time::Duration;
use embedded_hal::delay::DelayNs;
use log::debug;
use rw1063_lcd::rw1063::{GlyphTable, Rw1063Driver};
use rw1063_lcd::{LcdResult, RegisterBus};

const LINE_WIDTH: usize = 20;

const LINE_PAUSE: Duration = Duration::from_secs(1);
const STEP_PAUSE: Duration = Duration::from_millis(20);

/// Initializes the display, shows `lines` one by one, then sweeps a progress bar over line 4.
///
/// `pause` is called between steps so the sequence is watchable.
pub fn run<B: RegisterBus, D: DelayNs>(
    lcd: &mut Rw1063Driver<B, D>,
    lines: &[String],
    mut pause: impl FnMut(Duration),
) -> LcdResult<()> {
    lcd.initialize()?;
    // Lines and CGRAM rows are streamed, so the address counter has to count up.
    lcd.entry_mode_right_shift_off()?;
    debug!("{:?} initialized.", lcd);

    for (number, text) in (1..=4).zip(lines) {
        lcd.display_string(text, number)?;
        pause(LINE_PAUSE);
    }

    lcd.load_glyphs(&GlyphTable::HORIZONTAL_PROGRESS)?;
    lcd.clear_display()?;

    let mut bar = [0u8; LINE_WIDTH];
    for percent in 0..=100 {
        GlyphTable::progress_cells(percent, &mut bar);
        lcd.display_buffer(&bar, 4)?;
        pause(STEP_PAUSE);
    }
    Ok(())
}
