use std::fmt::{Debug, Formatter};
use std::time::Duration;
use embedded_hal::delay::DelayNs;
use log::{debug, trace, warn};
use crate::bus::{RegisterBus, RegisterCommand, MAX_PAYLOAD_LEN};
use crate::rw1063::glyph::GlyphTable;
use crate::rw1063::{CursorDirection, DataLength, EntryShift, Font, Instruction, Line, LineMode};
use crate::{LcdError, LcdResult};

/// Time the controller needs after the initial configuration burst before it reliably accepts
/// further commands.
pub const INIT_SETTLE_DELAY: Duration = Duration::from_millis(200);

/// Driver for the RW1063 controller.
///
/// Every method issues its instructions unconditionally and keeps no copy of the display state:
/// the address counter, entry mode and display flags live only in the controller. If any call
/// fails, the controller state is undefined and [Rw1063Driver::initialize] should be called
/// again.
///
/// `D` is only used for the settle delay at the end of [Rw1063Driver::initialize]; per-transaction
/// delays are the bus' job.
pub struct Rw1063Driver<B, D> {
    bus: B,
    delay: D,
}

impl<B: RegisterBus, D: DelayNs> Rw1063Driver<B, D> {
    /// Creates the driver. Nothing is sent until [Rw1063Driver::initialize] is called.
    pub fn new(bus: B, delay: D) -> Self {
        Rw1063Driver { bus, delay }
    }

    /// Gives back the bus and the delay.
    pub fn release(self) -> (B, D) {
        (self.bus, self.delay)
    }

    /// Puts the controller into the default configuration.
    ///
    /// The sequence is:
    /// - function set: 8-bit interface (required over I²C), two lines, 5x8 font,
    /// - display on, cursor off, blink off,
    /// - clear display,
    /// - entry mode: left, no shift,
    ///
    /// followed by a [INIT_SETTLE_DELAY] wait.
    pub fn initialize(&mut self) -> LcdResult<()> {
        debug!("Initializing RW1063 on {:?}", self.bus);

        self.function_set(DataLength::EightBit, LineMode::Two, Font::Dots5x8)?;
        self.set_display_on(false, false)?;
        self.clear_display()?;
        self.entry_mode_left_shift_off()?;

        self.delay.delay_ms(INIT_SETTLE_DELAY.as_millis() as u32);

        debug!("RW1063 initialized");
        Ok(())
    }

    /// Clears the display, sets the address counter to `0x00` and the entry mode to increment.
    ///
    /// The entry mode change happens inside the controller; it is not re-sent afterwards.
    pub fn clear_display(&mut self) -> LcdResult<()> {
        self.send_instruction(Instruction::ClearDisplay)
    }

    /// Moves the cursor to `0x00` and undoes display shifts. DDRAM content stays.
    pub fn return_home(&mut self) -> LcdResult<()> {
        self.send_instruction(Instruction::ReturnHome)
    }

    /// Clears the display and returns home.
    pub fn clear(&mut self) -> LcdResult<()> {
        self.clear_display()?;
        self.return_home()
    }

    /// Sets the moving direction of the cursor, and whether the whole display shifts on DDRAM
    /// writes.
    pub fn set_entry_mode(
        &mut self,
        direction: CursorDirection,
        shift: EntryShift,
    ) -> LcdResult<()> {
        self.send_instruction(Instruction::EntryModeSet { direction, shift })
    }

    /// Shifts the entire display on each write, the cursor follows.
    pub fn entry_mode_left_shift_on(&mut self) -> LcdResult<()> {
        self.set_entry_mode(CursorDirection::Left, EntryShift::On)
    }

    /// Moves the cursor left, the address counter is decreased by 1 on each write.
    pub fn entry_mode_left_shift_off(&mut self) -> LcdResult<()> {
        self.set_entry_mode(CursorDirection::Left, EntryShift::Off)
    }

    pub fn entry_mode_right_shift_on(&mut self) -> LcdResult<()> {
        self.set_entry_mode(CursorDirection::Right, EntryShift::On)
    }

    /// Moves the cursor right, the address counter is increased by 1 on each write.
    pub fn entry_mode_right_shift_off(&mut self) -> LcdResult<()> {
        self.set_entry_mode(CursorDirection::Right, EntryShift::Off)
    }

    /// Turns the display on. While blinking, the cursor cell alternates with all dots lit
    /// (about 185 ms at 540 kHz).
    pub fn set_display_on(&mut self, cursor_on: bool, blink_on: bool) -> LcdResult<()> {
        self.send_instruction(Instruction::DisplayControl {
            display_on: true,
            cursor_on,
            blink_on,
        })
    }

    /// Turns the display off. DDRAM keeps its content.
    pub fn set_display_off(&mut self) -> LcdResult<()> {
        self.send_instruction(Instruction::DisplayControl {
            display_on: false,
            cursor_on: false,
            blink_on: false,
        })
    }

    /// Moves the cursor, or shifts the whole display, one cell in `direction`.
    pub fn cursor_display_shift(
        &mut self,
        display_shift: bool,
        direction: CursorDirection,
    ) -> LcdResult<()> {
        self.send_instruction(Instruction::CursorDisplayShift { display_shift, direction })
    }

    pub fn function_set(
        &mut self,
        data_length: DataLength,
        lines: LineMode,
        font: Font,
    ) -> LcdResult<()> {
        if data_length == DataLength::FourBit {
            warn!("4-bit data length requested, the I2C interface needs 8-bit");
        }
        self.send_instruction(Instruction::FunctionSet { data_length, lines, font })
    }

    /// Points the address counter at CGRAM. Subsequent data writes go to CGRAM.
    ///
    /// The address is not validated and should be 6-bit.
    pub fn set_cgram_address(&mut self, address: u8) -> LcdResult<()> {
        self.send_instruction(Instruction::SetCgramAddress(address))
    }

    /// Points the address counter at DDRAM. Subsequent data writes go to DDRAM.
    ///
    /// The address is not validated. It is up to the caller to keep it inside the current mode:
    /// `0x00`–`0x4F` with one line, `0x00`–`0x27` and `0x40`–`0x67` with two lines. Anything
    /// else is forwarded to the controller as is.
    pub fn set_ddram_address(&mut self, address: u8) -> LcdResult<()> {
        self.send_instruction(Instruction::SetDdramAddress(address))
    }

    /// Writes one byte to whichever RAM was addressed last. Only the low 8 bits of `data` are
    /// sent.
    pub fn write_ram_data(&mut self, data: u32) -> LcdResult<()> {
        let byte = (data & 0xFF) as u8;
        self.send_data(&[byte])
    }

    /// Writes `bytes` starting at the first cell of `line` (1 to 4), in a single transaction.
    ///
    /// # Errors
    /// - [LcdError::InvalidLine] if `line` is not 1 to 4.
    /// - [LcdError::InputTooLong] if `bytes` is longer than 32.
    ///
    /// Both are checked before anything is sent.
    pub fn display_line(&mut self, bytes: &[u8], line: u8) -> LcdResult<()> {
        let line = Line::try_from(line)?;
        if bytes.len() > MAX_PAYLOAD_LEN {
            return Err(LcdError::InputTooLong(bytes.len()));
        }

        debug!("Writing {} bytes to line {}", bytes.len(), line.number());
        self.set_ddram_address(line.base_address())?;
        self.send_data(bytes)
    }

    /// Writes text to `line`. Non-ASCII characters are replaced with `?`.
    pub fn display_string(&mut self, text: &str, line: u8) -> LcdResult<()> {
        let bytes: Vec<u8> = text
            .chars()
            .map(|c| {
                if c.is_ascii() {
                    c as u8
                } else {
                    warn!("Non-ASCII character: {}", c);
                    b'?'
                }
            })
            .collect();
        self.display_line(&bytes, line)
    }

    /// Writes raw character codes to `line`, e.g. custom glyphs `0`–`7`.
    pub fn display_buffer(&mut self, buffer: &[u8], line: u8) -> LcdResult<()> {
        self.display_line(buffer, line)
    }

    /// Uploads all 8 glyphs of `glyphs` into CGRAM, making them available as character codes
    /// `0`–`7`.
    ///
    /// Each glyph is addressed once at `0x08 * index`, the 8 rows then follow top to bottom with
    /// the controller advancing the address counter on its own. The entry mode is left alone.
    pub fn load_glyphs(&mut self, glyphs: &GlyphTable) -> LcdResult<()> {
        debug!("Loading custom glyphs into CGRAM");
        for (index, glyph) in glyphs.iter().enumerate() {
            self.set_cgram_address(GlyphTable::cgram_address(index))?;
            for row in glyph.rows() {
                self.write_ram_data(u32::from(row & 0b11111))?;
            }
        }
        Ok(())
    }

    fn send_instruction(&mut self, instruction: Instruction) -> LcdResult<()> {
        let byte = instruction.to_byte();
        trace!("IR <- {:08b} ({:?})", byte, instruction);
        self.bus.send_command(RegisterCommand::Instruction(byte))?;
        Ok(())
    }

    fn send_data(&mut self, bytes: &[u8]) -> LcdResult<()> {
        trace!("DR <- {:02x?}", bytes);
        self.bus.send_command(RegisterCommand::Data(bytes))?;
        Ok(())
    }
}

impl<B: Debug, D> Debug for Rw1063Driver<B, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rw1063Driver({:?})", self.bus)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::bus::{TransportError, DATA_WRITE, INSTRUCTION_WRITE};

    /// A bus that records every transaction instead of sending it.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingBus {
        pub sent: Vec<(u8, Vec<u8>)>,
        pub fail_after: Option<usize>,
    }

    impl RecordingBus {
        pub fn instructions(&self) -> Vec<u8> {
            self.sent
                .iter()
                .filter(|(selector, _)| *selector == INSTRUCTION_WRITE)
                .map(|(_, payload)| payload[0])
                .collect()
        }
    }

    impl RegisterBus for RecordingBus {
        fn send(&mut self, selector: u8, payload: &[u8]) -> Result<(), TransportError> {
            if self.fail_after.is_some_and(|n| self.sent.len() >= n) {
                return Err(TransportError::NoAcknowledge);
            }
            self.sent.push((selector, payload.to_vec()));
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    pub(crate) struct RecordingDelay {
        pub total_ns: u64,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }

    fn driver() -> Rw1063Driver<RecordingBus, RecordingDelay> {
        Rw1063Driver::new(RecordingBus::default(), RecordingDelay::default())
    }

    #[test]
    fn initialize_sends_configuration_burst_then_settles() {
        let mut lcd = driver();
        lcd.initialize().unwrap();
        let (bus, delay) = lcd.release();

        assert_eq!(
            bus.sent,
            vec![
                (INSTRUCTION_WRITE, vec![0x38]),
                (INSTRUCTION_WRITE, vec![0x0C]),
                (INSTRUCTION_WRITE, vec![0x01]),
                (INSTRUCTION_WRITE, vec![0x04]),
            ]
        );
        assert!(delay.total_ns >= 200_000_000);
    }

    #[test]
    fn display_line_addresses_each_line() {
        for (number, base) in [(1, 0x80), (2, 0xC0), (3, 0x94), (4, 0xD4)] {
            let mut lcd = driver();
            lcd.display_buffer(&[0, 1, 2], number).unwrap();
            let (bus, _) = lcd.release();

            assert_eq!(
                bus.sent,
                vec![(INSTRUCTION_WRITE, vec![base]), (DATA_WRITE, vec![0, 1, 2])]
            );
        }
    }

    #[test]
    fn display_string_writes_ascii_codes() {
        let mut lcd = driver();
        lcd.display_string("HELLO", 2).unwrap();
        let (bus, _) = lcd.release();

        assert_eq!(
            bus.sent,
            vec![(INSTRUCTION_WRITE, vec![0xC0]), (DATA_WRITE, b"HELLO".to_vec())]
        );
    }

    #[test]
    fn display_string_replaces_non_ascii() {
        let mut lcd = driver();
        lcd.display_string("1°C", 1).unwrap();
        let (bus, _) = lcd.release();

        assert_eq!(bus.sent[1], (DATA_WRITE, b"1?C".to_vec()));
    }

    #[test]
    fn too_long_input_sends_nothing() {
        let mut lcd = driver();
        let text = "X".repeat(33);

        assert_eq!(lcd.display_string(&text, 1), Err(LcdError::InputTooLong(33)));
        let (bus, _) = lcd.release();
        assert!(bus.sent.is_empty());
    }

    #[test]
    fn thirty_two_bytes_fit() {
        let mut lcd = driver();
        lcd.display_buffer(&[0xFF; 32], 4).unwrap();
        let (bus, _) = lcd.release();

        assert_eq!(bus.sent[1].1.len(), 32);
    }

    #[test]
    fn invalid_line_sends_nothing() {
        let mut lcd = driver();

        assert_eq!(lcd.display_string("hi", 0), Err(LcdError::InvalidLine(0)));
        assert_eq!(lcd.display_string("hi", 5), Err(LcdError::InvalidLine(5)));
        let (bus, _) = lcd.release();
        assert!(bus.sent.is_empty());
    }

    #[test]
    fn write_ram_data_masks_to_8_bits() {
        let mut lcd = driver();
        lcd.write_ram_data(0x1FF).unwrap();
        lcd.write_ram_data(0x41).unwrap();
        let (bus, _) = lcd.release();

        assert_eq!(bus.sent, vec![(DATA_WRITE, vec![0xFF]), (DATA_WRITE, vec![0x41])]);
    }

    #[test]
    fn entry_mode_variants() {
        let mut lcd = driver();
        lcd.entry_mode_left_shift_on().unwrap();
        lcd.entry_mode_left_shift_off().unwrap();
        lcd.entry_mode_right_shift_on().unwrap();
        lcd.entry_mode_right_shift_off().unwrap();
        let (bus, _) = lcd.release();

        assert_eq!(bus.instructions(), vec![0x05, 0x04, 0x07, 0x06]);
    }

    #[test]
    fn set_entry_mode_takes_direction_and_shift() {
        let mut lcd = driver();
        lcd.set_entry_mode(CursorDirection::Right, EntryShift::On).unwrap();
        lcd.set_entry_mode(CursorDirection::Left, EntryShift::Off).unwrap();
        let (bus, _) = lcd.release();

        assert_eq!(bus.instructions(), vec![0x07, 0x04]);
    }

    #[test]
    fn display_control() {
        let mut lcd = driver();
        lcd.set_display_on(false, false).unwrap();
        lcd.set_display_on(true, false).unwrap();
        lcd.set_display_on(true, true).unwrap();
        lcd.set_display_off().unwrap();
        let (bus, _) = lcd.release();

        assert_eq!(bus.instructions(), vec![0x0C, 0x0E, 0x0F, 0x08]);
    }

    #[test]
    fn clear_is_clear_display_then_home() {
        let mut lcd = driver();
        lcd.clear().unwrap();
        let (bus, _) = lcd.release();

        assert_eq!(bus.instructions(), vec![0x01, 0x02]);
    }

    #[test]
    fn addresses_are_forwarded_unvalidated() {
        let mut lcd = driver();
        lcd.set_ddram_address(0x40).unwrap();
        lcd.set_ddram_address(0x7F).unwrap();
        lcd.set_cgram_address(0x08).unwrap();
        let (bus, _) = lcd.release();

        assert_eq!(bus.instructions(), vec![0xC0, 0xFF, 0x48]);
    }

    #[test]
    fn cursor_and_display_shift() {
        let mut lcd = driver();
        lcd.cursor_display_shift(false, CursorDirection::Left).unwrap();
        lcd.cursor_display_shift(true, CursorDirection::Right).unwrap();
        let (bus, _) = lcd.release();

        assert_eq!(bus.instructions(), vec![0x10, 0x1C]);
    }

    #[test]
    fn transport_errors_surface_immediately() {
        let bus = RecordingBus {
            fail_after: Some(1),
            ..RecordingBus::default()
        };
        let mut lcd = Rw1063Driver::new(bus, RecordingDelay::default());

        let result = lcd.display_string("HELLO", 1);

        assert_eq!(result, Err(LcdError::Transport(TransportError::NoAcknowledge)));
        let (bus, _) = lcd.release();
        assert_eq!(bus.sent.len(), 1);
    }
}
