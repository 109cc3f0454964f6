//! RW1063 LCD controller module.
//!
//! See [Rw1063Driver] for the display operations, and [Instruction] for the instruction set
//! those operations are encoded with.
//!
//! # Registers
//!
//! The controller has two 8-bit registers reachable over I²C. The instruction register (IR)
//! takes the instruction bytes documented on [Instruction], the data register (DR) takes the
//! bytes written into display RAM. Which RAM that is depends on the last address-set
//! instruction: [Instruction::SetCgramAddress] selects CGRAM, [Instruction::SetDdramAddress]
//! selects DDRAM. After every data byte the address counter moves by one according to the
//! current entry mode. The driver never reads any of that back.
//!
//! # Memory
//!
//! - **DDRAM** (Display Data RAM) holds the character codes on screen. On the 20x4 module the four
//!   lines start at `0x00`, `0x40`, `0x14` and `0x54`, see [Line].
//! - **CGRAM** (Character Generator RAM) holds 8 user glyphs of 5x8 dots, character codes `0`–`7`.
//!   See [glyph].
//!
//! # Sources
//!
//! - Orient Display, [“RW1063 LCD driver & controller”](https://www.orientdisplay.com/wp-content/uploads/2020/07/RW1063.pdf)

mod driver;
pub mod glyph;

pub use driver::*;
pub use glyph::{Glyph, GlyphTable};

use crate::{LcdError, LcdResult};

/// Direction the address counter (and with it the cursor) moves after a RAM write.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CursorDirection {
    /// Address counter is decreased by 1.
    Left,
    /// Address counter is increased by 1.
    Right,
}

/// Whether the entire display shifts along with each DDRAM write.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum EntryShift {
    On,
    #[default]
    Off,
}

/// Interface data length of the function set instruction. Over I²C it has to be 8-bit.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum DataLength {
    FourBit,
    #[default]
    EightBit,
}

/// Number of display lines driven by the controller.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum LineMode {
    One,
    #[default]
    Two,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum Font {
    #[default]
    Dots5x8,
    Dots5x11,
}

/// Symbolic form of an instruction register byte.
///
/// Each variant documents its bit layout. Unused low bits are always written as `0`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Instruction {
    /// Fills DDRAM with spaces, sets the address counter to `0x00` and the entry mode to increment.
    ///
    /// Command: `00000001`.
    ClearDisplay,
    /// Sets the address counter to `0x00` and undoes any display shift. DDRAM is not changed.
    ///
    /// Command: `0000001?`.
    ReturnHome,
    /// Command: `000001IS`.
    /// `I` is `1` for [CursorDirection::Right], `0` for [CursorDirection::Left].
    /// `S` is `1` for [EntryShift::On].
    EntryModeSet {
        direction: CursorDirection,
        shift: EntryShift,
    },
    /// Command: `00001DCB`.
    /// `D` turns the display on, `C` the cursor, `B` the cursor blink.
    /// Turning the display off keeps DDRAM content.
    DisplayControl {
        display_on: bool,
        cursor_on: bool,
        blink_on: bool,
    },
    /// Moves the cursor or shifts the display by one without touching DDRAM.
    ///
    /// Command: `0001SR??`.
    /// `S` is `1` for display shift, `0` for cursor move. `R` is `1` for right, `0` for left.
    CursorDisplayShift {
        display_shift: bool,
        direction: CursorDirection,
    },
    /// Command: `001DNF??`.
    /// `D` is `1` for 8-bit data length, `N` is `1` for two lines, `F` is `1` for the 5x11 font.
    FunctionSet {
        data_length: DataLength,
        lines: LineMode,
        font: Font,
    },
    /// Command: `01AAAAAA`.
    SetCgramAddress(u8),
    /// Command: `1AAAAAAA`.
    SetDdramAddress(u8),
}

impl Instruction {
    pub const CLEAR_DISPLAY: u8 = 0b0000_0001;
    pub const RETURN_HOME: u8 = 0b0000_0010;
    pub const ENTRY_MODE_SET: u8 = 0b0000_0100;
    pub const DISPLAY_CONTROL: u8 = 0b0000_1000;
    pub const CURSOR_DISPLAY_SHIFT: u8 = 0b0001_0000;
    pub const FUNCTION_SET: u8 = 0b0010_0000;
    pub const SET_CGRAM_ADDRESS: u8 = 0b0100_0000;
    pub const SET_DDRAM_ADDRESS: u8 = 0b1000_0000;

    /// Encodes the instruction into the byte written to the IR.
    ///
    /// Addresses are OR'd into the opcode as they are, without masking.
    pub fn to_byte(&self) -> u8 {
        match *self {
            Instruction::ClearDisplay => Self::CLEAR_DISPLAY,
            Instruction::ReturnHome => Self::RETURN_HOME,
            Instruction::EntryModeSet { direction, shift } => {
                let mut command = Self::ENTRY_MODE_SET;
                if direction == CursorDirection::Right {
                    command |= 0b0000_0010;
                }
                if shift == EntryShift::On {
                    command |= 0b0000_0001;
                }
                command
            }
            Instruction::DisplayControl { display_on, cursor_on, blink_on } => {
                let mut command = Self::DISPLAY_CONTROL;
                if display_on {
                    command |= 0b0000_0100;
                }
                if cursor_on {
                    command |= 0b0000_0010;
                }
                if blink_on {
                    command |= 0b0000_0001;
                }
                command
            }
            Instruction::CursorDisplayShift { display_shift, direction } => {
                let mut command = Self::CURSOR_DISPLAY_SHIFT;
                if display_shift {
                    command |= 0b0000_1000;
                }
                if direction == CursorDirection::Right {
                    command |= 0b0000_0100;
                }
                command
            }
            Instruction::FunctionSet { data_length, lines, font } => {
                let mut command = Self::FUNCTION_SET;
                if data_length == DataLength::EightBit {
                    command |= 0b0001_0000;
                }
                if lines == LineMode::Two {
                    command |= 0b0000_1000;
                }
                if font == Font::Dots5x11 {
                    command |= 0b0000_0100;
                }
                command
            }
            Instruction::SetCgramAddress(address) => Self::SET_CGRAM_ADDRESS | address,
            Instruction::SetDdramAddress(address) => Self::SET_DDRAM_ADDRESS | address,
        }
    }

    /// Decodes an IR byte. The opcode is the highest set bit; `0x00` is not an instruction.
    pub fn from_byte(byte: u8) -> Option<Instruction> {
        let flag = |mask: u8| byte & mask != 0;
        let direction = |mask: u8| {
            if flag(mask) { CursorDirection::Right } else { CursorDirection::Left }
        };

        let instruction = match byte.leading_zeros() {
            0 => Instruction::SetDdramAddress(byte & 0b0111_1111),
            1 => Instruction::SetCgramAddress(byte & 0b0011_1111),
            2 => Instruction::FunctionSet {
                data_length: if flag(0b0001_0000) { DataLength::EightBit } else { DataLength::FourBit },
                lines: if flag(0b0000_1000) { LineMode::Two } else { LineMode::One },
                font: if flag(0b0000_0100) { Font::Dots5x11 } else { Font::Dots5x8 },
            },
            3 => Instruction::CursorDisplayShift {
                display_shift: flag(0b0000_1000),
                direction: direction(0b0000_0100),
            },
            4 => Instruction::DisplayControl {
                display_on: flag(0b0000_0100),
                cursor_on: flag(0b0000_0010),
                blink_on: flag(0b0000_0001),
            },
            5 => Instruction::EntryModeSet {
                direction: direction(0b0000_0010),
                shift: if flag(0b0000_0001) { EntryShift::On } else { EntryShift::Off },
            },
            6 => Instruction::ReturnHome,
            7 => Instruction::ClearDisplay,
            _ => return None,
        };
        Some(instruction)
    }
}

/// A logical line of the 20x4 display.
///
/// The RW1063 addresses two physical rows; the 20x4 module folds each of them into two visible
/// lines, so lines 3 and 4 continue lines 1 and 2 at DDRAM offset `0x14`. The base addresses
/// are a fixed table for that layout, not something derived from the line number.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Line {
    First,
    Second,
    Third,
    Fourth,
}

impl Line {
    pub const ALL: [Line; 4] = [Line::First, Line::Second, Line::Third, Line::Fourth];

    /// Set-DDRAM instruction byte pointing at the first cell of the line.
    ///
    /// Already OR'd with the [Instruction::SET_DDRAM_ADDRESS] opcode.
    pub fn base_address(&self) -> u8 {
        match self {
            Line::First => 0x80,
            Line::Second => 0xC0,
            Line::Third => 0x94,
            Line::Fourth => 0xD4,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Line::First => 1,
            Line::Second => 2,
            Line::Third => 3,
            Line::Fourth => 4,
        }
    }
}

impl TryFrom<u8> for Line {
    type Error = LcdError;

    /// Converts a 1-based line number.
    fn try_from(number: u8) -> LcdResult<Self> {
        match number {
            1 => Ok(Line::First),
            2 => Ok(Line::Second),
            3 => Ok(Line::Third),
            4 => Ok(Line::Fourth),
            _ => Err(LcdError::InvalidLine(number)),
        }
    }
}
