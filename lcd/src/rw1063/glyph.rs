//! Custom glyphs for the CGRAM.
//!
//! A glyph is a 5x8 dot cell, stored as 8 rows of which only the low 5 bits are used, the
//! most significant of those being the leftmost dot. The controller holds 8 glyphs, shown
//! when character codes `0`–`7` are written to DDRAM.
//!
//! Glyphs are usually written as strings of `0` and `1`, one per row:
//!
//! ```
//! use rw1063_lcd::rw1063::Glyph;
//!
//! let frame = Glyph::parse(&[
//!     "11111", "10001", "10001", "10001",
//!     "10001", "10001", "10001", "11111",
//! ]).unwrap();
//! assert_eq!(frame.rows()[1], 0b10001);
//! ```

use crate::{LcdError, LcdResult};

/// Number of dot rows in a glyph.
pub const GLYPH_ROWS: usize = 8;
/// Number of dots in a glyph row.
pub const GLYPH_COLUMNS: usize = 5;
/// Number of glyphs the CGRAM holds.
pub const GLYPH_COUNT: usize = 8;

const ROW_MASK: u8 = 0b0001_1111;

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Glyph {
    rows: [u8; GLYPH_ROWS],
}

impl Glyph {
    /// Creates a glyph from row bit patterns.
    ///
    /// # Errors
    /// - [LcdError::InvalidGlyphData] if any row uses more than 5 bits.
    pub fn from_bits(rows: [u8; GLYPH_ROWS]) -> LcdResult<Self> {
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, row)| **row > ROW_MASK) {
            return Err(LcdError::InvalidGlyphData(format!(
                "row {} is {:#010b}, which does not fit in {} bits",
                index, row, GLYPH_COLUMNS
            )));
        }
        Ok(Glyph { rows })
    }

    /// Parses 8 rows of exactly 5 `0`/`1` characters each, leftmost dot first.
    ///
    /// # Errors
    /// - [LcdError::InvalidGlyphData] if there are not exactly 8 rows, or a row is not 5
    ///   characters long, or contains anything other than `0` and `1`.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> LcdResult<Self> {
        if rows.len() != GLYPH_ROWS {
            return Err(LcdError::InvalidGlyphData(format!(
                "expected {} rows, got {}",
                GLYPH_ROWS,
                rows.len()
            )));
        }

        let mut bits = [0u8; GLYPH_ROWS];
        for (index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != GLYPH_COLUMNS || !row.bytes().all(|b| b == b'0' || b == b'1') {
                return Err(LcdError::InvalidGlyphData(format!(
                    "row {} ({:?}) is not a {}-bit binary string",
                    index, row, GLYPH_COLUMNS
                )));
            }
            bits[index] = row.bytes().fold(0, |acc, b| (acc << 1) | (b - b'0'));
        }

        Ok(Glyph { rows: bits })
    }

    pub fn rows(&self) -> [u8; GLYPH_ROWS] {
        self.rows
    }
}

/// The full CGRAM content: exactly 8 glyphs.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct GlyphTable {
    glyphs: [Glyph; GLYPH_COUNT],
}

impl GlyphTable {
    /// Bar-graph levels: glyph `n` is a `10001` frame with its bottom `n` rows filled.
    pub const VERTICAL_LEVELS: GlyphTable = GlyphTable::from_rows([
        [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11],
        [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1F],
        [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1F, 0x1F],
        [0x11, 0x11, 0x11, 0x11, 0x11, 0x1F, 0x1F, 0x1F],
        [0x11, 0x11, 0x11, 0x11, 0x1F, 0x1F, 0x1F, 0x1F],
        [0x11, 0x11, 0x11, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F],
        [0x11, 0x11, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F],
        [0x11, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F],
    ]);

    /// Horizontal progress bar cells: glyph `n` (0 to 5) has its left `n` columns filled between
    /// a top and bottom border. Glyphs 6 and 7 are the last two [GlyphTable::VERTICAL_LEVELS].
    pub const HORIZONTAL_PROGRESS: GlyphTable = GlyphTable::from_rows([
        [0x1F, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F],
        [0x1F, 0x00, 0x10, 0x10, 0x10, 0x10, 0x00, 0x1F],
        [0x1F, 0x00, 0x18, 0x18, 0x18, 0x18, 0x00, 0x1F],
        [0x1F, 0x00, 0x1C, 0x1C, 0x1C, 0x1C, 0x00, 0x1F],
        [0x1F, 0x00, 0x1E, 0x1E, 0x1E, 0x1E, 0x00, 0x1F],
        [0x1F, 0x00, 0x1F, 0x1F, 0x1F, 0x1F, 0x00, 0x1F],
        [0x11, 0x11, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F],
        [0x11, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F],
    ]);

    /// Number of progress steps a single [GlyphTable::HORIZONTAL_PROGRESS] cell can show.
    pub const PROGRESS_STEPS_PER_CELL: usize = GLYPH_COLUMNS;

    pub fn new(glyphs: [Glyph; GLYPH_COUNT]) -> Self {
        GlyphTable { glyphs }
    }

    /// Only for the built-in tables, whose rows are known to fit.
    const fn from_rows(rows: [[u8; GLYPH_ROWS]; GLYPH_COUNT]) -> Self {
        let mut glyphs = [Glyph { rows: [0; GLYPH_ROWS] }; GLYPH_COUNT];
        let mut i = 0;
        while i < GLYPH_COUNT {
            glyphs[i] = Glyph { rows: rows[i] };
            i += 1;
        }
        GlyphTable { glyphs }
    }

    /// Parses a table of exactly 8 glyphs, each as accepted by [Glyph::parse].
    pub fn parse<G: AsRef<[S]>, S: AsRef<str>>(glyphs: &[G]) -> LcdResult<Self> {
        if glyphs.len() != GLYPH_COUNT {
            return Err(LcdError::InvalidGlyphData(format!(
                "expected {} glyphs, got {}",
                GLYPH_COUNT,
                glyphs.len()
            )));
        }

        let mut table = GlyphTable::default();
        for (index, rows) in glyphs.iter().enumerate() {
            table.glyphs[index] = Glyph::parse(rows.as_ref()).map_err(|err| match err {
                LcdError::InvalidGlyphData(reason) => {
                    LcdError::InvalidGlyphData(format!("glyph {}: {}", index, reason))
                }
                err => err,
            })?;
        }
        Ok(table)
    }

    /// CGRAM address of the first row of glyph `index`.
    pub fn cgram_address(index: usize) -> u8 {
        (index as u8 & 0b111) * 0x08
    }

    pub fn glyph(&self, index: usize) -> Option<&Glyph> {
        self.glyphs.get(index)
    }

    /// Replaces the glyph at `index` (0 to 7).
    pub fn set_glyph(&mut self, index: usize, glyph: Glyph) -> LcdResult<()> {
        let slot = self.glyphs.get_mut(index).ok_or_else(|| {
            LcdError::InvalidGlyphData(format!("glyph index {} out of range", index))
        })?;
        *slot = glyph;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Glyph> {
        self.glyphs.iter()
    }

    /// Fills `cells` with [GlyphTable::HORIZONTAL_PROGRESS] character codes for `percent`
    /// (clamped to 100) of the bar.
    pub fn progress_cells(percent: usize, cells: &mut [u8]) {
        let total_steps = cells.len() * Self::PROGRESS_STEPS_PER_CELL;
        let filled = total_steps * percent.min(100) / 100;
        for (index, cell) in cells.iter_mut().enumerate() {
            let start = index * Self::PROGRESS_STEPS_PER_CELL;
            *cell = filled.saturating_sub(start).min(Self::PROGRESS_STEPS_PER_CELL) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{DATA_WRITE, INSTRUCTION_WRITE};
    use crate::rw1063::driver::tests::{RecordingBus, RecordingDelay};
    use crate::rw1063::Rw1063Driver;

    const LEVEL_1: [&str; 8] = [
        "10001", "10001", "10001", "10001", "10001", "10001", "10001", "11111",
    ];

    #[test]
    fn parses_binary_rows() {
        let glyph = Glyph::parse(&LEVEL_1).unwrap();
        assert_eq!(glyph.rows(), [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1F]);
        assert_eq!(glyph, GlyphTable::VERTICAL_LEVELS.glyph(1).copied().unwrap());
    }

    #[test]
    fn rejects_wrong_row_count() {
        let result = Glyph::parse(&LEVEL_1[..7]);
        assert!(matches!(result, Err(LcdError::InvalidGlyphData(_))));
    }

    #[test]
    fn rejects_rows_outside_5_bits() {
        let mut rows = LEVEL_1.to_vec();
        rows[3] = "100001";
        assert!(matches!(Glyph::parse(&rows), Err(LcdError::InvalidGlyphData(_))));
        rows[3] = "10201";
        assert!(matches!(Glyph::parse(&rows), Err(LcdError::InvalidGlyphData(_))));
        rows[3] = "";
        assert!(matches!(Glyph::parse(&rows), Err(LcdError::InvalidGlyphData(_))));

        let result = Glyph::from_bits([0x11, 0x11, 0x20, 0, 0, 0, 0, 0]);
        assert!(matches!(result, Err(LcdError::InvalidGlyphData(_))));
    }

    #[test]
    fn rejects_short_rows() {
        let mut rows = LEVEL_1.to_vec();
        for short in ["1", "1000", "0001"] {
            rows[0] = short;
            assert!(matches!(Glyph::parse(&rows), Err(LcdError::InvalidGlyphData(_))), "{:?}", short);
        }
    }

    #[test]
    fn table_needs_exactly_8_glyphs() {
        let seven = vec![LEVEL_1; 7];
        assert!(matches!(GlyphTable::parse(&seven), Err(LcdError::InvalidGlyphData(_))));

        let eight = vec![LEVEL_1; 8];
        let table = GlyphTable::parse(&eight).unwrap();
        assert!(table.iter().all(|glyph| glyph.rows()[7] == 0x1F));
    }

    #[test]
    fn cgram_addresses_step_by_8() {
        let addresses: Vec<u8> = (0..8).map(GlyphTable::cgram_address).collect();
        assert_eq!(addresses, [0x00, 0x08, 0x10, 0x18, 0x20, 0x28, 0x30, 0x38]);
    }

    #[test]
    fn loader_addresses_each_glyph_once_then_streams_rows() {
        let table = GlyphTable::parse(&vec![LEVEL_1; 8]).unwrap();
        let mut lcd = Rw1063Driver::new(RecordingBus::default(), RecordingDelay::default());

        lcd.load_glyphs(&table).unwrap();
        let (bus, _) = lcd.release();

        assert_eq!(bus.sent.len(), 8 * 9);
        for (index, chunk) in bus.sent.chunks(9).enumerate() {
            assert_eq!(chunk[0], (INSTRUCTION_WRITE, vec![0x40 | (index as u8 * 8)]));
            for row in &chunk[1..8] {
                assert_eq!(*row, (DATA_WRITE, vec![0b0001_0001]));
            }
            assert_eq!(chunk[8], (DATA_WRITE, vec![0b0001_1111]));
        }
    }

    #[test]
    fn progress_cells_fill_left_to_right() {
        let mut cells = [0u8; 4];

        GlyphTable::progress_cells(0, &mut cells);
        assert_eq!(cells, [0, 0, 0, 0]);

        GlyphTable::progress_cells(35, &mut cells);
        assert_eq!(cells, [5, 2, 0, 0]);

        GlyphTable::progress_cells(100, &mut cells);
        assert_eq!(cells, [5, 5, 5, 5]);

        GlyphTable::progress_cells(250, &mut cells);
        assert_eq!(cells, [5, 5, 5, 5]);
    }
}
