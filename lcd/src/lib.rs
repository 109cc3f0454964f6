//! Driver for RW1063 character LCD controllers attached over I²C.
//!
//! The crate is split into the [bus] layer, which knows how to push a single register-write
//! transaction to the controller, and the [rw1063] layer, which turns display operations
//! (clear, entry mode, line writes, custom glyphs) into those transactions.
//! Device addressing lives in [config].

pub mod bus;
pub mod config;
pub mod rw1063;

use thiserror::Error;

pub use bus::{RegisterBus, RegisterCommand, TransportError};
pub use config::{AddressResolver, DeviceConfig, SlaveAddress};

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum LcdError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("invalid line number {0}, expected 1 to 4")]
    InvalidLine(u8),
    #[error("input of {0} bytes does not fit in a single transaction")]
    InputTooLong(usize),
    #[error("invalid glyph data: {0}")]
    InvalidGlyphData(String),
    #[error("address {0:#04x} is not reserved for the RW1063")]
    InvalidAddress(u8),
}

pub type LcdResult<T> = Result<T, LcdError>;
