//! Register-write transport for the RW1063.
//!
//! Over I²C the controller only accepts writes. Every transaction starts with a control byte
//! selecting either the instruction register (IR) or the data register (DR), followed by up to
//! [MAX_PAYLOAD_LEN] bytes that all go to the selected register.

mod hal;
#[cfg(feature = "linux")]
mod linux;

use std::fmt::Debug;
use std::time::Duration;
use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use log::trace;
use thiserror::Error;

pub use hal::*;
#[cfg(feature = "linux")]
pub use linux::*;

/// Control byte selecting the instruction register.
pub const INSTRUCTION_WRITE: u8 = 0b0000_0000;
/// Control byte selecting the data register (DDRAM or CGRAM, whichever was addressed last).
pub const DATA_WRITE: u8 = 0b0100_0000;

/// Largest payload a single block write may carry.
pub const MAX_PAYLOAD_LEN: usize = 32;

/// Time the controller needs after each write before it accepts the next one.
pub const SETTLE_DELAY: Duration = Duration::from_micros(100);

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum TransportError {
    #[error("bus unavailable: {0}")]
    Unavailable(String),
    #[error("device did not acknowledge")]
    NoAcknowledge,
    #[error("payload of {0} bytes exceeds the transaction limit")]
    PayloadTooLong(usize),
    #[error("bus error: {0}")]
    Bus(ErrorKind),
}

impl From<ErrorKind> for TransportError {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NoAcknowledge(_) => TransportError::NoAcknowledge,
            kind => TransportError::Bus(kind),
        }
    }
}

/// A single write to one of the two controller registers.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RegisterCommand<'a> {
    /// One instruction byte for the IR.
    Instruction(u8),
    /// Character or glyph-row bytes for the DR.
    Data(&'a [u8]),
}

impl RegisterCommand<'_> {
    /// The control byte prefixed to the transaction.
    pub fn selector(&self) -> u8 {
        match self {
            RegisterCommand::Instruction(_) => INSTRUCTION_WRITE,
            RegisterCommand::Data(_) => DATA_WRITE,
        }
    }

    pub fn payload(&self) -> &[u8] {
        match self {
            RegisterCommand::Instruction(byte) => std::slice::from_ref(byte),
            RegisterCommand::Data(bytes) => bytes,
        }
    }
}

/// Low-level transport used by the [crate::rw1063::Rw1063Driver].
///
/// Implementations write `selector` followed by `payload` as one block to the device, then wait
/// at least [SETTLE_DELAY] before returning. They never retry.
pub trait RegisterBus: Debug {
    /// Sends a single register-write transaction.
    ///
    /// # Errors
    /// - [TransportError::PayloadTooLong] if `payload` is longer than [MAX_PAYLOAD_LEN]; nothing is
    ///   written in that case.
    /// - [TransportError::Unavailable] if the bus cannot be opened.
    /// - [TransportError::NoAcknowledge] if the device does not answer.
    fn send(&mut self, selector: u8, payload: &[u8]) -> Result<(), TransportError>;

    /// Sends a [RegisterCommand].
    fn send_command(&mut self, command: RegisterCommand<'_>) -> Result<(), TransportError> {
        self.send(command.selector(), command.payload())
    }
}

/// Writes one transaction block to `address` on an already opened bus.
///
/// Shared by every [RegisterBus] implementation; the caller is responsible for the settle delay.
pub(crate) fn write_block<I: I2c>(
    i2c: &mut I,
    address: u8,
    selector: u8,
    payload: &[u8],
) -> Result<(), TransportError> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(TransportError::PayloadTooLong(payload.len()));
    }

    trace!("Writing to {:#04x}: selector {:#04x}, payload {:02x?}", address, selector, payload);

    let mut block = [0u8; MAX_PAYLOAD_LEN + 1];
    block[0] = selector;
    block[1..=payload.len()].copy_from_slice(payload);

    i2c.write(address, &block[..=payload.len()])
        .map_err(|err| TransportError::from(err.kind()))
}
