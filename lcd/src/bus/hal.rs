use std::fmt::{Debug, Formatter};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use crate::bus::{write_block, RegisterBus, TransportError, SETTLE_DELAY};
use crate::config::SlaveAddress;

/// [RegisterBus] over any `embedded-hal` I²C implementation.
///
/// The bus handle is held for the lifetime of the transport and reused for every transaction.
/// After each successful write the provided delay waits [SETTLE_DELAY].
pub struct HalRegisterBus<I, D> {
    i2c: I,
    delay: D,
    address: SlaveAddress,
}

impl<I: I2c, D: DelayNs> HalRegisterBus<I, D> {
    pub fn new(i2c: I, address: SlaveAddress, delay: D) -> Self {
        HalRegisterBus { i2c, delay, address }
    }

    pub fn address(&self) -> SlaveAddress {
        self.address
    }

    /// Gives back the I²C handle and delay.
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }
}

impl<I, D> Debug for HalRegisterBus<I, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "HalRegisterBus({:?})", self.address)
    }
}

impl<I: I2c, D: DelayNs> RegisterBus for HalRegisterBus<I, D> {
    fn send(&mut self, selector: u8, payload: &[u8]) -> Result<(), TransportError> {
        write_block(&mut self.i2c, self.address.into(), selector, payload)?;
        self.delay.delay_us(SETTLE_DELAY.as_micros() as u32);
        Ok(())
    }
}
