use std::thread::sleep;
use linux_embedded_hal::I2cdev;
use log::trace;
use crate::bus::{write_block, RegisterBus, TransportError, MAX_PAYLOAD_LEN, SETTLE_DELAY};
use crate::config::DeviceConfig;

/// [RegisterBus] over the Linux `i2c-dev` interface.
///
/// Unlike [super::HalRegisterBus], no handle is kept between calls: `/dev/i2c-N` is opened at
/// the start of every transaction and closed when it ends, whether the write succeeded or not.
#[derive(Debug, Clone)]
pub struct LinuxRegisterBus {
    config: DeviceConfig,
}

impl LinuxRegisterBus {
    pub fn new(config: DeviceConfig) -> Self {
        LinuxRegisterBus { config }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }
}

impl RegisterBus for LinuxRegisterBus {
    fn send(&mut self, selector: u8, payload: &[u8]) -> Result<(), TransportError> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(TransportError::PayloadTooLong(payload.len()));
        }

        let path = self.config.device_path();
        trace!("Opening {}", path);
        let mut session = I2cdev::new(&path)
            .map_err(|err| TransportError::Unavailable(format!("{}: {}", path, err)))?;

        write_block(&mut session, self.config.address.into(), selector, payload)?;
        drop(session);

        sleep(SETTLE_DELAY);
        Ok(())
    }
}
