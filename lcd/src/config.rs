//! Device addressing.
//!
//! The driver never discovers devices itself. Callers hand it a [DeviceConfig] with the bus
//! number and the slave address; if they want autodetection, they implement [AddressResolver]
//! and use [DeviceConfig::resolve], which falls back to a caller-supplied default whenever
//! resolution yields nothing.

use std::fmt::{Display, Formatter};
use log::{info, warn};
use crate::LcdError;

/// One of the four 7-bit slave addresses reserved for the RW1063 (`0111100`–`0111111`).
///
/// Which one a module answers on depends on how its address pins are strapped.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum SlaveAddress {
    #[default]
    Addr3C,
    Addr3D,
    Addr3E,
    Addr3F,
}

impl SlaveAddress {
    pub const ALL: [SlaveAddress; 4] = [
        SlaveAddress::Addr3C,
        SlaveAddress::Addr3D,
        SlaveAddress::Addr3E,
        SlaveAddress::Addr3F,
    ];

    pub fn value(&self) -> u8 {
        match self {
            SlaveAddress::Addr3C => 0x3C,
            SlaveAddress::Addr3D => 0x3D,
            SlaveAddress::Addr3E => 0x3E,
            SlaveAddress::Addr3F => 0x3F,
        }
    }
}

impl From<SlaveAddress> for u8 {
    fn from(address: SlaveAddress) -> Self {
        address.value()
    }
}

impl TryFrom<u8> for SlaveAddress {
    type Error = LcdError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        SlaveAddress::ALL
            .into_iter()
            .find(|address| address.value() == value)
            .ok_or(LcdError::InvalidAddress(value))
    }
}

impl Display for SlaveAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#04x}", self.value())
    }
}

/// Something that can find out which address the display answers on.
///
/// Resolution is best-effort: any failure is reported as `None`.
pub trait AddressResolver {
    fn resolve_address(&self) -> Option<SlaveAddress>;
}

/// Bus number and slave address of one display.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DeviceConfig {
    pub bus: u8,
    pub address: SlaveAddress,
}

impl DeviceConfig {
    /// Bus 1 is the user-facing I²C bus on everything but the very first Raspberry Pi revision.
    pub const DEFAULT_BUS: u8 = 1;

    pub fn new(bus: u8, address: SlaveAddress) -> Self {
        DeviceConfig { bus, address }
    }

    /// Builds a config for `bus`, asking `resolver` for the address.
    ///
    /// Uses `fallback` when the resolver returns `None`.
    pub fn resolve(bus: u8, resolver: &dyn AddressResolver, fallback: SlaveAddress) -> Self {
        let address = match resolver.resolve_address() {
            Some(address) => {
                info!("Resolved display address {} on bus {}", address, bus);
                address
            }
            None => {
                warn!("Could not resolve display address on bus {}, using {}", bus, fallback);
                fallback
            }
        };
        DeviceConfig { bus, address }
    }

    /// Path of the `i2c-dev` character device for this bus.
    pub fn device_path(&self) -> String {
        format!("/dev/i2c-{}", self.bus)
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            bus: Self::DEFAULT_BUS,
            address: SlaveAddress::default(),
        }
    }
}
