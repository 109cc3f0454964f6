//! Address autodetection through the `i2cdetect` tool from i2c-tools.
//!
//! Best-effort only: a missing tool, a failing scan or a scan without any RW1063 address all
//! resolve to `None`, leaving the fallback to [DeviceConfig::resolve](rw1063_lcd::DeviceConfig::resolve).

use std::path::Path;
use std::process::Command;
use log::debug;
use rw1063_lcd::{AddressResolver, SlaveAddress};

const I2CDETECT: &str = "/usr/sbin/i2cdetect";

#[derive(Debug)]
pub struct I2cDetectResolver {
    bus: u8,
}

impl I2cDetectResolver {
    pub fn new(bus: u8) -> Self {
        I2cDetectResolver { bus }
    }
}

impl AddressResolver for I2cDetectResolver {
    fn resolve_address(&self) -> Option<SlaveAddress> {
        if !Path::new(I2CDETECT).exists() {
            debug!("{} not found", I2CDETECT);
            return None;
        }

        let output = Command::new(I2CDETECT)
            .args(["-y", &self.bus.to_string()])
            .output()
            .inspect_err(|err| debug!("Failed to run {}: {}", I2CDETECT, err))
            .ok()?;
        if !output.status.success() {
            debug!("{} exited with {}", I2CDETECT, output.status);
            return None;
        }

        find_rw1063(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Finds the first RW1063 address in an `i2cdetect` table.
///
/// Rows look like `30: -- -- -- -- -- -- -- -- -- -- -- -- 3c -- -- --`; `--` is an empty slot
/// and `UU` one claimed by a kernel driver.
pub fn find_rw1063(table: &str) -> Option<SlaveAddress> {
    table
        .lines()
        .filter_map(|line| line.split_once(':').map(|(_, cells)| cells))
        .flat_map(str::split_whitespace)
        .filter_map(|cell| u8::from_str_radix(cell, 16).ok())
        .find_map(|address| SlaveAddress::try_from(address).ok())
}
