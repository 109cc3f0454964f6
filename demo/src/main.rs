mod config;
mod detect;
mod show;

use std::thread::sleep;
use dotenv::dotenv;
use linux_embedded_hal::Delay;
use log::{debug, info};
use rw1063_lcd::bus::LinuxRegisterBus;
use rw1063_lcd::rw1063::Rw1063Driver;
use rw1063_lcd::{DeviceConfig, SlaveAddress};
use crate::config::Config;
use crate::detect::I2cDetectResolver;

fn main() -> eyre::Result<()> {
    // Initialize environment and logger
    dotenv().ok();
    pretty_env_logger::init();

    info!("RW1063 demo starting...");

    debug!("Trying to load config...");
    let mut config = if let Some(config) = Config::try_load() {
        info!("Config loaded.");
        config
    } else {
        info!("Config not found. Using default");
        Config::default()
    };
    config.apply_env()?;

    let device = match config.address {
        Some(address) => DeviceConfig::new(config.bus, SlaveAddress::try_from(address)?),
        None => DeviceConfig::resolve(
            config.bus,
            &I2cDetectResolver::new(config.bus),
            SlaveAddress::default(),
        ),
    };
    info!("LCD @ {}, address {}", device.device_path(), device.address);

    debug!("Initializing LCD driver...");
    let mut lcd = Rw1063Driver::new(LinuxRegisterBus::new(device), Delay);
    show::run(&mut lcd, &config.lines, sleep)?;

    info!("Done.");
    Ok(())
}
