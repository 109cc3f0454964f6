use std::env::var_os;
use std::ffi::OsStr;
use std::path::Path;
use dotenv::var;
use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Config {
    /// I²C bus number, `/dev/i2c-<bus>`.
    pub bus: u8,
    /// Slave address; autodetected when missing.
    pub address: Option<u8>,
    /// Text for lines 1 to 4.
    pub lines: Vec<String>,
}

impl Config {
    pub fn try_load() -> Option<Self> {
        let config_str = var_os("CONFIG_FILE");
        let config_str: &OsStr = config_str.as_deref().unwrap_or(OsStr::new("rw1063.json"));
        Self::load_from(Path::new(config_str))
    }

    /// Reads the config at `config_path`. A missing file is `None`; an unreadable or malformed
    /// one is `None` as well, with a warning.
    pub fn load_from(config_path: &Path) -> Option<Self> {
        if !config_path.exists() {
            return None;
        }
        let file = std::fs::File::open(config_path)
            .inspect_err(|err| warn!("Failed to open {}: {}", config_path.display(), err))
            .ok()?;
        let reader = std::io::BufReader::new(file);
        match serde_json::from_reader(reader) {
            Ok(config) => Some(config),
            Err(err) => {
                warn!("Ignoring malformed config {}: {}", config_path.display(), err);
                None
            }
        }
    }

    /// Applies `RW1063_I2C_BUS` and `RW1063_I2C_ADDRESS` from the environment, if set.
    ///
    /// The address may be written with or without a `0x` prefix, always in hex.
    pub fn apply_env(&mut self) -> eyre::Result<()> {
        if let Ok(bus) = var("RW1063_I2C_BUS") {
            self.bus = bus.trim().parse()?;
        }
        if let Ok(address) = var("RW1063_I2C_ADDRESS") {
            self.address = Some(parse_hex(&address)?);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bus: 1,
            address: None,
            lines: vec![
                "- Display Line 1".to_string(),
                "- Display Line 2".to_string(),
                "- Display Line 3".to_string(),
                "- Display Line 4".to_string(),
            ],
        }
    }
}

pub fn parse_hex(s: &str) -> eyre::Result<u8> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    Ok(u8::from_str_radix(digits, 16)?)
}
