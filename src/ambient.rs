//! Ambient-light sensor driver (VEML7700 class).

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::bus::BusHandle;
use crate::config::AmbientConfig;
use crate::error::Result;
use crate::log::warn;
use crate::registers::ambient::{ADDRESS, ALS_DATA, WHITE_DATA};

// Settle time after the configuration burst (microseconds).
const CONFIG_SETTLE_US: u32 = 400;

/// Driver for the ambient-light sensor on the shared bus.
pub struct AmbientLight<'bus, I2C> {
    bus: &'bus BusHandle<I2C>,
    config: AmbientConfig,
}

impl<'bus, I2C: I2c> AmbientLight<'bus, I2C> {
    /// Creates a new driver borrowing the shared bus handle.
    pub fn new(bus: &'bus BusHandle<I2C>, config: AmbientConfig) -> Self {
        Self { bus, config }
    }

    /// Returns a shared reference to the active configuration.
    pub fn config(&self) -> &AmbientConfig {
        &self.config
    }

    /// Writes the configuration burst and waits for the sensor to settle.
    ///
    /// Best-effort: a failed write is logged and does not prevent subsequent
    /// reads. The sensor then merely runs with its power-on defaults.
    pub fn configure(&mut self, delay: &mut impl DelayNs) {
        let frame = self.config.frame();
        let written = self.bus.with_exclusive_access(|bus| {
            let result = bus.write_raw(ADDRESS, &frame);
            if result.is_ok() {
                delay.delay_us(CONFIG_SETTLE_US);
            }
            result
        });
        if written.is_err() {
            warn!("could not write configuration to ambient light sensor");
        }
    }

    /// Reads the unfiltered white channel as a raw 16-bit count.
    ///
    /// No averaging and no retry; one two-phase read per call.
    pub fn white_light(&mut self) -> Result<u16, I2C::Error> {
        let mut raw = [0u8; 2];
        self.bus.read_registers(ADDRESS, WHITE_DATA, &mut raw)?;
        Ok(u16::from_le_bytes(raw))
    }

    /// Reads the filtered ALS channel as a raw 16-bit count.
    pub fn ambient_light(&mut self) -> Result<u16, I2C::Error> {
        let mut raw = [0u8; 2];
        self.bus.read_registers(ADDRESS, ALS_DATA, &mut raw)?;
        Ok(u16::from_le_bytes(raw))
    }
}
