//! Configuration primitives for the ambient-light sensor and spectrometer.

use crate::params::{AlsGain, AlsIntegration, AlsPersistence, Gain};
use crate::registers::ambient::{self, AlsConfig};

/// User-facing configuration for the ambient-light sensor.
///
/// The defaults reproduce the deployed tuning: 1/8 gain with a 25 ms
/// integration time, so the sensor stays out of saturation in direct
/// sunlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmbientConfig {
    /// Analog gain selection.
    pub gain: AlsGain,
    /// Integration time selection.
    pub integration_time: AlsIntegration,
    /// Interrupt persistence selection.
    pub persistence: AlsPersistence,
    /// Threshold interrupt enable.
    pub interrupt_enable: bool,
}

impl AmbientConfig {
    /// Encodes the configuration as the 16-bit `ALS_CONF` register value.
    pub fn register_value(&self) -> AlsConfig {
        AlsConfig::new()
            .with_shutdown(false)
            .with_interrupt_enable(self.interrupt_enable)
            .with_persistence(self.persistence)
            .with_integration_time(self.integration_time)
            .with_gain(self.gain)
    }

    /// Builds the 3-byte configuration burst: command code, then the low and
    /// high register bytes.
    pub fn frame(&self) -> [u8; 3] {
        let bytes: [u8; 2] = self.register_value().into();
        [ambient::ALS_CONF, bytes[0], bytes[1]]
    }
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            gain: AlsGain::Eighth,
            integration_time: AlsIntegration::Ms25,
            persistence: AlsPersistence::Two,
            interrupt_enable: true,
        }
    }
}

/// User-facing configuration for the spectrometer's ADC.
///
/// Integration time follows `(ATIME + 1) x (ASTEP + 1) x 2.78 us`. The
/// defaults (ATIME 0x3C, ASTEP 0x024D, 4x gain) give roughly 100 ms per
/// cycle with the visible channels at about half scale on a cloudless day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpectrometerConfig {
    /// Spectral ADC gain applied to the visible channels.
    pub gain: Gain,
    /// `ATIME` integration step count.
    pub atime: u8,
    /// `ASTEP` step size, written as a latched low/high pair.
    pub astep: u16,
}

impl SpectrometerConfig {
    /// Begins building a [`SpectrometerConfig`] using the builder pattern.
    pub fn new() -> SpectrometerConfigBuilder {
        SpectrometerConfigBuilder::new()
    }

    /// Checks whether this configuration is valid according to the
    /// datasheet rules.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if self.astep == 0xFFFF {
            return Err(ConfigError::ReservedAstep);
        }

        Ok(())
    }

    /// Returns the resulting integration time in microseconds.
    pub const fn integration_time_micros(&self) -> u32 {
        let steps = (self.atime as u64 + 1) * (self.astep as u64 + 1);
        (steps * 278 / 100) as u32
    }
}

impl Default for SpectrometerConfig {
    fn default() -> Self {
        Self {
            gain: Gain::X4,
            atime: 0x3C,
            astep: 0x024D,
        }
    }
}

/// Builder for [`SpectrometerConfig`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct SpectrometerConfigBuilder {
    config: SpectrometerConfig,
}

impl SpectrometerConfigBuilder {
    /// Creates a new builder seeded with [`SpectrometerConfig::default()`].
    pub fn new() -> Self {
        Self {
            config: SpectrometerConfig::default(),
        }
    }

    /// Overrides the spectral gain.
    pub fn gain(mut self, gain: Gain) -> Self {
        self.config.gain = gain;
        self
    }

    /// Overrides the `ATIME` step count.
    pub fn atime(mut self, atime: u8) -> Self {
        self.config.atime = atime;
        self
    }

    /// Overrides the `ASTEP` step size.
    pub fn astep(mut self, astep: u16) -> Self {
        self.config.astep = astep;
        self
    }

    /// Finalizes the builder and returns the [`SpectrometerConfig`].
    pub fn build(self) -> SpectrometerConfig {
        self.config
    }
}

impl Default for SpectrometerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Validation errors generated while verifying a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `ASTEP` value 0xFFFF is reserved by the datasheet.
    ReservedAstep,
}
