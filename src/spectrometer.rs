//! 11-channel spectrometer driver (AS7341) and its measurement state machine.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::bus::BusHandle;
use crate::config::SpectrometerConfig;
use crate::error::{Error, Result};
use crate::log::{debug, warn};
use crate::registers::spectrometer::{
    ADDRESS, ASTEP_H, ASTEP_L, ATIME, CFG1, CFG6, CFG6_SMUX_WRITE, CFG9, CFG9_SINT_SMUX, CONFIG,
    CONFIG_INT_MODE_SPM, CONFIG_SPM_ENABLE, DeviceStatus, ENABLE, Enable, INTENAB, INTENAB_SIEN,
    SMUX_TABLE_LEN, STATUS2, STATUS6, STATUS_READY, STATUS_READY_BIT, VALID_SPECTRAL,
};

/// Number of spectral channels reported per measurement.
pub const CHANNEL_COUNT: usize = 8;

// Interval between readiness polls (microseconds).
const READINESS_POLL_INTERVAL_US: u32 = 400;
// Readiness polling budget: about two integration cycles at the default
// ~100 ms integration time.
const MAX_READINESS_POLLS: u32 = 512;
// Settle wait after triggering the SMUX operation (microseconds).
const SMUX_SETTLE_US: u32 = 500;

/// Lifecycle of the spectrometer, rebuilt on every process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Powered down; no configuration has been attempted.
    Off,
    /// A configuration sequence started but has not completed. Partial
    /// configuration must not be assumed usable; retry from scratch.
    Configuring,
    /// Configured and measuring continuously.
    Idle,
    /// A readiness poll is in progress.
    Measuring,
    /// Spectral data is valid and safe to read.
    Ready,
}

/// Driver for the spectrometer on the shared bus.
pub struct Spectrometer<'bus, I2C> {
    bus: &'bus BusHandle<I2C>,
    config: SpectrometerConfig,
    state: State,
}

impl<'bus, I2C: I2c> Spectrometer<'bus, I2C> {
    /// Creates a new driver borrowing the shared bus handle.
    pub fn new(bus: &'bus BusHandle<I2C>, config: SpectrometerConfig) -> Self {
        Self {
            bus,
            config,
            state: State::Off,
        }
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns a shared reference to the active configuration.
    pub fn config(&self) -> &SpectrometerConfig {
        &self.config
    }

    /// Runs the power-on configuration sequence in one exclusive region.
    ///
    /// The device requires PON before anything else, and all configuration
    /// must land before spectral measurement is enabled; changing
    /// configuration while measuring yields invalid results. ASTEP is a
    /// latched pair and is written low byte first with nothing interposed.
    ///
    /// On failure the driver stays in [`State::Configuring`] and the whole
    /// sequence must be retried from scratch.
    pub fn configure(&mut self) -> Result<(), I2C::Error> {
        self.config.validate().map_err(|_| Error::InvalidConfig)?;

        self.state = State::Configuring;
        let astep = self.config.astep.to_le_bytes();
        let atime = self.config.atime;
        let gain = self.config.gain.raw();
        let sequence = self.bus.with_exclusive_access(|bus| {
            bus.write_register(ADDRESS, ENABLE, Enable::new().with_pon(true).into())?;
            bus.write_register(ADDRESS, CONFIG, CONFIG_INT_MODE_SPM)?;
            bus.write_latched_pair(ADDRESS, ASTEP_L, astep[0], ASTEP_H, astep[1])?;
            bus.write_register(ADDRESS, ATIME, atime)?;
            bus.write_register(ADDRESS, CFG1, gain)?;
            bus.write_register(ADDRESS, CONFIG, CONFIG_SPM_ENABLE)
        });
        match sequence {
            Ok(()) => {
                self.state = State::Idle;
                Ok(())
            }
            Err(err) => {
                warn!("could not configure spectrometer");
                Err(Error::Configuration(err))
            }
        }
    }

    /// Polls the validity status until spectral data is safe to read.
    ///
    /// Read failures during polling are logged and treated as not-ready.
    /// Gives up with [`Error::MeasurementTimeout`] once the polling budget
    /// is exhausted.
    pub fn wait_for_data(&mut self, delay: &mut impl DelayNs) -> Result<(), I2C::Error> {
        self.state = State::Measuring;
        for _ in 0..MAX_READINESS_POLLS {
            match self.bus.read_register(ADDRESS, STATUS2) {
                Ok(VALID_SPECTRAL) => {
                    self.state = State::Ready;
                    return Ok(());
                }
                Ok(_) => debug!("spectral measurement not ready"),
                Err(_) => warn!("could not read spectral status"),
            }
            delay.delay_us(READINESS_POLL_INTERVAL_US);
        }
        Err(Error::MeasurementTimeout)
    }

    /// Blocks on measurement readiness, then returns the channel counts.
    pub fn photon_flux(
        &mut self,
        delay: &mut impl DelayNs,
    ) -> Result<[u16; CHANNEL_COUNT], I2C::Error> {
        self.wait_for_data(delay)?;
        // TODO: decode the channel data registers starting at CH0_DATA_L
        // once the SMUX channel mapping is wired up; until then every
        // channel reports zero.
        Ok([0; CHANNEL_COUNT])
    }

    /// Checks both readiness gates in one exclusive region: the spectral
    /// cycle-complete bit and the validity status byte.
    pub fn measurement_ready(&mut self) -> Result<bool, I2C::Error> {
        let (ready, valid) = self.bus.with_exclusive_access(|bus| {
            let ready = bus.read_register(ADDRESS, STATUS_READY)?;
            let valid = bus.read_register(ADDRESS, STATUS2)?;
            Ok::<_, I2C::Error>((ready, valid))
        })?;
        Ok(ready & STATUS_READY_BIT != 0 && valid == VALID_SPECTRAL)
    }

    /// Reads the device error flags.
    pub fn chip_status(&mut self) -> Result<DeviceStatus, I2C::Error> {
        let raw = self.bus.read_register(ADDRESS, STATUS6)?;
        Ok(DeviceStatus::from(raw))
    }

    /// Loads a 20-byte SMUX configuration into the device RAM and triggers
    /// the SMUX operation.
    ///
    /// A table of any other length is rejected before any bus traffic: the
    /// call is a logged no-op and the driver state does not change.
    pub fn write_smux(&mut self, table: &[u8], delay: &mut impl DelayNs) -> Result<(), I2C::Error> {
        if table.len() != SMUX_TABLE_LEN {
            warn!("smux configuration table must be exactly 20 bytes");
            return Ok(());
        }

        let sequence = self.bus.with_exclusive_access(|bus| {
            bus.write_register(ADDRESS, ENABLE, Enable::new().with_pon(true).into())?;
            bus.write_register(ADDRESS, CFG9, CFG9_SINT_SMUX)?;
            bus.write_register(ADDRESS, INTENAB, INTENAB_SIEN)?;
            bus.write_register(ADDRESS, CFG6, CFG6_SMUX_WRITE)?;
            for (offset, value) in table.iter().enumerate() {
                bus.write_register(ADDRESS, offset as u8, *value)?;
            }
            bus.write_register(
                ADDRESS,
                ENABLE,
                Enable::new().with_pon(true).with_smux_enable(true).into(),
            )?;
            // TODO: poll STATUS5.SINT_SMUX instead of a fixed settle wait.
            delay.delay_us(SMUX_SETTLE_US);
            bus.write_register(ADDRESS, ENABLE, Enable::new().into())
        });
        sequence.map_err(|err| {
            warn!("could not write smux configuration to spectrometer");
            Error::Configuration(err)
        })
    }

    /// Powers the device down.
    ///
    /// Losing the ability to power down the spectrometer is unsafe to
    /// continue past; callers that cannot retire the hardware another way
    /// should terminate on an error from here.
    pub fn disable(&mut self) -> Result<(), I2C::Error> {
        self.bus
            .write_register(ADDRESS, ENABLE, Enable::new().into())?;
        self.state = State::Off;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock, Transaction};

    fn status_poll(response: u8) -> [Transaction; 4] {
        [
            Transaction::transaction_start(0x39),
            Transaction::write(0x39, vec![0xA3]),
            Transaction::read(0x39, vec![response]),
            Transaction::transaction_end(0x39),
        ]
    }

    #[test]
    fn configure_runs_the_full_sequence_in_order() {
        let expectations = [
            Transaction::write(0x39, vec![0x80, 0x01]),
            Transaction::write(0x39, vec![0x70, 0x00]),
            Transaction::write(0x39, vec![0xCA, 0x4D]),
            Transaction::write(0x39, vec![0xCB, 0x02]),
            Transaction::write(0x39, vec![0x81, 0x3C]),
            Transaction::write(0x39, vec![0xAA, 0x03]),
            Transaction::write(0x39, vec![0x70, 0x03]),
        ];
        let mut i2c = Mock::new(&expectations);
        let bus = BusHandle::new(i2c.clone());
        let mut spectrometer = Spectrometer::new(&bus, SpectrometerConfig::default());

        assert_eq!(spectrometer.state(), State::Off);
        spectrometer.configure().unwrap();
        assert_eq!(spectrometer.state(), State::Idle);
        i2c.done();
    }

    /// A failure on the ASTEP low byte must abort the sequence before ATIME
    /// and gain are touched, leaving the driver mid-configuration.
    #[test]
    fn configure_aborts_on_astep_low_byte_failure() {
        let expectations = [
            Transaction::write(0x39, vec![0x80, 0x01]),
            Transaction::write(0x39, vec![0x70, 0x00]),
            Transaction::write(0x39, vec![0xCA, 0x4D]).with_error(ErrorKind::Other),
        ];
        let mut i2c = Mock::new(&expectations);
        let bus = BusHandle::new(i2c.clone());
        let mut spectrometer = Spectrometer::new(&bus, SpectrometerConfig::default());

        assert_eq!(
            spectrometer.configure(),
            Err(Error::Configuration(ErrorKind::Other))
        );
        assert_eq!(spectrometer.state(), State::Configuring);
        i2c.done();
    }

    #[test]
    fn invalid_config_is_rejected_before_any_bus_traffic() {
        let expectations: [Transaction; 0] = [];
        let mut i2c = Mock::new(&expectations);
        let bus = BusHandle::new(i2c.clone());
        let config = SpectrometerConfig::new().astep(0xFFFF).build();
        let mut spectrometer = Spectrometer::new(&bus, config);

        assert_eq!(spectrometer.configure(), Err(Error::InvalidConfig));
        assert_eq!(spectrometer.state(), State::Off);
        i2c.done();
    }

    #[test]
    fn wait_for_data_polls_until_the_validity_byte_matches() {
        let mut expectations = Vec::new();
        expectations.extend(status_poll(0x00));
        expectations.extend(status_poll(VALID_SPECTRAL));
        let mut i2c = Mock::new(&expectations);
        let bus = BusHandle::new(i2c.clone());
        let mut spectrometer = Spectrometer::new(&bus, SpectrometerConfig::default());

        spectrometer.wait_for_data(&mut NoopDelay).unwrap();
        assert_eq!(spectrometer.state(), State::Ready);
        i2c.done();
    }

    /// Saturation flags alongside AVALID do not count as ready: only the
    /// literal validity byte does.
    #[test]
    fn wait_for_data_requires_the_exact_status_byte() {
        let mut expectations = Vec::new();
        expectations.extend(status_poll(0x58));
        expectations.extend(status_poll(VALID_SPECTRAL));
        let mut i2c = Mock::new(&expectations);
        let bus = BusHandle::new(i2c.clone());
        let mut spectrometer = Spectrometer::new(&bus, SpectrometerConfig::default());

        spectrometer.wait_for_data(&mut NoopDelay).unwrap();
        i2c.done();
    }

    #[test]
    fn wait_for_data_times_out_after_the_polling_budget() {
        let mut expectations = Vec::new();
        for _ in 0..MAX_READINESS_POLLS {
            expectations.extend(status_poll(0x00));
        }
        let mut i2c = Mock::new(&expectations);
        let bus = BusHandle::new(i2c.clone());
        let mut spectrometer = Spectrometer::new(&bus, SpectrometerConfig::default());

        assert_eq!(
            spectrometer.wait_for_data(&mut NoopDelay),
            Err(Error::MeasurementTimeout)
        );
        assert_eq!(spectrometer.state(), State::Measuring);
        i2c.done();
    }

    #[test]
    fn photon_flux_reports_zero_counts_once_ready() {
        let expectations = status_poll(VALID_SPECTRAL);
        let mut i2c = Mock::new(&expectations);
        let bus = BusHandle::new(i2c.clone());
        let mut spectrometer = Spectrometer::new(&bus, SpectrometerConfig::default());

        let flux = spectrometer.photon_flux(&mut NoopDelay).unwrap();
        assert_eq!(flux, [0u16; CHANNEL_COUNT]);
        i2c.done();
    }

    /// A table of the wrong length must produce zero bus traffic and leave
    /// the state machine untouched.
    #[test]
    fn write_smux_rejects_wrong_length_tables_without_bus_traffic() {
        let expectations: [Transaction; 0] = [];
        let mut i2c = Mock::new(&expectations);
        let bus = BusHandle::new(i2c.clone());
        let mut spectrometer = Spectrometer::new(&bus, SpectrometerConfig::default());

        let short = [0u8; 19];
        spectrometer.write_smux(&short, &mut NoopDelay).unwrap();
        assert_eq!(spectrometer.state(), State::Off);
        i2c.done();
    }

    #[test]
    fn write_smux_loads_the_table_and_triggers_the_operation() {
        let table: [u8; 20] = core::array::from_fn(|i| 0x40 + i as u8);
        let mut expectations = vec![
            Transaction::write(0x39, vec![0x80, 0x01]),
            Transaction::write(0x39, vec![0xB2, 0x10]),
            Transaction::write(0x39, vec![0xF9, 0x01]),
            Transaction::write(0x39, vec![0xAF, 0x10]),
        ];
        for (offset, value) in table.iter().enumerate() {
            expectations.push(Transaction::write(0x39, vec![offset as u8, *value]));
        }
        expectations.push(Transaction::write(0x39, vec![0x80, 0x11]));
        expectations.push(Transaction::write(0x39, vec![0x80, 0x00]));

        let mut i2c = Mock::new(&expectations);
        let bus = BusHandle::new(i2c.clone());
        let mut spectrometer = Spectrometer::new(&bus, SpectrometerConfig::default());

        spectrometer.write_smux(&table, &mut NoopDelay).unwrap();
        i2c.done();
    }

    #[test]
    fn measurement_ready_needs_both_gates() {
        let expectations = [
            Transaction::transaction_start(0x39),
            Transaction::write(0x39, vec![0x71]),
            Transaction::read(0x39, vec![0x01]),
            Transaction::transaction_end(0x39),
            Transaction::transaction_start(0x39),
            Transaction::write(0x39, vec![0xA3]),
            Transaction::read(0x39, vec![VALID_SPECTRAL]),
            Transaction::transaction_end(0x39),
        ];
        let mut i2c = Mock::new(&expectations);
        let bus = BusHandle::new(i2c.clone());
        let mut spectrometer = Spectrometer::new(&bus, SpectrometerConfig::default());

        assert!(spectrometer.measurement_ready().unwrap());
        i2c.done();
    }

    #[test]
    fn chip_status_decodes_the_error_flags() {
        let expectations = [
            Transaction::transaction_start(0x39),
            Transaction::write(0x39, vec![0xA7]),
            Transaction::read(0x39, vec![0b0010_0001]),
            Transaction::transaction_end(0x39),
        ];
        let mut i2c = Mock::new(&expectations);
        let bus = BusHandle::new(i2c.clone());
        let mut spectrometer = Spectrometer::new(&bus, SpectrometerConfig::default());

        let status = spectrometer.chip_status().unwrap();
        assert!(status.initializing());
        assert!(status.over_temperature());
        assert!(!status.fifo_overflow());
        i2c.done();
    }

    #[test]
    fn disable_powers_the_device_down() {
        let expectations = [Transaction::write(0x39, vec![0x80, 0x00])];
        let mut i2c = Mock::new(&expectations);
        let bus = BusHandle::new(i2c.clone());
        let mut spectrometer = Spectrometer::new(&bus, SpectrometerConfig::default());

        spectrometer.disable().unwrap();
        assert_eq!(spectrometer.state(), State::Off);
        i2c.done();
    }
}
