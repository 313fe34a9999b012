//! Capacitive soil probe driver (seesaw firmware).

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::bus::BusHandle;
use crate::error::Result;
use crate::registers::soil::{
    ADDRESS, STATUS_BASE, STATUS_TEMP, TEMPERATURE_FLAG_MASK, TOUCH_BASE, TOUCH_CHANNEL_0,
};

// Conversion wait after issuing a command pair (microseconds).
const CONVERSION_DELAY_US: u32 = 400;
// Scale from the masked 32-bit register value to degrees Celsius.
const TEMPERATURE_SCALE: f64 = 0.000_015_258_78;

/// Driver for the capacitive soil probe on the shared bus.
///
/// The probe has no readiness interrupt; every read is a command write
/// followed by a fixed conversion wait and a plain read. There is no
/// recovery path for a failed transfer short of a fresh bus handle, so
/// callers treat any error from this probe as fatal.
pub struct SoilProbe<'bus, I2C> {
    bus: &'bus BusHandle<I2C>,
}

impl<'bus, I2C: I2c> SoilProbe<'bus, I2C> {
    /// Creates a new driver borrowing the shared bus handle.
    pub fn new(bus: &'bus BusHandle<I2C>) -> Self {
        Self { bus }
    }

    /// Reads the capacitive moisture count from touch channel 0.
    pub fn moisture(&mut self, delay: &mut impl DelayNs) -> Result<i16, I2C::Error> {
        self.bus
            .write_raw(ADDRESS, &[TOUCH_BASE, TOUCH_CHANNEL_0])?;
        delay.delay_us(CONVERSION_DELAY_US);
        delay.delay_us(CONVERSION_DELAY_US);

        let mut raw = [0u8; 2];
        self.bus.read_raw(ADDRESS, &mut raw)?;
        Ok(i16::from_be_bytes(raw))
    }

    /// Reads the probe temperature in degrees Celsius.
    pub fn temperature(&mut self, delay: &mut impl DelayNs) -> Result<f64, I2C::Error> {
        self.bus.write_raw(ADDRESS, &[STATUS_BASE, STATUS_TEMP])?;
        delay.delay_us(CONVERSION_DELAY_US);

        let mut raw = [0u8; 4];
        self.bus.read_raw(ADDRESS, &mut raw)?;
        // The top two bits of the first byte are status flags, not data.
        raw[0] &= TEMPERATURE_FLAG_MASK;
        Ok(f64::from(i32::from_be_bytes(raw)) * TEMPERATURE_SCALE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock, Transaction};
    use crate::error::Error;

    #[test]
    fn moisture_count_is_big_endian() {
        let expectations = [
            Transaction::write(0x36, vec![0x0F, 0x10]),
            Transaction::read(0x36, vec![0x02, 0x58]),
        ];
        let mut i2c = Mock::new(&expectations);
        let bus = BusHandle::new(i2c.clone());
        let mut probe = SoilProbe::new(&bus);

        assert_eq!(probe.moisture(&mut NoopDelay).unwrap(), 600);
        i2c.done();
    }

    /// Flag bits in the first byte must be masked off before scaling.
    #[test]
    fn temperature_masks_flag_bits_and_scales() {
        let expectations = [
            Transaction::write(0x36, vec![0x00, 0x04]),
            Transaction::read(0x36, vec![0xC1, 0x00, 0x00, 0x64]),
        ];
        let mut i2c = Mock::new(&expectations);
        let bus = BusHandle::new(i2c.clone());
        let mut probe = SoilProbe::new(&bus);

        let celsius = probe.temperature(&mut NoopDelay).unwrap();
        assert!((celsius - 256.00137383448).abs() < 1e-9);
        i2c.done();
    }

    #[test]
    fn command_failure_surfaces_as_bus_error() {
        let expectations =
            [Transaction::write(0x36, vec![0x0F, 0x10]).with_error(ErrorKind::Other)];
        let mut i2c = Mock::new(&expectations);
        let bus = BusHandle::new(i2c.clone());
        let mut probe = SoilProbe::new(&bus);

        assert_eq!(
            probe.moisture(&mut NoopDelay),
            Err(Error::Bus(ErrorKind::Other))
        );
        i2c.done();
    }
}
