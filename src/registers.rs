//! Register map definitions for the three devices on the shared bus.
//!
//! Addresses and bit positions are part of the wire contract and reproduce
//! the datasheets exactly.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::bus::DeviceAddress;
use crate::params::{AlsGain, AlsIntegration, AlsPersistence};

/// Ambient-light sensor (VEML7700 class).
pub mod ambient {
    use super::*;

    /// Fixed 7-bit slave address.
    pub const ADDRESS: DeviceAddress = DeviceAddress::new(0x10);

    /// Register address of `ALS_CONF`.
    pub const ALS_CONF: u8 = 0x00;
    /// Register address of the filtered ALS channel data.
    pub const ALS_DATA: u8 = 0x04;
    /// Register address of the unfiltered white channel data.
    pub const WHITE_DATA: u8 = 0x05;

    /// Bitfield representation of the 16-bit `ALS_CONF` register.
    ///
    /// The register is written as a 3-byte burst: the command code followed
    /// by the low and high configuration bytes.
    #[allow(unused_parens)]
    #[bitfield]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AlsConfig {
        // Shutdown bit (bit 0).
        pub shutdown: bool,
        // Interrupt enable bit (bit 1).
        pub interrupt_enable: bool,
        #[skip]
        __: B2,
        // Interrupt persistence selection (bits 5:4).
        pub persistence: AlsPersistence,
        // Integration time selection (bits 9:6).
        pub integration_time: AlsIntegration,
        #[skip]
        __: B1,
        // Gain selection (bits 12:11).
        pub gain: AlsGain,
        #[skip]
        __: B3,
    }
}

/// Capacitive soil probe (seesaw firmware).
pub mod soil {
    use super::*;

    /// Fixed 7-bit slave address.
    pub const ADDRESS: DeviceAddress = DeviceAddress::new(0x36);

    /// Status module base register.
    pub const STATUS_BASE: u8 = 0x00;
    /// Status module temperature function register.
    pub const STATUS_TEMP: u8 = 0x04;
    /// Capacitive touch module base register.
    pub const TOUCH_BASE: u8 = 0x0F;
    /// Capacitive touch channel 0 function register.
    pub const TOUCH_CHANNEL_0: u8 = 0x10;

    /// The two highest bits of the first temperature byte are status flags,
    /// not data.
    pub const TEMPERATURE_FLAG_MASK: u8 = 0x3F;
}

/// 11-channel spectrometer (AS7341).
pub mod spectrometer {
    use super::*;

    /// Fixed 7-bit slave address.
    pub const ADDRESS: DeviceAddress = DeviceAddress::new(0x39);

    /// Register address of `CONFIG` (integration mode).
    pub const CONFIG: u8 = 0x70;
    /// Register address of the spectral-ready status byte.
    pub const STATUS_READY: u8 = 0x71;
    /// Register address of `ENABLE`.
    pub const ENABLE: u8 = 0x80;
    /// Register address of `ATIME`.
    pub const ATIME: u8 = 0x81;
    /// Register address of the self-clearing event `STATUS`.
    pub const STATUS: u8 = 0x93;
    /// First spectral channel data register (low byte).
    pub const CH0_DATA_L: u8 = 0x95;
    /// Register address of `STATUS2` (measurement validity).
    pub const STATUS2: u8 = 0xA3;
    /// Register address of `STATUS5` (SMUX / flicker interrupts).
    pub const STATUS5: u8 = 0xA6;
    /// Register address of `STATUS6` (device error flags).
    pub const STATUS6: u8 = 0xA7;
    /// Register address of `CFG1` (spectral gain).
    pub const CFG1: u8 = 0xAA;
    /// Register address of `CFG6` (SMUX command).
    pub const CFG6: u8 = 0xAF;
    /// Register address of `CFG9` (SMUX interrupt routing).
    pub const CFG9: u8 = 0xB2;
    /// `ASTEP` latched pair, low byte.
    pub const ASTEP_L: u8 = 0xCA;
    /// `ASTEP` latched pair, high byte.
    pub const ASTEP_H: u8 = 0xCB;
    /// Register address of `INTENAB`.
    pub const INTENAB: u8 = 0xF9;

    /// SPM integration mode field value for `CONFIG`.
    pub const CONFIG_INT_MODE_SPM: u8 = 0x00;
    /// `CONFIG` value that starts continuous spectral measurement.
    pub const CONFIG_SPM_ENABLE: u8 = 0x03;
    /// Literal `STATUS2` byte observed when spectral data is valid.
    pub const VALID_SPECTRAL: u8 = 0x40;
    /// `STATUS_READY` bit 0: a spectral measurement cycle completed.
    pub const STATUS_READY_BIT: u8 = 0x01;
    /// `CFG6` command that opens the SMUX RAM for configuration writes.
    pub const CFG6_SMUX_WRITE: u8 = 0x10;
    /// `CFG9` bit enabling the SMUX-complete system interrupt.
    pub const CFG9_SINT_SMUX: u8 = 0x10;
    /// `INTENAB` system-interrupt-enable bit.
    pub const INTENAB_SIEN: u8 = 0x01;
    /// The SMUX RAM spans registers 0x00..=0x13, one byte each.
    pub const SMUX_TABLE_LEN: usize = 20;

    /// Bitfield representation of the `ENABLE` register (address `0x80`).
    #[allow(unused_parens)]
    #[bitfield]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Enable {
        // Power-on bit (bit 0).
        pub pon: bool,
        // Spectral measurement enable (bit 1).
        pub spectral_enable: bool,
        #[skip]
        __: B1,
        // Wait timer enable (bit 3).
        pub wait_enable: bool,
        // SMUX operation start (bit 4).
        pub smux_enable: bool,
        #[skip]
        __: B1,
        // Flicker detection enable (bit 6).
        pub flicker_enable: bool,
        #[skip]
        __: B1,
    }

    impl From<u8> for Enable {
        fn from(value: u8) -> Self {
            Self::from_bytes([value])
        }
    }

    impl From<Enable> for u8 {
        fn from(value: Enable) -> Self {
            value.into_bytes()[0]
        }
    }

    /// Bitfield representation of the `STATUS2` register (address `0xA3`).
    #[allow(unused_parens)]
    #[bitfield]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SpectralStatus {
        #[skip]
        __: B3,
        // Analog saturation reached (bit 3).
        pub saturation_analog: bool,
        // Digital saturation reached (bit 4).
        pub saturation_digital: bool,
        #[skip]
        __: B1,
        // Spectral measurement completed (bit 6).
        pub spectral_valid: bool,
        #[skip]
        __: B1,
    }

    impl From<u8> for SpectralStatus {
        fn from(value: u8) -> Self {
            Self::from_bytes([value])
        }
    }

    impl From<SpectralStatus> for u8 {
        fn from(value: SpectralStatus) -> Self {
            value.into_bytes()[0]
        }
    }

    /// Bitfield representation of the `STATUS5` register (address `0xA6`).
    #[allow(unused_parens)]
    #[bitfield]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SmuxStatus {
        #[skip]
        __: B2,
        // SMUX operation completed (bit 2).
        pub smux_complete: bool,
        // Flicker detect interrupt (bit 3).
        pub flicker_detect: bool,
        #[skip]
        __: B4,
    }

    impl From<u8> for SmuxStatus {
        fn from(value: u8) -> Self {
            Self::from_bytes([value])
        }
    }

    impl From<SmuxStatus> for u8 {
        fn from(value: SmuxStatus) -> Self {
            value.into_bytes()[0]
        }
    }

    /// Bitfield representation of the `STATUS6` register (address `0xA7`).
    ///
    /// While `initializing` reads true the device must not be interacted
    /// with any further.
    #[allow(unused_parens)]
    #[bitfield]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DeviceStatus {
        // Device is initializing (bit 0).
        pub initializing: bool,
        // Asleep after interrupt; clear to exit sleep (bit 1).
        pub sleep_after_interrupt: bool,
        // WTIME timing error with respect to ATIME (bit 2).
        pub spectral_trigger_error: bool,
        #[skip]
        __: B2,
        // Chip temperature too high (bit 5).
        pub over_temperature: bool,
        #[skip]
        __: B1,
        // FIFO buffer overflow (bit 7).
        pub fifo_overflow: bool,
    }

    impl From<u8> for DeviceStatus {
        fn from(value: u8) -> Self {
            Self::from_bytes([value])
        }
    }

    impl From<DeviceStatus> for u8 {
        fn from(value: DeviceStatus) -> Self {
            value.into_bytes()[0]
        }
    }
}
