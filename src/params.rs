//! Strongly typed parameter enumerations for the sensor suite.
//!
//! These enums map directly to datasheet field encodings and are used across
//! [`AmbientConfig`](crate::config::AmbientConfig) and
//! [`SpectrometerConfig`](crate::config::SpectrometerConfig). Prefer these
//! types over raw integers to keep configuration values valid and explicit.

use modular_bitfield::prelude::Specifier;

/// Ambient-light analog gain selections (`ALS_CONF.ALS_GAIN`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[repr(u8)]
#[bits = 2]
pub enum AlsGain {
    /// 1x gain.
    X1 = 0b00,
    /// 2x gain.
    X2 = 0b01,
    /// 1/8 gain.
    Eighth = 0b10,
    /// 1/4 gain.
    Quarter = 0b11,
}

impl AlsGain {
    /// Returns the gain as a multiplier.
    pub const fn multiplier(self) -> f32 {
        match self {
            Self::X1 => 1.0,
            Self::X2 => 2.0,
            Self::Eighth => 0.125,
            Self::Quarter => 0.25,
        }
    }
}

/// Ambient-light integration time selections (`ALS_CONF.ALS_IT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[repr(u8)]
#[bits = 4]
pub enum AlsIntegration {
    /// 25 ms integration time.
    Ms25 = 0b1100,
    /// 50 ms integration time.
    Ms50 = 0b1000,
    /// 100 ms integration time.
    Ms100 = 0b0000,
    /// 200 ms integration time.
    Ms200 = 0b0001,
    /// 400 ms integration time.
    Ms400 = 0b0010,
    /// 800 ms integration time.
    Ms800 = 0b0011,
}

impl AlsIntegration {
    /// Returns the integration time in milliseconds.
    pub const fn millis(self) -> u16 {
        match self {
            Self::Ms25 => 25,
            Self::Ms50 => 50,
            Self::Ms100 => 100,
            Self::Ms200 => 200,
            Self::Ms400 => 400,
            Self::Ms800 => 800,
        }
    }
}

/// Ambient-light interrupt persistence selections (`ALS_CONF.ALS_PERS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[repr(u8)]
#[bits = 2]
pub enum AlsPersistence {
    /// Every out-of-threshold sample fires the interrupt.
    One = 0b00,
    /// Two consecutive samples required.
    Two = 0b01,
    /// Four consecutive samples required.
    Four = 0b10,
    /// Eight consecutive samples required.
    Eight = 0b11,
}

impl AlsPersistence {
    /// Returns the number of consecutive samples required.
    pub const fn samples(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
            Self::Eight => 8,
        }
    }
}

/// Spectral ADC gain selections written to `CFG1.AGAIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Gain {
    /// 0.5x gain.
    Half = 0x00,
    /// 1x gain.
    X1 = 0x01,
    /// 2x gain.
    X2 = 0x02,
    /// 4x gain.
    X4 = 0x03,
    /// 8x gain.
    X8 = 0x04,
    /// 16x gain.
    X16 = 0x05,
    /// 32x gain.
    X32 = 0x06,
    /// 64x gain.
    X64 = 0x07,
    /// 128x gain.
    X128 = 0x08,
    /// 256x gain.
    X256 = 0x09,
    /// 512x gain.
    X512 = 0x0A,
}

impl Gain {
    /// Returns the raw `CFG1` field encoding.
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Returns the gain as a multiplier.
    pub const fn multiplier(self) -> f32 {
        match self {
            Self::Half => 0.5,
            Self::X1 => 1.0,
            Self::X2 => 2.0,
            Self::X4 => 4.0,
            Self::X8 => 8.0,
            Self::X16 => 16.0,
            Self::X32 => 32.0,
            Self::X64 => 64.0,
            Self::X128 => 128.0,
            Self::X256 => 256.0,
            Self::X512 => 512.0,
        }
    }
}
