#![cfg_attr(not(feature = "std"), no_std)]

mod error;
mod log;

pub mod ambient;
pub mod bus;
pub mod config;
pub mod onewire;
pub mod params;
pub mod registers;
pub mod soil;
pub mod spectrometer;

pub use crate::ambient::AmbientLight;
pub use crate::bus::{BusHandle, DeviceAddress};
pub use crate::config::{AmbientConfig, SpectrometerConfig};
pub use crate::error::{Error, Result};
pub use crate::soil::SoilProbe;
pub use crate::spectrometer::Spectrometer;
