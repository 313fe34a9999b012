//! Error handling primitives shared by every driver in the suite.

/// Crate-wide result type alias.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Error variants produced by the drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Any transfer failure reported by the underlying bus: device absent,
    /// bus busy, wiring fault.
    Bus(E),
    /// A configuration step failed, leaving the device in an indeterminate
    /// sub-state. Partial configuration must not be assumed usable.
    Configuration(E),
    /// Measurement readiness was never observed within the polling budget.
    MeasurementTimeout,
    /// The provided configuration parameters are invalid.
    InvalidConfig,
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Self::Bus(err)
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus(err) => write!(f, "bus transfer failed: {err:?}"),
            Self::Configuration(err) => {
                write!(f, "configuration sequence aborted: {err:?}")
            }
            Self::MeasurementTimeout => {
                write!(f, "measurement readiness was never observed")
            }
            Self::InvalidConfig => write!(f, "invalid configuration parameters"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for Error<E> {}
