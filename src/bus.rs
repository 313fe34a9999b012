//! Shared-bus ownership and the register transaction primitives built on it.
//!
//! [`BusHandle`] owns the two-wire transport for the whole sensor suite and
//! serializes every access to it; drivers hold a shared reference and go
//! through [`BusHandle::with_exclusive_access`] (or the single-operation
//! conveniences wrapping it). The [`BusGuard`] handed to the closure is the
//! only type carrying the raw transaction primitives, so a multi-step
//! register sequence cannot accidentally release the bus between steps.

use embedded_hal::i2c::{I2c, Operation};

/// A 7-bit slave address on the shared bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceAddress(u8);

impl DeviceAddress {
    /// Wraps a 7-bit address. The top bit is masked off.
    pub const fn new(address: u8) -> Self {
        Self(address & 0x7F)
    }

    /// Returns the raw 7-bit address.
    pub const fn raw(self) -> u8 {
        self.0
    }
}

/// Owns the shared bus transport and serializes all access to it.
///
/// At most one transaction is in flight at any instant: selecting a slave
/// address and transferring to it always happen inside one exclusive region.
#[cfg(feature = "std")]
pub struct BusHandle<I2C> {
    bus: std::sync::Mutex<I2C>,
}

/// Owns the shared bus transport and serializes all access to it.
///
/// At most one transaction is in flight at any instant: selecting a slave
/// address and transferring to it always happen inside one exclusive region.
#[cfg(not(feature = "std"))]
pub struct BusHandle<I2C> {
    bus: critical_section::Mutex<core::cell::RefCell<I2C>>,
}

#[cfg(feature = "std")]
impl<I2C> BusHandle<I2C> {
    /// Takes ownership of the transport.
    pub fn new(bus: I2C) -> Self {
        Self {
            bus: std::sync::Mutex::new(bus),
        }
    }

    /// Runs `f` with guaranteed serialization against every other caller on
    /// this handle. A poisoned lock is recovered: the bus controller holds no
    /// state worth preserving across a panicked critical section.
    pub fn with_exclusive_access<R>(&self, f: impl FnOnce(&mut BusGuard<'_, I2C>) -> R) -> R {
        let mut bus = self
            .bus
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut BusGuard { bus: &mut *bus })
    }

    /// Consumes the handle and returns the owned transport.
    pub fn release(self) -> I2C {
        self.bus
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(not(feature = "std"))]
impl<I2C> BusHandle<I2C> {
    /// Takes ownership of the transport.
    pub fn new(bus: I2C) -> Self {
        Self {
            bus: critical_section::Mutex::new(core::cell::RefCell::new(bus)),
        }
    }

    /// Runs `f` with guaranteed serialization against every other caller on
    /// this handle.
    pub fn with_exclusive_access<R>(&self, f: impl FnOnce(&mut BusGuard<'_, I2C>) -> R) -> R {
        critical_section::with(|cs| {
            let mut bus = self.bus.borrow_ref_mut(cs);
            f(&mut BusGuard { bus: &mut *bus })
        })
    }

    /// Consumes the handle and returns the owned transport.
    pub fn release(self) -> I2C {
        self.bus.into_inner().into_inner()
    }
}

impl<I2C: I2c> BusHandle<I2C> {
    /// Writes `[register, value]` to `device` as one message.
    pub fn write_register(
        &self,
        device: DeviceAddress,
        register: u8,
        value: u8,
    ) -> Result<(), I2C::Error> {
        self.with_exclusive_access(|bus| bus.write_register(device, register, value))
    }

    /// Updates a 16-bit latched register pair, low byte strictly first, in
    /// one exclusive region.
    ///
    /// This is the only correct way to touch such a register: performing the
    /// two writes under independently acquired locks lets another message
    /// interpose and corrupts the device's internal latch.
    pub fn write_latched_pair(
        &self,
        device: DeviceAddress,
        low_register: u8,
        low_value: u8,
        high_register: u8,
        high_value: u8,
    ) -> Result<(), I2C::Error> {
        self.with_exclusive_access(|bus| {
            bus.write_latched_pair(device, low_register, low_value, high_register, high_value)
        })
    }

    /// Writes a raw command burst to `device` as one message.
    pub fn write_raw(&self, device: DeviceAddress, bytes: &[u8]) -> Result<(), I2C::Error> {
        self.with_exclusive_access(|bus| bus.write_raw(device, bytes))
    }

    /// Reads `buf.len()` bytes from `device` without an address phase.
    pub fn read_raw(&self, device: DeviceAddress, buf: &mut [u8]) -> Result<(), I2C::Error> {
        self.with_exclusive_access(|bus| bus.read_raw(device, buf))
    }

    /// Two-phase register read executed atomically under exclusive access.
    pub fn read_registers(
        &self,
        device: DeviceAddress,
        register: u8,
        buf: &mut [u8],
    ) -> Result<(), I2C::Error> {
        self.with_exclusive_access(|bus| bus.read_registers(device, register, buf))
    }

    /// Reads a single register byte.
    pub fn read_register(&self, device: DeviceAddress, register: u8) -> Result<u8, I2C::Error> {
        self.with_exclusive_access(|bus| bus.read_register(device, register))
    }
}

/// Exclusive view of the transport inside a [`BusHandle::with_exclusive_access`]
/// region. Every register transaction primitive lives here.
pub struct BusGuard<'a, I2C> {
    bus: &'a mut I2C,
}

impl<I2C: I2c> BusGuard<'_, I2C> {
    /// Writes `[register, value]` to `device` as one message.
    pub fn write_register(
        &mut self,
        device: DeviceAddress,
        register: u8,
        value: u8,
    ) -> Result<(), I2C::Error> {
        self.bus.write(device.raw(), &[register, value])
    }

    /// Writes a 16-bit latched register pair, low byte strictly first, with
    /// no other message interposed.
    pub fn write_latched_pair(
        &mut self,
        device: DeviceAddress,
        low_register: u8,
        low_value: u8,
        high_register: u8,
        high_value: u8,
    ) -> Result<(), I2C::Error> {
        self.write_register(device, low_register, low_value)?;
        self.write_register(device, high_register, high_value)
    }

    /// Writes a raw command burst as one message.
    pub fn write_raw(&mut self, device: DeviceAddress, bytes: &[u8]) -> Result<(), I2C::Error> {
        self.bus.write(device.raw(), bytes)
    }

    /// Reads `buf.len()` bytes without an address phase.
    pub fn read_raw(&mut self, device: DeviceAddress, buf: &mut [u8]) -> Result<(), I2C::Error> {
        self.bus.read(device.raw(), buf)
    }

    /// Two-phase register read: a 1-byte write of the register address,
    /// immediately followed by the data read, with no stop in between.
    ///
    /// Reading a register on this device family without the preceding
    /// pointer write yields undefined contents. On failure no partial
    /// result is returned; `buf` contents are unspecified.
    pub fn read_registers(
        &mut self,
        device: DeviceAddress,
        register: u8,
        buf: &mut [u8],
    ) -> Result<(), I2C::Error> {
        let pointer = [register];
        let mut operations = [Operation::Write(&pointer), Operation::Read(buf)];
        self.bus.transaction(device.raw(), &mut operations)
    }

    /// Reads a single register byte via the two-phase transaction.
    pub fn read_register(
        &mut self,
        device: DeviceAddress,
        register: u8,
    ) -> Result<u8, I2C::Error> {
        let mut value = [0u8; 1];
        self.read_registers(device, register, &mut value)?;
        Ok(value[0])
    }
}
