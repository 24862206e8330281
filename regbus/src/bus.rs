//! Register access on an open I2C bus.
//!
//! [`I2cBus`] owns a [`Controller`] and exposes byte and register operations.
//! Each operation is framed by [`transaction::build`] and submitted as a
//! single transfer through [`I2cBus::execute`].
//!
//! Operations block until the controller finishes. They take `&mut self`, so
//! sharing one bus between threads needs external locking; see
//! [`crate::shared::SharedBus`].

use std::path::Path;

use crate::bits::BitField;
use crate::config::BusConfig;
use crate::controller::Controller;
use crate::error::{Error, Result, TransferFailure};
use crate::linux::LinuxI2cDev;
use crate::register::RegisterAddress;
use crate::tracing::prelude::*;
use crate::transaction::{self, Completion, Operation, Transfer};

/// An open I2C bus.
///
/// Dropping the bus releases the device without reporting errors; call
/// [`I2cBus::close`] to observe them.
#[derive(Debug)]
pub struct I2cBus<C = LinuxI2cDev> {
    controller: C,
}

impl I2cBus<LinuxI2cDev> {
    /// Open the i2c-dev node at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(LinuxI2cDev::open(path)?))
    }

    /// Open the adapter selected by `config`.
    pub fn open_config(config: &BusConfig) -> Result<Self> {
        Self::open(config.device_path())
    }

    /// Open `/dev/i2c-{index}`.
    pub fn open_index(index: u32) -> Result<Self> {
        Self::open_config(&BusConfig::with_index(index))
    }
}

impl<C: Controller> I2cBus<C> {
    /// Wrap an already opened controller.
    pub fn new(controller: C) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    /// Release the bus.
    pub fn close(self) -> Result<()> {
        self.controller.close().map_err(Error::CloseFailed)
    }

    /// Submit `transfer` as one atomic bus operation.
    ///
    /// Either every message completes or the call fails with
    /// [`Error::TransferFailed`]; bytes from a failed read are never returned.
    /// Nothing is retried.
    pub fn execute(&mut self, mut transfer: Transfer) -> Result<Completion> {
        let slave = transfer.slave();
        let submitted = transfer.messages().len();
        trace!(
            slave = %format!("0x{:02x}", slave),
            messages = submitted,
            "Submitting transfer"
        );

        let completed = self
            .controller
            .transfer(transfer.messages_mut())
            .map_err(|err| Error::transfer(slave, TransferFailure::Status(err)))?;
        if completed != submitted {
            return Err(Error::transfer(
                slave,
                TransferFailure::Incomplete {
                    submitted,
                    completed,
                },
            ));
        }

        Ok(transfer.into_completion())
    }

    fn run(&mut self, slave: u16, operation: Operation) -> Result<Completion> {
        self.execute(transaction::build(slave, operation))
    }

    fn run_read(&mut self, slave: u16, operation: Operation) -> Result<Vec<u8>> {
        self.run(slave, operation).map(Completion::into_bytes)
    }

    /// Write a single byte to `slave` with no register address.
    pub fn write_byte(&mut self, slave: u16, byte: u8) -> Result<()> {
        self.run(slave, Operation::WriteByte(byte)).map(drop)
    }

    /// Write one byte to `register`.
    pub fn write_register_byte(
        &mut self,
        slave: u16,
        register: RegisterAddress,
        byte: u8,
    ) -> Result<()> {
        self.write_register_bytes(slave, register, &[byte])
    }

    /// Write `data` starting at `register` in one message.
    pub fn write_register_bytes(
        &mut self,
        slave: u16,
        register: RegisterAddress,
        data: &[u8],
    ) -> Result<()> {
        self.run(
            slave,
            Operation::WriteRegister {
                register,
                data: data.to_vec(),
            },
        )
        .map(drop)
    }

    /// Read a single byte from `slave` with no register address.
    pub fn read_byte(&mut self, slave: u16) -> Result<u8> {
        let data = self.run_read(slave, Operation::ReadByte)?;
        Ok(data[0])
    }

    /// Read one byte from `register`.
    pub fn read_register_byte(&mut self, slave: u16, register: RegisterAddress) -> Result<u8> {
        let data = self.read_register_bytes(slave, register, 1)?;
        Ok(data[0])
    }

    /// Read `len` bytes starting at `register`.
    ///
    /// The address write and the data read go out as one transfer, so no
    /// other transfer can slip in between them. Returns exactly `len` bytes.
    pub fn read_register_bytes(
        &mut self,
        slave: u16,
        register: RegisterAddress,
        len: usize,
    ) -> Result<Vec<u8>> {
        self.run_read(slave, Operation::ReadRegister { register, len })
    }

    /// Read the bits of `register` selected by `field`, shifted down to bit 0.
    pub fn read_register_bits(
        &mut self,
        slave: u16,
        register: RegisterAddress,
        field: BitField,
    ) -> Result<u8> {
        Ok(field.extract(self.read_register_byte(slave, register)?))
    }

    /// Replace the bits of `register` selected by `field` with `value`.
    ///
    /// This is a read followed by a write; the register may change in
    /// between if another master touches it.
    pub fn write_register_bits(
        &mut self,
        slave: u16,
        register: RegisterAddress,
        field: BitField,
        value: u8,
    ) -> Result<()> {
        let current = self.read_register_byte(slave, register)?;
        let updated = field.insert(current, value);
        self.write_register_byte(slave, register, updated)
    }

    /// Test a single bit of `register`.
    pub fn register_bit(
        &mut self,
        slave: u16,
        register: RegisterAddress,
        bit: BitField,
    ) -> Result<bool> {
        Ok(self.read_register_bits(slave, register, bit)? != 0)
    }

    /// Set a single bit of `register`.
    pub fn set_register_bit(
        &mut self,
        slave: u16,
        register: RegisterAddress,
        bit: BitField,
    ) -> Result<()> {
        self.write_register_bits(slave, register, bit, 0xff)
    }

    /// Clear a single bit of `register`.
    pub fn clear_register_bit(
        &mut self,
        slave: u16,
        register: RegisterAddress,
        bit: BitField,
    ) -> Result<()> {
        self.write_register_bits(slave, register, bit, 0)
    }
}
