//! In-process bus simulation.
//!
//! [`SimulatedBus`] behaves like a bus populated with simple register-pointer
//! devices, the kind most sensors and port expanders are: a write sets the
//! register pointer from its leading address bytes and stores any remaining
//! bytes at successive registers; a read returns bytes from the pointer
//! onward. The pointer auto-increments in both cases.
//!
//! Useful for testing drivers built on [`crate::bus::I2cBus`] without
//! hardware.

use std::collections::HashMap;
use std::io;

use crate::controller::Controller;
use crate::register::RegisterWidth;
use crate::tracing::prelude::*;
use crate::transaction::Message;

/// One simulated peripheral.
#[derive(Debug, Clone)]
pub struct SimDevice {
    width: RegisterWidth,
    registers: HashMap<u16, u8>,
    pointer: u16,
}

impl SimDevice {
    /// A device whose register address takes `width`.
    pub fn new(width: RegisterWidth) -> Self {
        Self {
            width,
            registers: HashMap::new(),
            pointer: 0,
        }
    }

    /// Current value of `register`. Unwritten registers read as zero.
    pub fn register(&self, register: u16) -> u8 {
        self.registers.get(&register).copied().unwrap_or(0)
    }

    /// Preload `register` with `value`.
    pub fn set_register(&mut self, register: u16, value: u8) {
        self.registers.insert(register, value);
    }

    /// Current register pointer.
    pub fn pointer(&self) -> u16 {
        self.pointer
    }

    fn apply(&mut self, message: &mut Message) {
        if message.is_read() {
            for byte in message.buffer_mut() {
                *byte = self.register(self.pointer);
                self.advance();
            }
            return;
        }

        let buffer = message.buffer();
        let address_len = self.width.byte_count().min(buffer.len());
        let (address, data) = buffer.split_at(address_len);
        match *address {
            [lo] => self.pointer = match self.width {
                RegisterWidth::Bits8 => u16::from(lo),
                // Half an address: only the high byte arrived
                RegisterWidth::Bits16 => u16::from(lo) << 8,
            },
            [hi, lo] => self.pointer = u16::from_be_bytes([hi, lo]),
            _ => {}
        }
        for &byte in data {
            self.registers.insert(self.pointer, byte);
            self.advance();
        }
    }

    fn advance(&mut self) {
        self.pointer = match self.width {
            RegisterWidth::Bits8 => u16::from((self.pointer as u8).wrapping_add(1)),
            RegisterWidth::Bits16 => self.pointer.wrapping_add(1),
        };
    }
}

/// Simulated bus controller.
#[derive(Debug, Default)]
pub struct SimulatedBus {
    devices: HashMap<u16, SimDevice>,
    history: Vec<Vec<Message>>,
    fail_next: Option<i32>,
    complete_next: Option<usize>,
    fail_close: Option<i32>,
}

impl SimulatedBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a device at `slave`, replacing any existing one.
    pub fn attach(&mut self, slave: u16, device: SimDevice) -> &mut Self {
        self.devices.insert(slave, device);
        self
    }

    pub fn device(&self, slave: u16) -> Option<&SimDevice> {
        self.devices.get(&slave)
    }

    pub fn device_mut(&mut self, slave: u16) -> Option<&mut SimDevice> {
        self.devices.get_mut(&slave)
    }

    /// Make the next transfer fail with OS error `errno`.
    pub fn fail_next(&mut self, errno: i32) {
        self.fail_next = Some(errno);
    }

    /// Make the next transfer report only `completed` messages done.
    pub fn complete_only_next(&mut self, completed: usize) {
        self.complete_next = Some(completed);
    }

    /// Make [`Controller::close`] fail with OS error `errno`.
    pub fn fail_close(&mut self, errno: i32) {
        self.fail_close = Some(errno);
    }

    /// Every transfer submitted so far, as it was submitted.
    pub fn history(&self) -> &[Vec<Message>] {
        &self.history
    }
}

impl Controller for SimulatedBus {
    fn transfer(&mut self, messages: &mut [Message]) -> io::Result<usize> {
        self.history.push(messages.to_vec());

        if let Some(errno) = self.fail_next.take() {
            return Err(io::Error::from_raw_os_error(errno));
        }

        // Nothing is applied unless every addressed device is present
        if let Some(missing) = messages
            .iter()
            .find(|message| !self.devices.contains_key(&message.slave()))
        {
            trace!(slave = missing.slave(), "No device acknowledged");
            return Err(io::Error::from_raw_os_error(libc::ENXIO));
        }

        for message in messages.iter_mut() {
            if let Some(device) = self.devices.get_mut(&message.slave()) {
                device.apply(message);
            }
        }

        Ok(self.complete_next.take().unwrap_or(messages.len()))
    }

    fn close(self) -> io::Result<()> {
        match self.fail_close {
            Some(errno) => Err(io::Error::from_raw_os_error(errno)),
            None => Ok(()),
        }
    }
}
