//! Bus controller abstraction.
//!
//! A [`Controller`] is whatever actually moves messages on the wire: the
//! kernel's i2c-dev interface ([`crate::linux::LinuxI2cDev`]) or the in-process
//! [`crate::sim::SimulatedBus`]. [`crate::bus::I2cBus`] is generic over it.

use std::io;

use crate::transaction::Message;

pub trait Controller {
    /// Submit `messages` as one combined transfer.
    ///
    /// The bus must not be released between messages. Read messages are
    /// filled in place. Returns the number of messages the controller reports
    /// as completed.
    fn transfer(&mut self, messages: &mut [Message]) -> io::Result<usize>;

    /// Release the controller, reporting any error from doing so.
    fn close(self) -> io::Result<()>
    where
        Self: Sized;
}
