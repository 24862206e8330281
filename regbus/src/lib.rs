//! Register access over Linux I2C character devices.
//!
//! Higher-level drivers (touch controllers, sensors, port expanders) use this
//! crate to read and write numbered registers without framing bus
//! transactions themselves.
//!
//! ```no_run
//! use regbus::{I2cBus, RegisterAddress};
//!
//! # fn main() -> regbus::Result<()> {
//! let mut bus = I2cBus::open_index(1)?;
//! bus.write_register_byte(0x50, RegisterAddress::bits8(0x10), 0xab)?;
//! let id = bus.read_register_bytes(0x50, RegisterAddress::bits16(0x1234), 3)?;
//! bus.close()?;
//! # let _ = id;
//! # Ok(())
//! # }
//! ```
//!
//! Register reads are submitted as a single two-message transfer (address
//! write, repeated start, data read) so nothing can interleave between the two
//! phases. Register writes are a single message of address bytes followed by
//! data. 16-bit register addresses go out most significant byte first.

pub mod bits;
pub mod bus;
pub mod config;
pub mod controller;
pub mod error;
pub mod linux;
pub mod register;
pub mod shared;
pub mod sim;
pub mod tracing;
pub mod transaction;

pub use bits::BitField;
pub use bus::I2cBus;
pub use config::BusConfig;
pub use controller::Controller;
pub use error::{Error, ErrorKind, Result, TransferFailure};
pub use linux::LinuxI2cDev;
pub use register::{RegisterAddress, RegisterWidth};
pub use shared::{I2c, SharedBus};
pub use transaction::{Completion, Direction, Message, Operation, Transfer};
