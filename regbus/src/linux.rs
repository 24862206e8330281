//! Linux i2c-dev controller.
//!
//! Transfers go through the `I2C_RDWR` ioctl, which hands the kernel every
//! message of a transfer at once. The adapter driver issues them with repeated
//! starts and holds the bus lock for the whole sequence, which is what keeps a
//! register read's address phase and data phase back to back.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::{AsRawFd, IntoRawFd};
use std::path::Path;

use crate::controller::Controller;
use crate::error::{Error, Result};
use crate::tracing::prelude::*;
use crate::transaction::Message;

// From <linux/i2c-dev.h> and <linux/i2c.h>
const I2C_RDWR: libc::c_ulong = 0x0707;
const I2C_M_RD: u16 = 0x0001;

#[repr(C)]
struct I2cMsg {
    addr: u16,
    flags: u16,
    len: u16,
    buf: *mut u8,
}

#[repr(C)]
struct I2cRdwrIoctlData {
    msgs: *mut I2cMsg,
    nmsgs: u32,
}

/// An open `/dev/i2c-N` node.
#[derive(Debug)]
pub struct LinuxI2cDev {
    file: File,
}

impl LinuxI2cDev {
    /// Open the device node for reading and writing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| Error::OpenFailed {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(path = %path.display(), fd = file.as_raw_fd(), "Opened I2C device");
        Ok(Self { file })
    }
}

impl Controller for LinuxI2cDev {
    fn transfer(&mut self, messages: &mut [Message]) -> io::Result<usize> {
        let mut raw = messages
            .iter_mut()
            .map(|message| -> io::Result<I2cMsg> {
                let len = u16::try_from(message.len()).map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("message of {} bytes exceeds i2c_msg length", message.len()),
                    )
                })?;
                Ok(I2cMsg {
                    addr: message.slave(),
                    flags: if message.is_read() { I2C_M_RD } else { 0 },
                    len,
                    buf: message.buffer_mut().as_mut_ptr(),
                })
            })
            .collect::<io::Result<Vec<_>>>()?;

        let nmsgs = u32::try_from(raw.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many messages"))?;
        let mut data = I2cRdwrIoctlData {
            msgs: raw.as_mut_ptr(),
            nmsgs,
        };

        // SAFETY: every `buf` points into a message buffer that outlives this
        // call and is at least `len` bytes long; the kernel writes only into
        // buffers flagged I2C_M_RD.
        let status = unsafe { libc::ioctl(self.file.as_raw_fd(), I2C_RDWR as _, &mut data) };
        if status < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(status as usize)
    }

    fn close(self) -> io::Result<()> {
        let fd = self.file.into_raw_fd();
        // SAFETY: `fd` was just released from the `File`, so nothing else
        // owns or closes it.
        if unsafe { libc::close(fd) } < 0 {
            return Err(io::Error::last_os_error());
        }
        debug!(fd, "Closed I2C device");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn open_missing_node_fails() {
        let err = LinuxI2cDev::open("/dev/i2c-does-not-exist").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OpenFailed);
        assert_eq!(err.status_code(), Some(libc::ENOENT));
    }

    #[test]
    fn open_then_close() {
        let dev = LinuxI2cDev::open("/dev/null").unwrap();
        dev.close().unwrap();
    }

    #[test]
    fn transfer_on_non_i2c_node_reports_status() {
        let mut dev = LinuxI2cDev::open("/dev/null").unwrap();
        let mut messages = [Message::write(0x50, vec![0x00])];
        let err = dev.transfer(&mut messages).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::ENOTTY));
    }

    #[test]
    fn oversized_message_is_rejected_before_submission() {
        let mut dev = LinuxI2cDev::open("/dev/null").unwrap();
        let mut messages = [Message::write(0x50, vec![0; usize::from(u16::MAX) + 1])];
        let err = dev.transfer(&mut messages).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
