//! Transaction framing.
//!
//! [`build`] turns an [`Operation`] into the [`Transfer`] that carries it on
//! the bus. It performs no I/O, so the buffer layout for every operation can be
//! checked without hardware.
//!
//! ```text
//! write byte:      [W data]
//! read byte:       [R 1]
//! write register:  [W addr.. data..]
//! read register:   [W addr..] [R len]     (one transfer, repeated start)
//! ```

use crate::register::RegisterAddress;

/// Direction of a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Write,
    Read,
}

/// One addressed segment of a transfer.
///
/// The message owns its buffer. For writes it holds the bytes to send; for
/// reads it is sized to the requested length and filled by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    slave: u16,
    direction: Direction,
    buffer: Vec<u8>,
}

impl Message {
    /// A write message carrying `data`.
    pub fn write(slave: u16, data: Vec<u8>) -> Self {
        Self {
            slave,
            direction: Direction::Write,
            buffer: data,
        }
    }

    /// A read message of `len` bytes.
    pub fn read(slave: u16, len: usize) -> Self {
        Self {
            slave,
            direction: Direction::Read,
            buffer: vec![0; len],
        }
    }

    pub fn slave(&self) -> u16 {
        self.slave
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_read(&self) -> bool {
        self.direction == Direction::Read
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Buffer for the controller to fill on reads.
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    fn into_buffer(self) -> Vec<u8> {
        self.buffer
    }
}

/// What the caller wants done on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Write one byte with no register address.
    WriteByte(u8),
    /// Read one byte with no register address.
    ReadByte,
    /// Write `data` starting at `register`.
    WriteRegister {
        register: RegisterAddress,
        data: Vec<u8>,
    },
    /// Read `len` bytes starting at `register`.
    ReadRegister {
        register: RegisterAddress,
        len: usize,
    },
}

/// Messages submitted together without releasing the bus in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    slave: u16,
    messages: Vec<Message>,
    read_len: Option<usize>,
}

impl Transfer {
    /// Slave address every message in this transfer targets.
    pub fn slave(&self) -> u16 {
        self.slave
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn messages_mut(&mut self) -> &mut [Message] {
        &mut self.messages
    }

    /// Number of bytes the caller asked to read, `None` for writes.
    pub fn read_len(&self) -> Option<usize> {
        self.read_len
    }

    /// Consume a completed transfer and hand back its result.
    pub(crate) fn into_completion(self) -> Completion {
        let Some(len) = self.read_len else {
            return Completion::Written;
        };

        let mut data = self
            .messages
            .into_iter()
            .rev()
            .find(Message::is_read)
            .map(Message::into_buffer)
            .unwrap_or_default();
        data.truncate(len);
        Completion::Read(data)
    }
}

/// Successful outcome of executing a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// A write finished.
    Written,
    /// A read finished with exactly the requested bytes.
    Read(Vec<u8>),
}

impl Completion {
    /// Bytes read, empty for writes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Written => Vec::new(),
            Self::Read(data) => data,
        }
    }
}

/// Frame `operation` for `slave`.
pub fn build(slave: u16, operation: Operation) -> Transfer {
    let (messages, read_len) = match operation {
        Operation::WriteByte(byte) => (vec![Message::write(slave, vec![byte])], None),
        Operation::ReadByte => (vec![Message::read(slave, 1)], Some(1)),
        Operation::WriteRegister { register, data } => {
            let mut buf = Vec::with_capacity(register.width().byte_count() + data.len());
            register.encode_into(&mut buf);
            buf.extend_from_slice(&data);
            (vec![Message::write(slave, buf)], None)
        }
        Operation::ReadRegister { register, len } => (
            vec![
                Message::write(slave, register.to_bytes()),
                Message::read(slave, len),
            ],
            Some(len),
        ),
    };

    Transfer {
        slave,
        messages,
        read_len,
    }
}
