//! Async access to a bus shared between tasks.
//!
//! Drivers written against the async [`I2c`] trait can run on a Tokio runtime
//! while the underlying [`I2cBus`] stays blocking. [`SharedBus`] serializes
//! callers with a mutex and runs each operation on the blocking thread pool,
//! so one transfer is always finished before the next one starts.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::bus::I2cBus;
use crate::controller::Controller;
use crate::error::{Error, Result, TransferFailure};
use crate::register::RegisterAddress;

/// I2C register access for async drivers.
#[async_trait]
pub trait I2c: Send + Sync {
    /// Write a single byte with no register address.
    async fn write_byte(&mut self, slave: u16, byte: u8) -> Result<()>;

    /// Read a single byte with no register address.
    async fn read_byte(&mut self, slave: u16) -> Result<u8>;

    /// Write `data` starting at `register`.
    async fn write_register(
        &mut self,
        slave: u16,
        register: RegisterAddress,
        data: &[u8],
    ) -> Result<()>;

    /// Read `len` bytes starting at `register`.
    async fn read_register(
        &mut self,
        slave: u16,
        register: RegisterAddress,
        len: usize,
    ) -> Result<Vec<u8>>;
}

/// Cloneable handle to a bus behind a mutex.
pub struct SharedBus<C> {
    inner: Arc<Mutex<I2cBus<C>>>,
}

impl<C> Clone for SharedBus<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Controller + Send + 'static> SharedBus<C> {
    pub fn new(bus: I2cBus<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(bus)),
        }
    }

    /// Run `f` with exclusive access to the bus on the blocking pool.
    ///
    /// `slave` is only used to label the error if the worker dies.
    pub async fn with_bus<T, F>(&self, slave: u16, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut I2cBus<C>) -> Result<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let worker = tokio::task::spawn_blocking(move || {
            // A panic mid-transfer leaves no partial state in the bus itself
            let mut bus = inner.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut *bus)
        });

        match worker.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => Err(Error::transfer(slave, TransferFailure::Aborted)),
        }
    }

    /// Take the bus back, if this is the last handle.
    pub fn try_unwrap(self) -> std::result::Result<I2cBus<C>, Self> {
        Arc::try_unwrap(self.inner)
            .map(|mutex| mutex.into_inner().unwrap_or_else(PoisonError::into_inner))
            .map_err(|inner| Self { inner })
    }
}

#[async_trait]
impl<C: Controller + Send + 'static> I2c for SharedBus<C> {
    async fn write_byte(&mut self, slave: u16, byte: u8) -> Result<()> {
        self.with_bus(slave, move |bus| bus.write_byte(slave, byte)).await
    }

    async fn read_byte(&mut self, slave: u16) -> Result<u8> {
        self.with_bus(slave, move |bus| bus.read_byte(slave)).await
    }

    async fn write_register(
        &mut self,
        slave: u16,
        register: RegisterAddress,
        data: &[u8],
    ) -> Result<()> {
        let data = data.to_vec();
        self.with_bus(slave, move |bus| bus.write_register_bytes(slave, register, &data))
            .await
    }

    async fn read_register(
        &mut self,
        slave: u16,
        register: RegisterAddress,
        len: usize,
    ) -> Result<Vec<u8>> {
        self.with_bus(slave, move |bus| bus.read_register_bytes(slave, register, len))
            .await
    }
}
