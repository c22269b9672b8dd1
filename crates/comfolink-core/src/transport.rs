//! Register transport seam.
//!
//! The core never talks to a device itself. Anything that can read and write
//! Modbus registers (a TCP client, a simulator, a test double) implements
//! [`RegisterTransport`]; errors are handed back to the caller untouched.

use async_trait::async_trait;

use crate::error::CommunicationResult;
use crate::point::RegisterClass;

#[async_trait]
pub trait RegisterTransport: Send {
    /// Read `count` consecutive words from an input or holding register block.
    async fn read_words(
        &mut self,
        class: RegisterClass,
        start: u16,
        count: u16,
    ) -> CommunicationResult<Vec<u16>>;

    /// Read `count` consecutive bits from a coil or discrete input block.
    async fn read_bits(
        &mut self,
        class: RegisterClass,
        start: u16,
        count: u16,
    ) -> CommunicationResult<Vec<bool>>;

    /// Write one holding register.
    async fn write_word(&mut self, address: u16, value: u16) -> CommunicationResult<()>;

    /// Write one coil.
    async fn write_bit(&mut self, address: u16, value: bool) -> CommunicationResult<()>;

    /// Write consecutive holding registers.
    ///
    /// The default issues one single-register write per word, so a multi-word
    /// value is not written atomically.
    async fn write_words(&mut self, address: u16, values: &[u16]) -> CommunicationResult<()> {
        for (offset, value) in values.iter().enumerate() {
            self.write_word(address.wrapping_add(offset as u16), *value).await?;
        }
        Ok(())
    }
}
