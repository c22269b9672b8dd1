//! Modbus-TCP transport built on `tokio-modbus`.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio_modbus::client::Context;
use tokio_modbus::prelude::*;
use tracing::{debug, info};

use comfolink_core::{CommunicationError, CommunicationResult, RegisterClass, RegisterTransport};

use crate::config::DeviceConfig;
use crate::error::BridgeResult;

/// A connected Modbus-TCP client.
pub struct TcpTransport {
    ctx: Context,
    addr: SocketAddr,
    timeout: Duration,
}

impl TcpTransport {
    /// Resolve the configured host and connect.
    pub async fn connect(config: &DeviceConfig) -> BridgeResult<Self> {
        let host = config.require_host()?;
        let addr = tokio::net::lookup_host((host, config.port))
            .await
            .map_err(|e| CommunicationError::Connect(format!("{}: {}", host, e)))?
            .next()
            .ok_or_else(|| CommunicationError::Connect(format!("{}: no address", host)))?;

        let connect = tcp::connect_slave(addr, Slave(config.unit_id));
        let ctx = tokio::time::timeout(config.timeout(), connect)
            .await
            .map_err(|_| CommunicationError::Timeout)?
            .map_err(|e| CommunicationError::Connect(format!("{}: {}", addr, e)))?;

        info!(addr = %addr, unit_id = config.unit_id, "Connected to Modbus device");
        Ok(Self {
            ctx,
            addr,
            timeout: config.timeout(),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

/// Flatten the timeout, transport and exception layers of a request.
async fn request<T, E, F>(timeout: Duration, fut: F) -> CommunicationResult<T>
where
    F: Future<Output = Result<Result<T, E>, tokio_modbus::Error>>,
    E: std::fmt::Debug,
{
    match tokio::time::timeout(timeout, fut).await {
        Err(_) => Err(CommunicationError::Timeout),
        Ok(Err(tokio_modbus::Error::Transport(e))) => Err(CommunicationError::Io(e)),
        Ok(Err(e)) => Err(CommunicationError::Protocol(e.to_string())),
        Ok(Ok(Err(code))) => Err(CommunicationError::Exception(format!("{:?}", code))),
        Ok(Ok(Ok(value))) => Ok(value),
    }
}

#[async_trait]
impl RegisterTransport for TcpTransport {
    async fn read_words(
        &mut self,
        class: RegisterClass,
        start: u16,
        count: u16,
    ) -> CommunicationResult<Vec<u16>> {
        debug!(class = %class, start, count, "Reading registers");
        match class {
            RegisterClass::InputRegister => {
                request(self.timeout, self.ctx.read_input_registers(start, count)).await
            }
            RegisterClass::HoldingRegister => {
                request(self.timeout, self.ctx.read_holding_registers(start, count)).await
            }
            other => Err(CommunicationError::Unsupported(format!("word read from {}", other))),
        }
    }

    async fn read_bits(
        &mut self,
        class: RegisterClass,
        start: u16,
        count: u16,
    ) -> CommunicationResult<Vec<bool>> {
        debug!(class = %class, start, count, "Reading bits");
        match class {
            RegisterClass::Coil => request(self.timeout, self.ctx.read_coils(start, count)).await,
            RegisterClass::DiscreteInput => {
                request(self.timeout, self.ctx.read_discrete_inputs(start, count)).await
            }
            other => Err(CommunicationError::Unsupported(format!("bit read from {}", other))),
        }
    }

    async fn write_word(&mut self, address: u16, value: u16) -> CommunicationResult<()> {
        debug!(address, value, "Writing holding register");
        request(self.timeout, self.ctx.write_single_register(address, value)).await
    }

    async fn write_bit(&mut self, address: u16, value: bool) -> CommunicationResult<()> {
        debug!(address, value, "Writing coil");
        request(self.timeout, self.ctx.write_single_coil(address, value)).await
    }
}
