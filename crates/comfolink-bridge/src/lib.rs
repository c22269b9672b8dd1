//! Bridge between a ComfoConnect PRO on Modbus-TCP and the entity registry.
//!
//! - **config**: TOML file with environment fallback
//! - **modbus**: `tokio-modbus` transport
//! - **simulator**: in-memory device for running without hardware
//! - **poller**: envelope-batched reads into snapshots, and point writes

pub mod config;
pub mod error;
pub mod modbus;
pub mod poller;
pub mod simulator;

pub use config::{BridgeConfig, DeviceConfig};
pub use error::{BridgeError, BridgeResult};
pub use modbus::TcpTransport;
pub use poller::{chunk_range, Poller, Snapshot};
pub use simulator::SimulatedDevice;
