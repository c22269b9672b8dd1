//! Register-description compiler for the Zehnder ComfoConnect PRO
//!
//! This crate turns declarative Modbus register metadata into typed entity
//! descriptors for a home-automation platform.
//!
//! ## Architecture
//!
//! - **Register Map**: static table of point definitions, the source of truth
//! - **Classifier**: point → one of six entity categories
//! - **Descriptor Builder**: point + category → fully populated descriptor
//! - **Registry**: category tables plus the address envelope per register class
//! - **Codec**: raw register words ↔ physical values
//!
//! Device I/O is not part of this crate. Transports implement
//! [`RegisterTransport`] and live in the bridge.

pub mod classify;
pub mod codec;
pub mod descriptor;
pub mod error;
pub mod point;
pub mod register_map;
pub mod registry;
pub mod transport;
pub mod units;

pub use classify::{classify, EntityCategory};
pub use codec::{
    decode, decode_words, encode, encode_words, parse_value, raw_to_words, words_to_raw,
    PointValue,
};
pub use descriptor::{build_descriptor, ClimateFeature, EntityDescriptor, NumberMode};
pub use error::{
    ClassificationGap, CommunicationError, CommunicationResult, DefinitionError, DefinitionResult,
    DescriptorError, ValueError, ValueResult,
};
pub use point::{
    AddressRange, Bounds, DataType, EnumOption, PlatformOverride, PointDefinition, RegisterClass,
    SwitchMap, ValueEnum,
};
pub use registry::{CategoryTable, Registry, RegistryCell};
pub use transport::RegisterTransport;
pub use units::{map_unit, Aggregation, Quantity, UnitMapping};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
