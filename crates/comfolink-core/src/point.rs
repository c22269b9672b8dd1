//! Point definitions: the declarative description of one register, coil or bit.
//!
//! A [`PointDefinition`] is a typed record with optional fields. Constructors
//! pick the register class, `with_*` methods fill in the rest:
//!
//! ```text
//! PointDefinition::input_register("room_temperature", 7, DataType::Int16)
//!     .with_name("Room Air Temperature")
//!     .with_scale(0.1)
//!     .with_unit("°C")
//! ```
//!
//! Addresses are zero-based. Device documentation numbers registers from one,
//! so every address taken from a manual is entered minus one.

use serde::{Deserialize, Serialize};

use crate::descriptor::ClimateFeature;
use crate::error::{DefinitionError, DefinitionResult};

/// Modbus register class (addressable space).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterClass {
    /// Coil (read-write, 1 bit)
    Coil,
    /// Discrete Input (read-only, 1 bit)
    DiscreteInput,
    /// Input Register (read-only, 16 bits)
    InputRegister,
    /// Holding Register (read-write, 16 bits)
    HoldingRegister,
}

impl RegisterClass {
    /// All register classes, in a fixed order.
    pub const ALL: [RegisterClass; 4] = [
        RegisterClass::InputRegister,
        RegisterClass::DiscreteInput,
        RegisterClass::HoldingRegister,
        RegisterClass::Coil,
    ];

    /// Single-bit classes carry booleans.
    pub fn is_bit(&self) -> bool {
        matches!(self, Self::Coil | Self::DiscreteInput)
    }

    /// Whether the hardware allows writes to this class at all.
    pub fn is_writable(&self) -> bool {
        matches!(self, Self::Coil | Self::HoldingRegister)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coil => "coil",
            Self::DiscreteInput => "discrete_input",
            Self::InputRegister => "input_register",
            Self::HoldingRegister => "holding_register",
        }
    }
}

impl std::fmt::Display for RegisterClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integer layout of a word register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// 16-bit signed integer (1 register)
    Int16,
    /// 16-bit unsigned integer (1 register)
    UInt16,
    /// 32-bit signed integer (2 registers)
    Int32,
    /// 32-bit unsigned integer (2 registers)
    UInt32,
}

impl DataType {
    /// Number of registers occupied by this data type.
    pub fn word_count(&self) -> u16 {
        match self {
            Self::Int16 | Self::UInt16 => 1,
            Self::Int32 | Self::UInt32 => 2,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Int16 | Self::Int32)
    }

    /// Smallest raw value representable.
    pub fn min_raw(&self) -> i64 {
        match self {
            Self::Int16 => i16::MIN as i64,
            Self::Int32 => i32::MIN as i64,
            Self::UInt16 | Self::UInt32 => 0,
        }
    }

    /// Largest raw value representable.
    pub fn max_raw(&self) -> i64 {
        match self {
            Self::Int16 => i16::MAX as i64,
            Self::UInt16 => u16::MAX as i64,
            Self::Int32 => i32::MAX as i64,
            Self::UInt32 => u32::MAX as i64,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive address span `[start, end]` within one register class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressRange {
    pub start: u16,
    pub end: u16,
}

impl AddressRange {
    pub fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    /// Number of registers or bits covered. The full space holds 65536.
    pub fn count(&self) -> u32 {
        u32::from(self.end - self.start) + 1
    }

    pub fn contains(&self, address: u16) -> bool {
        address >= self.start && address <= self.end
    }

    pub fn overlaps(&self, other: &AddressRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Smallest range covering both `self` and `other`.
    pub fn union(&self, other: &AddressRange) -> AddressRange {
        AddressRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl std::fmt::Display for AddressRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Defaults applied when a numeric entity needs bounds the point left out.
pub const DEFAULT_MIN: f64 = 0.0;
pub const DEFAULT_MAX: f64 = 50.0;
pub const DEFAULT_STEP: f64 = 0.1;

/// Declared numeric entry bounds. Each part is optional on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub step: Option<f64>,
}

impl Bounds {
    pub fn is_declared(&self) -> bool {
        self.min.is_some() || self.max.is_some() || self.step.is_some()
    }

    /// Fill in missing parts with the defaults (0, 50.0, 0.1).
    pub fn resolve(&self) -> ResolvedBounds {
        ResolvedBounds {
            min: self.min.unwrap_or(DEFAULT_MIN),
            max: self.max.unwrap_or(DEFAULT_MAX),
            step: self.step.unwrap_or(DEFAULT_STEP),
        }
    }
}

/// Bounds with every part present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

/// One entry of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumOption {
    pub value: i64,
    pub label: String,
}

/// Ordered raw value → label table with an optional default selection.
///
/// `default` holds the raw value whose label is preselected; it is kept out
/// of `options` so the option list never contains the sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueEnum {
    pub options: Vec<EnumOption>,
    #[serde(default)]
    pub default: Option<i64>,
}

impl ValueEnum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(raw, label)` pairs, keeping their order.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        Self {
            options: pairs
                .into_iter()
                .map(|(value, label)| EnumOption {
                    value,
                    label: label.into(),
                })
                .collect(),
            default: None,
        }
    }

    /// Append an option.
    pub fn with_option(mut self, value: i64, label: impl Into<String>) -> Self {
        self.options.push(EnumOption {
            value,
            label: label.into(),
        });
        self
    }

    /// Set the default sentinel.
    pub fn with_default(mut self, value: i64) -> Self {
        self.default = Some(value);
        self
    }

    /// True when no option exists apart from the sentinel.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn label(&self, value: i64) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.as_str())
    }

    pub fn value_of(&self, label: &str) -> Option<i64> {
        self.options
            .iter()
            .find(|o| o.label == label)
            .map(|o| o.value)
    }

    /// Labels in stored order.
    pub fn labels(&self) -> Vec<String> {
        self.options.iter().map(|o| o.label.clone()).collect()
    }

    /// Label the default sentinel resolves to, if any.
    pub fn default_label(&self) -> Option<&str> {
        self.default.and_then(|raw| self.label(raw))
    }
}

/// Explicit off/on raw values for a boolean point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchMap {
    pub off: i64,
    /// When `None`, every value other than `off` means on.
    #[serde(default)]
    pub on: Option<i64>,
}

impl SwitchMap {
    pub fn new(off: i64) -> Self {
        Self { off, on: None }
    }

    pub fn with_on(mut self, on: i64) -> Self {
        self.on = Some(on);
        self
    }

    /// Raw value written for "on".
    pub fn on_value(&self) -> i64 {
        self.on.unwrap_or(if self.off == 1 { 0 } else { 1 })
    }
}

impl Default for SwitchMap {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Forced entity category for temperature-unit points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformOverride {
    Number,
    Climate,
}

/// Declarative description of one Modbus point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointDefinition {
    /// Unique key, also the external entity identifier
    pub key: String,
    /// Address space
    pub register_class: RegisterClass,
    /// Zero-based address within the class
    pub address: u16,
    /// Word layout (word registers only)
    #[serde(default)]
    pub data_type: Option<DataType>,
    /// Human label (falls back to the key)
    #[serde(default)]
    pub display_name: Option<String>,
    /// Raw value × scale = physical value
    #[serde(default = "default_scale")]
    pub scale_factor: f64,
    /// Unit of measurement
    #[serde(default)]
    pub unit: Option<String>,
    /// Numeric entry bounds
    #[serde(default)]
    pub bounds: Bounds,
    /// Selection values
    #[serde(default)]
    pub value_enum: Option<ValueEnum>,
    /// Off/on raw values
    #[serde(default)]
    pub switch_map: Option<SwitchMap>,
    /// Explicit read/write flag (holding registers and coils only)
    #[serde(default)]
    pub writable_override: Option<bool>,
    /// Forced entity category
    #[serde(default)]
    pub platform_override: Option<PlatformOverride>,
    /// HVAC modes offered by a climate entity
    #[serde(default)]
    pub hvac_modes: Option<Vec<String>>,
    /// Climate feature set override
    #[serde(default)]
    pub climate_features: Option<Vec<ClimateFeature>>,
    /// Value only ever increases (counters, operating hours)
    #[serde(default)]
    pub cumulative: bool,
}

fn default_scale() -> f64 {
    1.0
}

impl PointDefinition {
    fn new(
        key: impl Into<String>,
        register_class: RegisterClass,
        address: u16,
        data_type: Option<DataType>,
    ) -> Self {
        Self {
            key: key.into(),
            register_class,
            address,
            data_type,
            display_name: None,
            scale_factor: default_scale(),
            unit: None,
            bounds: Bounds::default(),
            value_enum: None,
            switch_map: None,
            writable_override: None,
            platform_override: None,
            hvac_modes: None,
            climate_features: None,
            cumulative: false,
        }
    }

    /// Create a coil definition.
    pub fn coil(key: impl Into<String>, address: u16) -> Self {
        Self::new(key, RegisterClass::Coil, address, None)
    }

    /// Create a discrete input definition.
    pub fn discrete_input(key: impl Into<String>, address: u16) -> Self {
        Self::new(key, RegisterClass::DiscreteInput, address, None)
    }

    /// Create an input register definition.
    pub fn input_register(key: impl Into<String>, address: u16, data_type: DataType) -> Self {
        Self::new(key, RegisterClass::InputRegister, address, Some(data_type))
    }

    /// Create a holding register definition.
    pub fn holding_register(key: impl Into<String>, address: u16, data_type: DataType) -> Self {
        Self::new(key, RegisterClass::HoldingRegister, address, Some(data_type))
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Set the scaling factor.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale_factor = scale;
        self
    }

    /// Set the unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.bounds.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.bounds.max = Some(max);
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.bounds.step = Some(step);
        self
    }

    /// Set minimum and maximum together.
    pub fn with_range(self, min: f64, max: f64) -> Self {
        self.with_min(min).with_max(max)
    }

    /// Attach an enumeration.
    pub fn with_values(mut self, values: ValueEnum) -> Self {
        self.value_enum = Some(values);
        self
    }

    /// Attach explicit off/on values.
    pub fn with_switch(mut self, switch: SwitchMap) -> Self {
        self.switch_map = Some(switch);
        self
    }

    /// Mark a holding register or coil as read-only.
    pub fn read_only(mut self) -> Self {
        self.writable_override = Some(false);
        self
    }

    /// Force the entity category.
    pub fn with_platform(mut self, platform: PlatformOverride) -> Self {
        self.platform_override = Some(platform);
        self
    }

    pub fn with_hvac_modes<I, S>(mut self, modes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hvac_modes = Some(modes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_climate_features(mut self, features: Vec<ClimateFeature>) -> Self {
        self.climate_features = Some(features);
        self
    }

    /// Mark the value as monotonically increasing.
    pub fn cumulative(mut self) -> Self {
        self.cumulative = true;
        self
    }

    /// Display name, falling back to the key.
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.key)
    }

    /// True for input registers, discrete inputs and points forced read-only.
    pub fn is_readonly(&self) -> bool {
        !self.register_class.is_writable() || self.writable_override == Some(false)
    }

    /// Registers (or bits) occupied by this point.
    pub fn word_count(&self) -> DefinitionResult<u16> {
        if self.register_class.is_bit() {
            return Ok(1);
        }
        self.data_type
            .map(|dt| dt.word_count())
            .ok_or_else(|| DefinitionError::MissingDataType(self.key.clone()))
    }

    /// Inclusive occupied span `[address, address + width - 1]`.
    pub fn occupied_range(&self) -> DefinitionResult<AddressRange> {
        let width = self.word_count()?;
        let end = self
            .address
            .checked_add(width - 1)
            .ok_or_else(|| DefinitionError::AddressOverflow {
                key: self.key.clone(),
                address: self.address,
            })?;
        Ok(AddressRange::new(self.address, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readonly_by_class() {
        assert!(PointDefinition::input_register("t", 0, DataType::Int16).is_readonly());
        assert!(PointDefinition::discrete_input("d", 0).is_readonly());
        assert!(!PointDefinition::holding_register("h", 0, DataType::UInt16).is_readonly());
        assert!(!PointDefinition::coil("c", 0).is_readonly());
    }

    #[test]
    fn test_readonly_override() {
        let point = PointDefinition::holding_register("h", 0, DataType::UInt16).read_only();
        assert!(point.is_readonly());

        let coil = PointDefinition::coil("c", 0).read_only();
        assert!(coil.is_readonly());
    }

    #[test]
    fn test_occupied_range_uses_datatype_width() {
        let point = PointDefinition::input_register("energy", 3, DataType::UInt32);
        assert_eq!(point.occupied_range().unwrap(), AddressRange::new(3, 4));

        let bit = PointDefinition::coil("boost", 6);
        assert_eq!(bit.occupied_range().unwrap(), AddressRange::new(6, 6));
    }

    #[test]
    fn test_occupied_range_overflow() {
        let point = PointDefinition::holding_register("edge", u16::MAX, DataType::Int32);
        assert!(matches!(
            point.occupied_range(),
            Err(DefinitionError::AddressOverflow { .. })
        ));
    }

    #[test]
    fn test_word_register_without_datatype() {
        let mut point = PointDefinition::input_register("x", 0, DataType::Int16);
        point.data_type = None;
        assert_eq!(
            point.word_count(),
            Err(DefinitionError::MissingDataType("x".to_string()))
        );
    }

    #[test]
    fn test_name_falls_back_to_key() {
        let point = PointDefinition::coil("auto_mode", 5);
        assert_eq!(point.name(), "auto_mode");
        assert_eq!(point.with_name("Auto Mode").name(), "Auto Mode");
    }

    #[test]
    fn test_bounds_resolve_per_field() {
        let bounds = Bounds {
            min: Some(5.0),
            max: Some(35.0),
            step: None,
        };
        let resolved = bounds.resolve();
        assert_eq!(resolved.min, 5.0);
        assert_eq!(resolved.max, 35.0);
        assert_eq!(resolved.step, DEFAULT_STEP);

        let empty = Bounds::default().resolve();
        assert_eq!((empty.min, empty.max, empty.step), (0.0, 50.0, 0.1));
    }

    #[test]
    fn test_value_enum_lookup() {
        let values =
            ValueEnum::from_pairs([(0, "Comfort"), (1, "Eco"), (2, "Warm")]).with_default(0);
        assert_eq!(values.label(1), Some("Eco"));
        assert_eq!(values.value_of("Warm"), Some(2));
        assert_eq!(values.default_label(), Some("Comfort"));
        assert_eq!(values.label(9), None);
    }

    #[test]
    fn test_address_range_ops() {
        let a = AddressRange::new(0, 0);
        let b = AddressRange::new(3, 4);
        assert!(!a.overlaps(&b));
        assert!(b.overlaps(&AddressRange::new(4, 7)));
        assert_eq!(a.union(&b), AddressRange::new(0, 4));
        assert_eq!(a.union(&b).count(), 5);
    }

    #[test]
    fn test_full_address_space_count() {
        assert_eq!(AddressRange::new(0, u16::MAX).count(), 65_536);
        assert_eq!(AddressRange::new(u16::MAX, u16::MAX).count(), 1);
    }

    #[test]
    fn test_switch_on_value() {
        assert_eq!(SwitchMap::new(0).on_value(), 1);
        assert_eq!(SwitchMap::new(0).with_on(2).on_value(), 2);
        assert_eq!(SwitchMap::new(1).on_value(), 0);
    }
}
