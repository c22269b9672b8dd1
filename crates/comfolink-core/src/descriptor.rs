//! Entity descriptors: the category-specific projection of a point.
//!
//! The platform side instantiates live entities from these. Every descriptor
//! carries the point key and display name; the rest depends on the category.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::classify::EntityCategory;
use crate::error::DescriptorError;
use crate::point::{EnumOption, PointDefinition, ResolvedBounds};
use crate::units::{map_unit, Aggregation, UnitMapping};

/// Climate entity capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClimateFeature {
    TargetTemperature,
    TargetTemperatureRange,
    TargetHumidity,
    FanMode,
    PresetMode,
    TurnOff,
    TurnOn,
}

/// Feature set used when a point declares none.
pub const DEFAULT_CLIMATE_FEATURES: [ClimateFeature; 1] = [ClimateFeature::TargetTemperature];

/// Temperature unit assumed for climate entities without one.
pub const DEFAULT_TEMPERATURE_UNIT: &str = "°C";

/// Input widget for number entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberMode {
    Auto,
    #[default]
    Box,
    Slider,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDescriptor {
    pub key: String,
    pub name: String,
    pub unit: UnitMapping,
    /// Set for read-only enumerated points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<EnumOption>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinarySensorDescriptor {
    pub key: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchDescriptor {
    pub key: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectDescriptor {
    pub key: String,
    pub name: String,
    pub options: Vec<EnumOption>,
    pub default_option: Option<String>,
}

impl SelectDescriptor {
    /// Option labels in stored order.
    pub fn labels(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.label.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberDescriptor {
    pub key: String,
    pub name: String,
    pub scale: f64,
    pub unit: UnitMapping,
    pub bounds: ResolvedBounds,
    pub mode: NumberMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateDescriptor {
    pub key: String,
    pub name: String,
    pub scale: f64,
    pub bounds: ResolvedBounds,
    pub temperature_unit: String,
    pub hvac_modes: Vec<String>,
    pub features: Vec<ClimateFeature>,
}

impl ClimateDescriptor {
    pub fn supports(&self, feature: ClimateFeature) -> bool {
        self.features.contains(&feature)
    }
}

/// Descriptor of any category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum EntityDescriptor {
    Sensor(SensorDescriptor),
    BinarySensor(BinarySensorDescriptor),
    Switch(SwitchDescriptor),
    Select(SelectDescriptor),
    Climate(ClimateDescriptor),
    Number(NumberDescriptor),
}

impl EntityDescriptor {
    pub fn key(&self) -> &str {
        match self {
            Self::Sensor(d) => &d.key,
            Self::BinarySensor(d) => &d.key,
            Self::Switch(d) => &d.key,
            Self::Select(d) => &d.key,
            Self::Climate(d) => &d.key,
            Self::Number(d) => &d.key,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Sensor(d) => &d.name,
            Self::BinarySensor(d) => &d.name,
            Self::Switch(d) => &d.name,
            Self::Select(d) => &d.name,
            Self::Climate(d) => &d.name,
            Self::Number(d) => &d.name,
        }
    }

    pub fn category(&self) -> EntityCategory {
        match self {
            Self::Sensor(_) => EntityCategory::Sensor,
            Self::BinarySensor(_) => EntityCategory::BinarySensor,
            Self::Switch(_) => EntityCategory::Switch,
            Self::Select(_) => EntityCategory::Select,
            Self::Climate(_) => EntityCategory::Climate,
            Self::Number(_) => EntityCategory::Number,
        }
    }
}

fn unit_mapping(point: &PointDefinition) -> UnitMapping {
    let mut mapping = map_unit(point.unit.as_deref());
    if point.cumulative && mapping.display_unit.is_some() {
        mapping.aggregation = Some(Aggregation::TotalIncreasing);
    }
    mapping
}

/// Build the descriptor for an already classified point.
///
/// A point that declares an enumeration without options is rejected whatever
/// its category; the registry records it as a gap and moves on.
pub fn build_descriptor(
    point: &PointDefinition,
    category: EntityCategory,
) -> Result<EntityDescriptor, DescriptorError> {
    if point.value_enum.as_ref().is_some_and(|v| v.is_empty()) {
        return Err(DescriptorError::EmptyEnumeration);
    }

    let key = point.key.clone();
    let name = point.name().to_string();

    let descriptor = match category {
        EntityCategory::Sensor => EntityDescriptor::Sensor(SensorDescriptor {
            key,
            name,
            unit: unit_mapping(point),
            options: point.value_enum.as_ref().map(|v| v.options.clone()),
        }),
        EntityCategory::BinarySensor => {
            EntityDescriptor::BinarySensor(BinarySensorDescriptor { key, name })
        }
        EntityCategory::Switch => EntityDescriptor::Switch(SwitchDescriptor { key, name }),
        EntityCategory::Select => {
            let values = point.value_enum.clone().unwrap_or_default();
            let default_option = values.default_label().map(str::to_string);
            if values.default.is_some() && default_option.is_none() {
                warn!(
                    key = %point.key,
                    default = ?values.default,
                    "Default selection does not match any option"
                );
            }
            EntityDescriptor::Select(SelectDescriptor {
                key,
                name,
                options: values.options,
                default_option,
            })
        }
        EntityCategory::Climate => EntityDescriptor::Climate(ClimateDescriptor {
            key,
            name,
            scale: point.scale_factor,
            bounds: point.bounds.resolve(),
            temperature_unit: point
                .unit
                .clone()
                .unwrap_or_else(|| DEFAULT_TEMPERATURE_UNIT.to_string()),
            hvac_modes: point.hvac_modes.clone().unwrap_or_default(),
            features: point
                .climate_features
                .clone()
                .unwrap_or_else(|| DEFAULT_CLIMATE_FEATURES.to_vec()),
        }),
        EntityCategory::Number => EntityDescriptor::Number(NumberDescriptor {
            key,
            name,
            scale: point.scale_factor,
            unit: unit_mapping(point),
            bounds: point.bounds.resolve(),
            mode: NumberMode::Box,
        }),
    };

    Ok(descriptor)
}
