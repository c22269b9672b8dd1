//! Point → entity category classification.
//!
//! Capability precedence is switch > enumeration > temperature unit > number.
//! A boolean point that also carries an enumeration still surfaces as a plain
//! boolean, and `PlatformOverride::Number` steers a temperature point away
//! from the thermostat card.

use serde::{Deserialize, Serialize};

use crate::point::{PlatformOverride, PointDefinition};
use crate::units::is_temperature_unit;

/// Semantic role of a point in the entity model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    /// Read-only boolean
    BinarySensor,
    /// Read-only numeric or enumerated value
    Sensor,
    /// Writable boolean
    Switch,
    /// Writable enumeration
    Select,
    /// Writable temperature setpoint
    Climate,
    /// Any other writable numeric value
    Number,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 6] = [
        EntityCategory::Sensor,
        EntityCategory::BinarySensor,
        EntityCategory::Select,
        EntityCategory::Switch,
        EntityCategory::Climate,
        EntityCategory::Number,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BinarySensor => "binary_sensor",
            Self::Sensor => "sensor",
            Self::Switch => "switch",
            Self::Select => "select",
            Self::Climate => "climate",
            Self::Number => "number",
        }
    }

    /// Whether entities of this category accept writes.
    pub fn is_writable(&self) -> bool {
        !matches!(self, Self::BinarySensor | Self::Sensor)
    }
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean semantics: bit classes, or an explicit off/on map.
pub fn is_switch(point: &PointDefinition) -> bool {
    point.register_class.is_bit() || point.switch_map.is_some()
}

/// Enumerated with at least one option besides the default sentinel.
pub fn is_select(point: &PointDefinition) -> bool {
    point.value_enum.as_ref().is_some_and(|v| !v.is_empty())
}

/// Temperature unit, not forced to Number.
pub fn is_climate(point: &PointDefinition) -> bool {
    is_temperature_unit(point.unit.as_deref())
        && matches!(point.platform_override, None | Some(PlatformOverride::Climate))
}

/// Classify a point. First match wins.
pub fn classify(point: &PointDefinition) -> EntityCategory {
    let switch = is_switch(point);

    if point.is_readonly() {
        return if switch {
            EntityCategory::BinarySensor
        } else {
            // Read-only enumerations are not user-settable, so no Select
            EntityCategory::Sensor
        };
    }

    if switch {
        EntityCategory::Switch
    } else if is_select(point) {
        EntityCategory::Select
    } else if is_climate(point) {
        EntityCategory::Climate
    } else {
        EntityCategory::Number
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{DataType, SwitchMap, ValueEnum};

    fn presets() -> ValueEnum {
        ValueEnum::from_pairs([(0, "Away"), (1, "Preset 1"), (2, "Preset 2"), (3, "Preset 3")])
            .with_default(2)
    }

    #[test]
    fn test_readonly_numeric_is_sensor() {
        let point = PointDefinition::input_register("t", 7, DataType::Int16)
            .with_scale(0.1)
            .with_unit("°C");
        assert_eq!(classify(&point), EntityCategory::Sensor);
    }

    #[test]
    fn test_readonly_enum_is_sensor() {
        let point = PointDefinition::input_register("state", 0, DataType::UInt16)
            .with_values(ValueEnum::from_pairs([(0, "ok"), (50, "no unit")]));
        assert_eq!(classify(&point), EntityCategory::Sensor);
    }

    #[test]
    fn test_discrete_input_is_binary_sensor() {
        let point = PointDefinition::discrete_input("standby", 1);
        assert_eq!(classify(&point), EntityCategory::BinarySensor);
    }

    #[test]
    fn test_readonly_switch_map_is_binary_sensor() {
        let point = PointDefinition::holding_register("flag", 9, DataType::UInt16)
            .with_switch(SwitchMap::new(0))
            .read_only();
        assert_eq!(classify(&point), EntityCategory::BinarySensor);
    }

    #[test]
    fn test_coil_is_switch() {
        assert_eq!(classify(&PointDefinition::coil("boost", 6)), EntityCategory::Switch);
    }

    #[test]
    fn test_switch_beats_enumeration() {
        let point = PointDefinition::coil("bits", 1).with_values(presets());
        assert_eq!(classify(&point), EntityCategory::Switch);

        let holding = PointDefinition::holding_register("mode", 0, DataType::UInt16)
            .with_values(presets())
            .with_switch(SwitchMap::new(0).with_on(1));
        assert_eq!(classify(&holding), EntityCategory::Switch);
    }

    #[test]
    fn test_writable_enum_is_select_regardless_of_unit() {
        let point = PointDefinition::holding_register("preset", 0, DataType::UInt16)
            .with_values(presets())
            .with_unit("°C");
        assert_eq!(classify(&point), EntityCategory::Select);
    }

    #[test]
    fn test_empty_enum_is_not_select() {
        let point = PointDefinition::holding_register("x", 0, DataType::UInt16)
            .with_values(ValueEnum::new().with_default(1));
        assert_eq!(classify(&point), EntityCategory::Number);
    }

    #[test]
    fn test_temperature_setpoint_is_climate() {
        let point = PointDefinition::holding_register("setpoint", 3, DataType::UInt16)
            .with_unit("°C")
            .with_range(5.0, 35.0);
        assert_eq!(classify(&point), EntityCategory::Climate);

        let explicit = point.clone().with_platform(PlatformOverride::Climate);
        assert_eq!(classify(&explicit), EntityCategory::Climate);
    }

    #[test]
    fn test_platform_override_forces_number() {
        let point = PointDefinition::holding_register("setpoint", 3, DataType::UInt16)
            .with_unit("K")
            .with_platform(PlatformOverride::Number);
        assert_eq!(classify(&point), EntityCategory::Number);
    }

    #[test]
    fn test_catch_all_number() {
        let bare = PointDefinition::holding_register("bare", 4, DataType::UInt16);
        assert_eq!(classify(&bare), EntityCategory::Number);

        let minutes = bare.with_unit("min");
        assert_eq!(classify(&minutes), EntityCategory::Number);
    }

    #[test]
    fn test_readonly_never_writable_category() {
        let points = [
            PointDefinition::input_register("a", 0, DataType::Int16).with_unit("°C"),
            PointDefinition::input_register("b", 1, DataType::UInt16).with_values(presets()),
            PointDefinition::discrete_input("c", 0),
            PointDefinition::holding_register("d", 0, DataType::UInt16)
                .with_values(presets())
                .read_only(),
            PointDefinition::holding_register("e", 1, DataType::UInt16)
                .with_unit("°C")
                .read_only(),
            PointDefinition::coil("f", 0).read_only(),
        ];
        for point in &points {
            let category = classify(point);
            assert!(
                matches!(category, EntityCategory::Sensor | EntityCategory::BinarySensor),
                "{} classified as {}",
                point.key,
                category
            );
            assert!(!category.is_writable());
        }
    }

    #[test]
    fn test_classify_is_deterministic() {
        let point =
            PointDefinition::holding_register("preset", 0, DataType::UInt16).with_values(presets());
        let first = classify(&point);
        for _ in 0..10 {
            assert_eq!(classify(&point), first);
        }
    }
}
