//! Unit of measurement → physical quantity mapping.
//!
//! Maps the free-form unit strings used in the Register Map to a display unit,
//! a quantity tag (the host's device class) and an aggregation hint (the
//! host's state class). Unknown units pass through verbatim.

use serde::{Deserialize, Serialize};

/// Physical quantity a unit measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Temperature,
    Pressure,
    Energy,
    Power,
    Duration,
}

/// How successive values of a point relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Instantaneous reading
    Measurement,
    /// Monotonic counter
    TotalIncreasing,
}

/// Result of mapping one unit string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitMapping {
    pub display_unit: Option<String>,
    pub quantity: Option<Quantity>,
    pub aggregation: Option<Aggregation>,
}

impl UnitMapping {
    fn new(display_unit: &str, quantity: Option<Quantity>, aggregation: Aggregation) -> Self {
        Self {
            display_unit: Some(display_unit.to_string()),
            quantity,
            aggregation: Some(aggregation),
        }
    }
}

/// Map a unit string. Total and pure; `None` maps to an empty result.
pub fn map_unit(unit: Option<&str>) -> UnitMapping {
    use Aggregation::{Measurement, TotalIncreasing};

    let Some(unit) = unit else {
        return UnitMapping::default();
    };
    let u = unit.trim();
    let lower = u.to_lowercase();

    // Temperature symbols are matched exactly
    match u {
        "°C" => return UnitMapping::new("°C", Some(Quantity::Temperature), Measurement),
        "K" => return UnitMapping::new("K", Some(Quantity::Temperature), Measurement),
        _ => {}
    }

    match lower.as_str() {
        "bar" => return UnitMapping::new("bar", Some(Quantity::Pressure), Measurement),
        "kwh" | "kw/h" => return UnitMapping::new("kWh", Some(Quantity::Energy), TotalIncreasing),
        "w" => return UnitMapping::new("W", Some(Quantity::Power), Measurement),
        "kw" => return UnitMapping::new("kW", Some(Quantity::Power), Measurement),
        "l/min" | "l pro min" => return UnitMapping::new("l/min", None, Measurement),
        "m³/h" => return UnitMapping::new("m³/h", None, Measurement),
        _ => {}
    }

    match u {
        "‰" | "%" | "ppm" => return UnitMapping::new(u, None, Measurement),
        _ => {}
    }

    match lower.as_str() {
        "h" | "std" => UnitMapping::new("h", Some(Quantity::Duration), TotalIncreasing),
        "min" => UnitMapping::new("min", Some(Quantity::Duration), Measurement),
        "s" | "sek" | "sec" => UnitMapping::new("s", Some(Quantity::Duration), Measurement),
        "d" | "days" => UnitMapping::new("d", Some(Quantity::Duration), Measurement),
        _ => UnitMapping::new(u, None, Measurement),
    }
}

/// Units that make a writable point a thermostat candidate.
pub const TEMPERATURE_UNITS: [&str; 2] = ["°C", "K"];

pub fn is_temperature_unit(unit: Option<&str>) -> bool {
    unit.is_some_and(|u| TEMPERATURE_UNITS.contains(&u))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_maps_to_empty() {
        assert_eq!(map_unit(None), UnitMapping::default());
    }

    #[test]
    fn test_temperature() {
        let m = map_unit(Some("°C"));
        assert_eq!(m.display_unit.as_deref(), Some("°C"));
        assert_eq!(m.quantity, Some(Quantity::Temperature));
        assert_eq!(m.aggregation, Some(Aggregation::Measurement));

        assert_eq!(map_unit(Some("K")).quantity, Some(Quantity::Temperature));
        // Kelvin is case-sensitive, lowercase k is not a temperature
        assert_eq!(map_unit(Some("k")).quantity, None);
    }

    #[test]
    fn test_energy_is_cumulative() {
        for unit in ["kWh", "KWH", "kW/h"] {
            let m = map_unit(Some(unit));
            assert_eq!(m.display_unit.as_deref(), Some("kWh"));
            assert_eq!(m.quantity, Some(Quantity::Energy));
            assert_eq!(m.aggregation, Some(Aggregation::TotalIncreasing));
        }
    }

    #[test]
    fn test_power_and_pressure() {
        assert_eq!(map_unit(Some("W")).quantity, Some(Quantity::Power));
        assert_eq!(map_unit(Some("kw")).display_unit.as_deref(), Some("kW"));
        assert_eq!(map_unit(Some("Bar")).quantity, Some(Quantity::Pressure));
    }

    #[test]
    fn test_volumetric_flow_is_verbatim() {
        let m = map_unit(Some("m³/h"));
        assert_eq!(m.display_unit.as_deref(), Some("m³/h"));
        assert_eq!(m.quantity, None);
        assert_eq!(m.aggregation, Some(Aggregation::Measurement));

        assert_eq!(map_unit(Some("L/Min")).display_unit.as_deref(), Some("l/min"));
    }

    #[test]
    fn test_ratios_and_concentration() {
        for unit in ["%", "‰", "ppm"] {
            let m = map_unit(Some(unit));
            assert_eq!(m.display_unit.as_deref(), Some(unit));
            assert_eq!(m.quantity, None);
            assert_eq!(m.aggregation, Some(Aggregation::Measurement));
        }
    }

    #[test]
    fn test_durations() {
        let hours = map_unit(Some("Std"));
        assert_eq!(hours.display_unit.as_deref(), Some("h"));
        assert_eq!(hours.quantity, Some(Quantity::Duration));
        assert_eq!(hours.aggregation, Some(Aggregation::TotalIncreasing));

        assert_eq!(map_unit(Some("min")).aggregation, Some(Aggregation::Measurement));
        assert_eq!(map_unit(Some("sek")).display_unit.as_deref(), Some("s"));
        assert_eq!(map_unit(Some("days")).display_unit.as_deref(), Some("d"));
        assert_eq!(map_unit(Some("d")).quantity, Some(Quantity::Duration));
    }

    #[test]
    fn test_unknown_unit_falls_back() {
        let m = map_unit(Some(" m³ "));
        assert_eq!(m.display_unit.as_deref(), Some("m³"));
        assert_eq!(m.quantity, None);
        assert_eq!(m.aggregation, Some(Aggregation::Measurement));
    }

    #[test]
    fn test_temperature_unit_check() {
        assert!(is_temperature_unit(Some("°C")));
        assert!(is_temperature_unit(Some("K")));
        assert!(!is_temperature_unit(Some("%")));
        assert!(!is_temperature_unit(None));
    }
}
