//! End-to-end tests for compiling point definitions into a registry

use comfolink_core::descriptor::EntityDescriptor;
use comfolink_core::register_map::{comfoconnect_pro_points, keys};
use comfolink_core::registry::shared;
use comfolink_core::{
    decode, encode, map_unit, AddressRange, Aggregation, DataType, DefinitionError,
    EntityCategory, PointDefinition, PointValue, Quantity, RegisterClass, Registry, ValueEnum,
};

#[test]
fn test_readonly_temperature_sensor() {
    let point = PointDefinition::input_register("room_temperature", 7, DataType::Int16)
        .with_name("Room Air Temperature")
        .with_scale(0.1)
        .with_unit("°C");
    let registry = Registry::build(vec![point]).unwrap();

    let descriptor = registry.descriptor("room_temperature").unwrap();
    let EntityDescriptor::Sensor(sensor) = descriptor else {
        panic!("expected sensor, got {:?}", descriptor);
    };
    assert_eq!(sensor.unit.quantity, Some(Quantity::Temperature));
    assert_eq!(sensor.unit.aggregation, Some(Aggregation::Measurement));

    let point = registry.point("room_temperature").unwrap();
    let value = decode(point, 215).unwrap().as_f64().unwrap();
    assert!((value - 21.5).abs() < 1e-9);
}

#[test]
fn test_writable_preset_select() {
    let point = PointDefinition::holding_register("ventilation_preset", 0, DataType::UInt16)
        .with_values(
            ValueEnum::from_pairs([(0, "Away"), (1, "Preset 1"), (2, "Preset 2"), (3, "Preset 3")])
                .with_default(2),
        );
    let registry = Registry::build(vec![point]).unwrap();

    let table = registry.category_table(EntityCategory::Select).unwrap();
    let Some(EntityDescriptor::Select(select)) = table.get("ventilation_preset") else {
        panic!("ventilation_preset missing from select table");
    };
    assert_eq!(select.labels(), vec!["Away", "Preset 1", "Preset 2", "Preset 3"]);
    assert_eq!(select.default_option.as_deref(), Some("Preset 2"));
}

#[test]
fn test_writable_coil_switch() {
    let registry = Registry::build(vec![PointDefinition::coil("boost", 6)]).unwrap();
    assert_eq!(registry.category("boost"), Some(EntityCategory::Switch));

    let point = registry.point("boost").unwrap();
    assert_eq!(decode(point, 0).unwrap(), PointValue::Bool(false));
    assert_eq!(decode(point, 1).unwrap(), PointValue::Bool(true));
    assert_eq!(decode(point, 255).unwrap(), PointValue::Bool(true));
}

#[test]
fn test_overlapping_words_rejected() {
    let points = vec![
        PointDefinition::holding_register("first", 2, DataType::UInt32),
        PointDefinition::holding_register("second", 2, DataType::Int32),
    ];
    match Registry::build(points) {
        Err(DefinitionError::Overlap {
            first,
            second,
            start,
            end,
            ..
        }) => {
            assert_eq!((first.as_str(), second.as_str()), ("first", "second"));
            assert_eq!((start, end), (2, 3));
        }
        other => panic!("expected overlap, got {:?}", other),
    }
}

#[test]
fn test_volumetric_flow_unit() {
    let mapping = map_unit(Some("m³/h"));
    assert_eq!(mapping.display_unit.as_deref(), Some("m³/h"));
    assert_eq!(mapping.quantity, None);
    assert_eq!(mapping.aggregation, Some(Aggregation::Measurement));
}

#[test]
fn test_envelope_covers_gaps() {
    let points = vec![
        PointDefinition::input_register("a", 0, DataType::UInt16),
        PointDefinition::input_register("b", 3, DataType::UInt32),
        PointDefinition::input_register("c", 7, DataType::UInt16),
    ];
    let registry = Registry::build(points).unwrap();
    assert_eq!(
        registry.envelope(RegisterClass::InputRegister),
        Some(AddressRange::new(0, 7))
    );
}

#[test]
fn test_shipped_map_builds_cleanly() {
    let registry = Registry::build(comfoconnect_pro_points()).unwrap();
    assert!(registry.gaps().is_empty());
    assert_eq!(registry.descriptor_count(), registry.points().len());

    let expected = [
        (RegisterClass::InputRegister, AddressRange::new(0, 25)),
        (RegisterClass::DiscreteInput, AddressRange::new(0, 3)),
        (RegisterClass::HoldingRegister, AddressRange::new(0, 4)),
        (RegisterClass::Coil, AddressRange::new(0, 8)),
    ];
    for (class, range) in expected {
        assert_eq!(registry.envelope(class), Some(range), "{}", class);
    }
}

#[test]
fn test_shipped_map_categories() {
    let registry = Registry::build(comfoconnect_pro_points()).unwrap();
    let count = |c| registry.category_table(c).map_or(0, |t| t.len());

    assert_eq!(count(EntityCategory::Sensor), 26);
    assert_eq!(count(EntityCategory::BinarySensor), 4);
    assert_eq!(count(EntityCategory::Select), 3);
    assert_eq!(count(EntityCategory::Climate), 1);
    assert_eq!(count(EntityCategory::Number), 1);
    assert_eq!(count(EntityCategory::Switch), 5);

    assert_eq!(registry.category(keys::EXTERNAL_SETPOINT), Some(EntityCategory::Climate));
    assert_eq!(registry.category(keys::BOOST_TIME), Some(EntityCategory::Number));
    assert_eq!(registry.category(keys::ACTIVE_ERROR_1), Some(EntityCategory::Sensor));
    assert_eq!(registry.category(keys::FILTER_DIRTY), Some(EntityCategory::BinarySensor));
}

#[test]
fn test_boost_time_minutes() {
    let registry = Registry::build(comfoconnect_pro_points()).unwrap();
    let point = registry.point(keys::BOOST_TIME).unwrap();

    let raw = encode(point, &PointValue::Number(30.0)).unwrap();
    assert_eq!(raw, 1800);
    let minutes = decode(point, raw).unwrap().as_f64().unwrap();
    assert!((minutes - 30.0).abs() < 1e-6);
}

#[test]
fn test_shared_registry_is_single_instance() {
    let first = shared().unwrap();
    let second = shared().unwrap();
    assert!(std::ptr::eq(first, second));
    assert_eq!(first.points().len(), comfoconnect_pro_points().len());
}

#[test]
fn test_shared_registry_concurrent_access() {
    let handles: Vec<_> = (0..8)
        .map(|_| std::thread::spawn(|| shared().map(|r| r as *const Registry as usize)))
        .collect();
    let addresses: Vec<usize> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();
    assert!(addresses.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_descriptor_serializes_with_category_tag() {
    let registry = Registry::build(comfoconnect_pro_points()).unwrap();
    let descriptor = registry.descriptor(keys::BOOST).unwrap();
    let json = serde_json::to_value(descriptor).unwrap();
    assert_eq!(json["category"], "switch");
    assert_eq!(json["key"], "boost");
}
