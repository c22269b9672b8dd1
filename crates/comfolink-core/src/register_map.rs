//! Register Map of the Zehnder ComfoConnect PRO.
//!
//! Addresses follow the Modbus installation manual (RCG 2.0.0.10) shifted to
//! zero-based PDU addressing: register N in the manual is address N - 1 here.
//!
//! New points only need to be added to [`comfoconnect_pro_points`]; the
//! registry derives everything else.

use crate::point::{DataType, PointDefinition, ValueEnum};

/// Manufacturer reported in device metadata.
pub const MANUFACTURER: &str = "Zehnder";

/// Default device name.
pub const DEVICE_NAME: &str = "ComfoConnect PRO";

/// Point keys.
pub mod keys {
    // Input registers
    pub const CONNECTION_STATE: &str = "connection_state";
    pub const ACTIVE_ERROR_1: &str = "activeerror1";
    pub const ACTIVE_ERROR_2: &str = "activeerror2";
    pub const ACTIVE_ERROR_3: &str = "activeerror3";
    pub const ACTIVE_ERROR_4: &str = "activeerror4";
    pub const ACTIVE_ERROR_5: &str = "activeerror5";
    pub const AIRFLOW: &str = "airflow";
    pub const ROOM_TEMPERATURE: &str = "room_temperature";
    pub const EXTRACT_TEMPERATURE: &str = "extract_temperature";
    pub const EXHAUST_TEMPERATURE: &str = "exhaust_temperature";
    pub const OUTDOOR_TEMPERATURE: &str = "outdoor_temperature";
    pub const SUPPLY_TEMPERATURE: &str = "supply_temperature";
    pub const ROOM_HUMIDITY: &str = "room_humidity";
    pub const EXTRACT_HUMIDITY: &str = "extract_humidity";
    pub const EXHAUST_HUMIDITY: &str = "exhaust_humidity";
    pub const OUTDOOR_HUMIDITY: &str = "outdoor_humidity";
    pub const SUPPLY_HUMIDITY: &str = "supply_humidity";
    pub const CO2_SENSOR_ZONES: [&str; 8] = [
        "co2_sensor_zone_1",
        "co2_sensor_zone_2",
        "co2_sensor_zone_3",
        "co2_sensor_zone_4",
        "co2_sensor_zone_5",
        "co2_sensor_zone_6",
        "co2_sensor_zone_7",
        "co2_sensor_zone_8",
    ];
    pub const FILTER_DAYS_REMAINING: &str = "filter_days_remaining";

    // Discrete inputs
    pub const ERROR_FLAG: &str = "error_flag";
    pub const STANDBY: &str = "standby";
    pub const COMFOHOOD: &str = "comfohood";
    pub const FILTER_DIRTY: &str = "filter_dirty";

    // Holding registers
    pub const VENTILATION_PRESET: &str = "ventilation_preset";
    pub const TEMPERATURE_PROFILE: &str = "temperature_profile";
    pub const TEMPERATURE_PROFILE_MODE: &str = "temperature_profile_mode";
    pub const EXTERNAL_SETPOINT: &str = "external_setpoint";
    pub const BOOST_TIME: &str = "boost_time";

    // Coils
    pub const RESET_ERRORS: &str = "reset_errors";
    pub const AUTO_MODE: &str = "auto_mode";
    pub const BOOST: &str = "boost";
    pub const AWAY_FUNCTION: &str = "away_function";
    pub const COMFOCOOL: &str = "comfocool";
}

/// Controller error codes reported in the active-error registers.
pub const ERROR_CODES: &[(i64, &str)] = &[
    (0, "Normal operation"),
    (21, "Two or more temperature sensors are out of bounds"),
    (22, "Temperature too high for HRU"),
    (23, "Value of temperature sensor T11 has exceeded the limit too often"),
    (24, "Value of temperature sensor T11 is exceeding the limit"),
    (25, "Value of temperature sensor T12 has exceeded the limit too often"),
    (26, "Value of temperature sensor T12 is exceeding the limit"),
    (27, "Value of temperature sensor T20 has exceeded the limit too often"),
    (28, "Value of temperature sensor T20 is exceeding the limit"),
    (29, "Value of temperature sensor T21 has exceeded the limit too often"),
    (30, "Value of temperature sensor T21 is exceeding the limit"),
    (31, "Value of temperature sensor T22 has exceeded the limit too often"),
    (32, "Value of temperature sensor T22 is exceeding the limit"),
    (33, "HRU has not been initialized"),
    (34, "The front door is open"),
    (35, "Preheater is present, but its position (left/right) does not match the HRU orientation"),
    (37, "Preheater is not delivering the required power"),
    (38, "Preheater is not delivering the required power in the required ratio"),
    (39, "Value of humidity sensor ϕ11 has exceeded the limit too often"),
    (41, "Value of humidity sensor ϕ12 has exceeded the limit too often"),
    (43, "Value of humidity sensor ϕ20 has exceeded the limit too often"),
    (45, "Value of humidity sensor ϕ21 has exceeded the limit too often"),
    (47, "Value of humidity sensor ϕ22 has exceeded the limit too often"),
    (49, "Value of pressure sensor P12 has exceeded the limit too often"),
    (50, "Value of pressure sensor P22 has exceeded the limit too often"),
    (51, "Speed of F12 fan has exceeded the limit too often"),
    (52, "Speed of F22 fan has exceeded the limit too often"),
    (53, "Static pressure of sensor P12 has exceeded the limit too often"),
    (54, "Static pressure of sensor P22 has exceeded the limit too often"),
    (55, "Required F12 fan speed was not reached too often"),
    (56, "Required F22 fan speed was not reached too often"),
    (57, "Required mass flow for F12 fan was not reached too often"),
    (58, "Required mass flow for F22 fan was not reached too often"),
    (59, "Required temperature for the outdoor air after the preheater was not reached too often"),
    (60, "Required temperature for the supply air was not reached too often"),
    (61, "Supply air temperature (sensor T22) is too low too often"),
    (62, "Imbalance was outside the tolerance values too often in the past period"),
    (66, "RF communication hardware was present but is no longer detected"),
    (67, "Option board was present but is no longer detected"),
    (68, "Preheater was present but is no longer detected"),
    (69, "Reheater was present but is no longer detected"),
    (74, "Extractor hood was present but is no longer detected"),
    (75, "Comfo Cool was present but is no longer detected"),
    (76, "ComfoFond was present but is no longer detected"),
    (77, "Filters must be replaced now"),
    (78, "The external filter input is high"),
    (79, "The filters must be ordered now as the remaining filter life is limited"),
    (80, "Standby is active"),
    (81, "Preheater is not communicating reliably"),
    (89, "Bypass is being used manually."),
    (90, "ComfoCool is overheated"),
    (91, "ComfoCool compressor error"),
    (92, "ComfoCool room temperature out of bounds"),
    (93, "ComfoCool compressor temperature out of bounds"),
    (94, "ComfoCool supply temperature out of bounds"),
    (95, "Hood temperature is too high"),
    (96, "Hood is activated"),
    (97, "STATUS-FLAG"),
    (98, "Current too low for preheater"),
    (99, "Configuration error"),
    (100, "Warning that an error analysis is running"),
    (101, "Error on the ComfoNet bus"),
    (
        102,
        "The number of CO2 sensors on a controller has decreased - \
         one or more sensors are no longer detected",
    ),
    (103, "More than 8 sensors are detected in one zone"),
    (104, "General CO2 sensor error"),
];

/// Human-readable text for an error code.
pub fn error_message(code: i64) -> Option<&'static str> {
    ERROR_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, msg)| *msg)
}

fn error_codes() -> ValueEnum {
    ValueEnum::from_pairs(ERROR_CODES.iter().copied())
}

fn temperature(key: &str, address: u16, name: &str) -> PointDefinition {
    PointDefinition::input_register(key, address, DataType::Int16)
        .with_name(name)
        .with_scale(0.1)
        .with_unit("°C")
}

fn humidity(key: &str, address: u16, name: &str) -> PointDefinition {
    PointDefinition::input_register(key, address, DataType::UInt16)
        .with_name(name)
        .with_unit("%")
}

/// All points of the ComfoConnect PRO, in manual order.
pub fn comfoconnect_pro_points() -> Vec<PointDefinition> {
    use keys::*;

    let mut points = vec![
        // Input registers
        PointDefinition::input_register(CONNECTION_STATE, 0, DataType::UInt16)
            .with_name("Connection State")
            .with_values(ValueEnum::from_pairs([
                (0, "ok"),
                (30, "the detected ventilation unit is not a CAQ"),
                (40, "CAQ version not compatible"),
                (50, "no ventilation unit detected"),
            ])),
    ];

    let errors = [
        ACTIVE_ERROR_1,
        ACTIVE_ERROR_2,
        ACTIVE_ERROR_3,
        ACTIVE_ERROR_4,
        ACTIVE_ERROR_5,
    ];
    for (i, key) in errors.iter().enumerate() {
        points.push(
            PointDefinition::input_register(*key, 1 + i as u16, DataType::UInt16)
                .with_name(format!("Error {}", i + 1))
                .with_values(error_codes()),
        );
    }

    points.extend([
        PointDefinition::input_register(AIRFLOW, 6, DataType::UInt16)
            .with_name("Supply Air Fan Volume")
            .with_unit("m³"),
        temperature(ROOM_TEMPERATURE, 7, "Room Air Temperature"),
        temperature(EXTRACT_TEMPERATURE, 8, "Extract Air Temperature"),
        temperature(EXHAUST_TEMPERATURE, 9, "Exhaust Air Temperature"),
        temperature(OUTDOOR_TEMPERATURE, 10, "Outdoor Air Temperature"),
        temperature(SUPPLY_TEMPERATURE, 11, "Supply Air Temperature"),
        humidity(ROOM_HUMIDITY, 12, "Room Air Humidity"),
        humidity(EXTRACT_HUMIDITY, 13, "Extract Air Humidity"),
        humidity(EXHAUST_HUMIDITY, 14, "Exhaust Air Humidity"),
        humidity(OUTDOOR_HUMIDITY, 15, "Outdoor Air Humidity"),
        humidity(SUPPLY_HUMIDITY, 16, "Supply Air Humidity"),
    ]);

    for (i, key) in CO2_SENSOR_ZONES.iter().enumerate() {
        points.push(
            PointDefinition::input_register(*key, 17 + i as u16, DataType::UInt16)
                .with_name(format!("CO2 Sensor Zone {}", i + 1))
                .with_unit("ppm"),
        );
    }

    points.extend([
        PointDefinition::input_register(FILTER_DAYS_REMAINING, 25, DataType::UInt16)
            .with_name("Filter replacement in")
            .with_unit("d"),
        // Discrete inputs
        PointDefinition::discrete_input(ERROR_FLAG, 0).with_name("Error active?"),
        PointDefinition::discrete_input(STANDBY, 1).with_name("Standby"),
        PointDefinition::discrete_input(COMFOHOOD, 2).with_name("ComfoHood"),
        PointDefinition::discrete_input(FILTER_DIRTY, 3).with_name("Change filter"),
        // Holding registers
        PointDefinition::holding_register(VENTILATION_PRESET, 0, DataType::UInt16)
            .with_name("Ventilation Level")
            .with_values(
                ValueEnum::from_pairs([
                    (0, "Away"),
                    (1, "Preset 1"),
                    (2, "Preset 2"),
                    (3, "Preset 3"),
                ])
                .with_default(2),
            ),
        // Only effective in adaptive or fixed profile mode
        PointDefinition::holding_register(TEMPERATURE_PROFILE, 1, DataType::UInt16)
            .with_name("Temperature Profile")
            .with_values(
                ValueEnum::from_pairs([(0, "Comfort"), (1, "Eco"), (2, "Warm")]).with_default(0),
            ),
        PointDefinition::holding_register(TEMPERATURE_PROFILE_MODE, 2, DataType::UInt16)
            .with_name("Temperature Profile Mode")
            .with_values(
                ValueEnum::from_pairs([
                    (0, "Adaptive"),
                    (1, "Fixed"),
                    (2, "according to ext. setpoint"),
                ])
                .with_default(0),
            ),
        // Only effective in external setpoint mode
        PointDefinition::holding_register(EXTERNAL_SETPOINT, 3, DataType::UInt16)
            .with_name("External Setpoint")
            .with_scale(0.1)
            .with_unit("°C")
            .with_range(5.0, 35.0),
        // Register holds seconds; 65535 means 24 hours and reads as 1092.25
        PointDefinition::holding_register(BOOST_TIME, 4, DataType::UInt16)
            .with_name("Boost Time [min.]")
            .with_scale(1.0 / 60.0)
            .with_unit("min")
            .with_step(1.0)
            .with_range(0.0, 1092.25),
        // Coils. Addresses 1..=4 duplicate the ventilation preset register.
        PointDefinition::coil(RESET_ERRORS, 0).with_name("Acknowledge Errors"),
        PointDefinition::coil(AUTO_MODE, 5).with_name("Auto Mode"),
        PointDefinition::coil(BOOST, 6).with_name("Boost"),
        PointDefinition::coil(AWAY_FUNCTION, 7).with_name("Away function"),
        PointDefinition::coil(COMFOCOOL, 8).with_name("ComfoCool"),
    ]);

    points
}
