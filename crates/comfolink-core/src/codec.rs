//! Conversion between raw register contents and physical values.
//!
//! Raw values are carried as `i64` so every supported datatype fits without
//! loss. 32-bit values span two consecutive registers, high word first.

use serde::{Deserialize, Serialize};

use crate::classify::is_switch;
use crate::error::{ValueError, ValueResult};
use crate::point::{DataType, PointDefinition, SwitchMap};

/// A decoded point value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointValue {
    Number(f64),
    Bool(bool),
    Label(String),
}

impl PointValue {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::Label(_) => "label",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_label(&self) -> Option<&str> {
        match self {
            Self::Label(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for PointValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{}", v),
            Self::Bool(true) => f.write_str("on"),
            Self::Bool(false) => f.write_str("off"),
            Self::Label(s) => f.write_str(s),
        }
    }
}

impl From<f64> for PointValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<bool> for PointValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for PointValue {
    fn from(s: &str) -> Self {
        Self::Label(s.to_string())
    }
}

/// Value kind a point decodes to.
pub fn value_kind(point: &PointDefinition) -> &'static str {
    if is_switch(point) {
        "bool"
    } else if point.value_enum.is_some() {
        "label"
    } else {
        "number"
    }
}

fn data_type_of(point: &PointDefinition) -> DataType {
    // Bit points carry no datatype; their raw value is a single 0/1 word.
    point.data_type.unwrap_or(DataType::UInt16)
}

fn check_range(data_type: DataType, raw: i64) -> ValueResult<()> {
    if raw < data_type.min_raw() || raw > data_type.max_raw() {
        return Err(ValueError::OutOfRange {
            raw,
            data_type: data_type.to_string(),
        });
    }
    Ok(())
}

/// Slack for scale factors that are not exact in binary, such as 1/60.
const BOUNDS_EPSILON: f64 = 1e-9;

/// Reject physical values outside the declared bounds.
fn check_bounds(point: &PointDefinition, value: f64) -> ValueResult<()> {
    if let Some(min) = point.bounds.min {
        if value < min - BOUNDS_EPSILON {
            return Err(ValueError::BelowMinimum { value, min });
        }
    }
    if let Some(max) = point.bounds.max {
        if value > max + BOUNDS_EPSILON {
            return Err(ValueError::AboveMaximum { value, max });
        }
    }
    Ok(())
}

/// Combine register words into a raw integer.
pub fn words_to_raw(point: &PointDefinition, words: &[u16]) -> ValueResult<i64> {
    let data_type = data_type_of(point);
    let expected = data_type.word_count() as usize;
    if words.len() < expected {
        return Err(ValueError::MissingWords {
            expected,
            actual: words.len(),
        });
    }

    let raw = match data_type {
        DataType::Int16 => words[0] as i16 as i64,
        DataType::UInt16 => words[0] as i64,
        DataType::Int32 => (((words[0] as u32) << 16) | words[1] as u32) as i32 as i64,
        DataType::UInt32 => (((words[0] as u32) << 16) | words[1] as u32) as i64,
    };
    Ok(raw)
}

/// Split a raw integer into register words.
pub fn raw_to_words(point: &PointDefinition, raw: i64) -> ValueResult<Vec<u16>> {
    let data_type = data_type_of(point);
    check_range(data_type, raw)?;

    let words = match data_type {
        DataType::Int16 => vec![raw as i16 as u16],
        DataType::UInt16 => vec![raw as u16],
        DataType::Int32 | DataType::UInt32 => {
            let bits = raw as u32;
            vec![(bits >> 16) as u16, (bits & 0xFFFF) as u16]
        }
    };
    Ok(words)
}

/// Decode a raw integer into a physical value.
///
/// Scaled numbers outside the declared bounds are an error, not clamped.
pub fn decode(point: &PointDefinition, raw: i64) -> ValueResult<PointValue> {
    if let Some(data_type) = point.data_type {
        check_range(data_type, raw)?;
    }

    if is_switch(point) {
        let on = match point.switch_map {
            None => raw != 0,
            Some(SwitchMap { off, .. }) if raw == off => false,
            Some(SwitchMap { on: None, .. }) => true,
            Some(SwitchMap { on: Some(on), .. }) if raw == on => true,
            Some(_) => return Err(ValueError::UnexpectedSwitchValue(raw)),
        };
        return Ok(PointValue::Bool(on));
    }

    if let Some(values) = &point.value_enum {
        return values
            .label(raw)
            .map(|l| PointValue::Label(l.to_string()))
            .ok_or(ValueError::UnknownEnumValue(raw));
    }

    let value = raw as f64 * point.scale_factor;
    check_bounds(point, value)?;
    Ok(PointValue::Number(value))
}

/// Encode a physical value into a raw integer.
///
/// Numbers are checked against the declared bounds and rejected, never
/// clamped, when they fall outside.
pub fn encode(point: &PointDefinition, value: &PointValue) -> ValueResult<i64> {
    let expected = value_kind(point);
    if value.kind() != expected {
        return Err(ValueError::KindMismatch {
            expected,
            actual: value.kind(),
        });
    }

    let raw = match value {
        PointValue::Bool(on) => {
            let map = point.switch_map.unwrap_or_default();
            if *on {
                map.on_value()
            } else {
                map.off
            }
        }
        PointValue::Label(label) => point
            .value_enum
            .as_ref()
            .and_then(|v| v.value_of(label))
            .ok_or_else(|| ValueError::UnknownLabel(label.clone()))?,
        PointValue::Number(v) => {
            let v = *v;
            if !v.is_finite() {
                return Err(ValueError::NotFinite(v));
            }
            check_bounds(point, v)?;
            let scaled = (v / point.scale_factor).round();
            if !scaled.is_finite() {
                return Err(ValueError::NotFinite(scaled));
            }
            scaled as i64
        }
    };

    check_range(data_type_of(point), raw)?;
    Ok(raw)
}

/// Decode straight from register words.
pub fn decode_words(point: &PointDefinition, words: &[u16]) -> ValueResult<PointValue> {
    decode(point, words_to_raw(point, words)?)
}

/// Encode straight to register words.
pub fn encode_words(point: &PointDefinition, value: &PointValue) -> ValueResult<Vec<u16>> {
    raw_to_words(point, encode(point, value)?)
}

/// Parse user input into the value kind the point expects.
pub fn parse_value(point: &PointDefinition, text: &str) -> ValueResult<PointValue> {
    let text = text.trim();
    match value_kind(point) {
        "bool" => match text.to_lowercase().as_str() {
            "on" | "true" | "1" => Ok(PointValue::Bool(true)),
            "off" | "false" | "0" => Ok(PointValue::Bool(false)),
            _ => Err(ValueError::Unparsable {
                text: text.to_string(),
                expected: "bool",
            }),
        },
        "label" => Ok(PointValue::Label(text.to_string())),
        _ => text
            .parse::<f64>()
            .map(PointValue::Number)
            .map_err(|_| ValueError::Unparsable {
                text: text.to_string(),
                expected: "number",
            }),
    }
}
