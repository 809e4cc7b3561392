//! Prop descriptors for "scale" props of UI components.
//!
//! A scale prop accepts a number or a numeric string. Outside production
//! the descriptor carries a validator that only admits the listed values;
//! in production no validator is attached, as UI frameworks skip prop
//! validation there anyway.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Build mode the descriptor is created for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EnvMode {
    #[default]
    Production,
    Development,
    Other(String),
}

impl EnvMode {
    pub fn is_production(&self) -> bool {
        matches!(self, EnvMode::Production)
    }
}

impl From<&str> for EnvMode {
    fn from(value: &str) -> Self {
        match value {
            "production" => EnvMode::Production,
            "development" => EnvMode::Development,
            other => EnvMode::Other(other.to_string()),
        }
    }
}

impl From<String> for EnvMode {
    fn from(value: String) -> Self {
        EnvMode::from(value.as_str())
    }
}

impl From<EnvMode> for String {
    fn from(mode: EnvMode) -> Self {
        mode.to_string()
    }
}

impl FromStr for EnvMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(EnvMode::from(s))
    }
}

impl fmt::Display for EnvMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvMode::Production => f.write_str("production"),
            EnvMode::Development => f.write_str("development"),
            EnvMode::Other(mode) => f.write_str(mode),
        }
    }
}

/// Types a prop accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropType {
    Number,
    String,
}

/// Accepts values whose integer prefix is one of the allowed numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleValidator {
    valid: Vec<f64>,
}

impl ScaleValidator {
    pub fn new(valid: Vec<f64>) -> Self {
        Self { valid }
    }

    pub fn valid_numbers(&self) -> &[f64] {
        &self.valid
    }

    pub fn validate(&self, value: &str) -> bool {
        parse_int(value).is_some_and(|n| self.valid.contains(&n))
    }
}

/// Descriptor handed to the component framework.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropConfig {
    #[serde(rename = "type")]
    pub types: Vec<PropType>,
    pub default: Value,
    #[serde(skip)]
    pub validator: Option<ScaleValidator>,
}

impl PropConfig {
    /// Build a descriptor from untyped inputs, e.g. a component manifest.
    ///
    /// Outside production `valid_numbers` must be an array of numbers and
    /// `default` must be a number.
    pub fn from_json(default: &Value, valid_numbers: &Value, env_mode: &EnvMode) -> Result<Self> {
        let mut config = PropConfig {
            types: vec![PropType::Number, PropType::String],
            default: default.clone(),
            validator: None,
        };

        if env_mode.is_production() {
            return Ok(config);
        }

        let valid = valid_numbers
            .as_array()
            .ok_or(Error::InvalidProp("'validNumbers' is not an array."))?;
        if !default.is_number() {
            return Err(Error::InvalidProp("'defaultValue' is not a Number."));
        }

        config.validator = Some(ScaleValidator::new(
            valid.iter().filter_map(Value::as_f64).collect(),
        ));
        Ok(config)
    }

    /// Run the validator, if any. Without one every value passes.
    pub fn validate(&self, value: &str) -> bool {
        self.validator
            .as_ref()
            .map_or(true, |validator| validator.validate(value))
    }
}

/// Create the descriptor for a scale prop.
pub fn prop_scale(default: f64, valid_numbers: &[f64], env_mode: &EnvMode) -> PropConfig {
    PropConfig {
        types: vec![PropType::Number, PropType::String],
        default: serde_json::Number::from_f64(default)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        validator: (!env_mode.is_production())
            .then(|| ScaleValidator::new(valid_numbers.to_vec())),
    }
}

/// Leading integer of `value` in base 10.
///
/// Skips leading whitespace, takes an optional sign and then as many
/// digits as follow. `None` when there are no digits.
pub fn parse_int(value: &str) -> Option<f64> {
    let rest = value.trim_start();
    let (negative, rest) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };

    let digits: Vec<u8> = rest
        .bytes()
        .take_while(u8::is_ascii_digit)
        .map(|b| b - b'0')
        .collect();
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.iter().fold(0.0, |acc, &d| acc * 10.0 + f64::from(d));
    Some(if negative { -magnitude } else { magnitude })
}
