use std::{env, str::FromStr};

use libdcpu::word::ByteOrder;
use thiserror::Error;

use crate::data::StringPacking;

pub const STRING_PACKING_VAR: &str = "DCPUASM_STRING_PACKING";
pub const BYTE_ORDER_VAR: &str = "DCPUASM_BYTE_ORDER";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    pub string_packing: StringPacking,
    pub byte_order: ByteOrder,
}

impl Config {
    /// Read settings from the process environment. Unset variables keep
    /// their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            string_packing: setting(&lookup, STRING_PACKING_VAR)?,
            byte_order: setting(&lookup, BYTE_ORDER_VAR)?,
        })
    }
}

fn setting<F, T>(lookup: &F, key: &'static str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Default,
{
    match lookup(key) {
        None => Ok(T::default()),
        Some(value) => {
            T::from_str(value.trim()).map_err(|_| ConfigError::InvalidValue { key, value })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config(&[]), Ok(Config::default()));
        assert_eq!(Config::default().string_packing, StringPacking::OnePerWord);
        assert_eq!(Config::default().byte_order, ByteOrder::Big);
    }

    #[test]
    fn test_overrides() {
        assert_eq!(
            config(&[(STRING_PACKING_VAR, "Packed"), (BYTE_ORDER_VAR, "little")]),
            Ok(Config {
                string_packing: StringPacking::Packed,
                byte_order: ByteOrder::Little,
            })
        );
    }

    #[test]
    fn test_invalid_value() {
        assert_eq!(
            config(&[(BYTE_ORDER_VAR, "pdp")]),
            Err(ConfigError::InvalidValue {
                key: BYTE_ORDER_VAR,
                value: "pdp".into()
            })
        );
    }
}
