//! Engine property definitions with defaults from engine.json
//!
//! engine.json is embedded at compile time and is the only place defaults
//! live. User overrides come from a flat JSON object; the reader hands
//! back the override when it is valid and the registry default otherwise.

use super::error::{EngineError, Result};
use std::collections::HashMap;

/// engine.json embedded at compile time
const ENGINE_JSON: &str = include_str!("../../engine.json");

/// Property definition from engine.json
#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
    pub default_value: String,
    pub description: String,
    /// For EnumeratedProperty, the valid values
    pub valid_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    String,
    Enumerated,
    Integer,
    Number,
}

impl PropertyKind {
    fn parse(kind: &str) -> Option<Self> {
        match kind {
            "StringProperty" => Some(Self::String),
            "EnumeratedProperty" => Some(Self::Enumerated),
            "IntegerProperty" => Some(Self::Integer),
            "NumberProperty" => Some(Self::Number),
            _ => None,
        }
    }
}

/// Registry of all engine properties
#[derive(Debug, Default)]
pub struct PropertyRegistry {
    properties: HashMap<String, PropertyDef>,
}

impl PropertyRegistry {
    /// Parse a registry document (`{"properties": [...]}`)
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| EngineError::Config(format!("property registry is invalid JSON: {}", e)))?;

        let entries = doc["properties"]
            .as_array()
            .ok_or_else(|| EngineError::Config("registry missing 'properties' array".into()))?;

        let mut properties = HashMap::new();
        for entry in entries {
            let name = entry["name"]
                .as_str()
                .ok_or_else(|| EngineError::Config("property missing 'name'".into()))?
                .to_string();

            let kind_str = entry["kind"].as_str().unwrap_or_default();
            let kind = PropertyKind::parse(kind_str).ok_or_else(|| {
                EngineError::Config(format!("unknown kind '{}' for property '{}'", kind_str, name))
            })?;

            let valid_values = if kind == PropertyKind::Enumerated {
                entry["values"].as_array().map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect()
                })
            } else {
                None
            };

            properties.insert(
                name.clone(),
                PropertyDef {
                    name,
                    kind,
                    default_value: entry["defaultValue"].as_str().unwrap_or("").to_string(),
                    description: entry["description"].as_str().unwrap_or("").to_string(),
                    valid_values,
                },
            );
        }

        Ok(Self { properties })
    }

    pub fn get_default(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.default_value.as_str())
    }

    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    /// Check if a value is valid for an enumerated property
    pub fn is_valid_enum_value(&self, name: &str, value: &str) -> bool {
        self.properties
            .get(name)
            .and_then(|p| p.valid_values.as_ref())
            .map(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
            .unwrap_or(true)
    }
}

static REGISTRY: std::sync::OnceLock<PropertyRegistry> = std::sync::OnceLock::new();

/// Global registry built from the embedded engine.json
pub fn registry() -> &'static PropertyRegistry {
    REGISTRY.get_or_init(|| {
        PropertyRegistry::from_json(ENGINE_JSON).unwrap_or_else(|e| {
            tracing::error!("embedded engine.json rejected: {}", e);
            PropertyRegistry::default()
        })
    })
}

/// Typed property reader over user overrides
///
/// Empty strings count as "not set".
#[derive(Debug, Default)]
pub struct PropertyReader {
    user_values: HashMap<String, String>,
}

impl PropertyReader {
    pub fn new(user_values: HashMap<String, String>) -> Self {
        let user_values = user_values
            .into_iter()
            .filter(|(_, v)| !v.is_empty())
            .collect();
        Self { user_values }
    }

    /// Build from a flat JSON object; scalar values are taken as strings
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| EngineError::Config(format!("overrides must be a JSON object: {}", e)))?;

        let mut user_values = HashMap::new();
        for (name, value) in doc {
            if registry().get_property(&name).is_none() {
                tracing::warn!("ignoring unknown property '{}'", name);
                continue;
            }
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Null => continue,
                other => {
                    tracing::warn!("property '{}' has non-scalar value {}, ignored", name, other);
                    continue;
                }
            };
            user_values.insert(name, text);
        }
        Ok(Self::new(user_values))
    }

    /// User value or the engine.json default
    pub fn get_string(&self, name: &str) -> String {
        if let Some(value) = self.user_values.get(name) {
            return value.clone();
        }
        registry().get_default(name).unwrap_or("").to_string()
    }

    /// Enumerated property; invalid user values fall back to the default
    pub fn get_enum(&self, name: &str) -> String {
        let reg = registry();
        let default = reg.get_default(name).unwrap_or("");

        if let Some(value) = self.user_values.get(name) {
            if reg.is_valid_enum_value(name, value) {
                return value.to_lowercase();
            }
            let valid_values = reg
                .get_property(name)
                .and_then(|p| p.valid_values.as_ref())
                .map(|v| v.join(", "))
                .unwrap_or_default();
            tracing::warn!(
                "invalid value '{}' for property '{}'. Valid values: [{}]. Using default: '{}'",
                value,
                name,
                valid_values,
                default
            );
        }

        default.to_string()
    }

    /// Non-negative integer property
    pub fn get_usize(&self, name: &str) -> usize {
        let default = registry()
            .get_default(name)
            .and_then(|d| d.parse::<usize>().ok())
            .unwrap_or(0);

        match self.user_values.get(name) {
            None => default,
            Some(raw) => raw.trim().parse::<usize>().unwrap_or_else(|_| {
                tracing::warn!(
                    "invalid integer value '{}' for property '{}', using default: {}",
                    raw,
                    name,
                    default
                );
                default
            }),
        }
    }

    /// Finite, non-negative number property
    pub fn get_f64(&self, name: &str) -> f64 {
        let default = registry()
            .get_default(name)
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0);

        match self.user_values.get(name) {
            None => default,
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => v,
                _ => {
                    tracing::warn!(
                        "invalid numeric value '{}' for property '{}', using default: {}",
                        raw,
                        name,
                        default
                    );
                    default
                }
            },
        }
    }
}
