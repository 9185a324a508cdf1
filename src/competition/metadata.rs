//! Typed metadata attached to competitions and entries

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{CompetitionError, Result};

static KEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z][a-z0-9_.]{0,63}$").unwrap_or_else(|e| panic!("invalid key pattern: {e}"))
});

/// A metadata value. The set of variants is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MetadataValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Flag(bool),
    Timestamp(DateTime<Utc>),
}

/// Key/value metadata with validated keys
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, MetadataValue>")]
pub struct Metadata(BTreeMap<String, MetadataValue>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous value under the same key
    pub fn insert(&mut self, key: &str, value: MetadataValue) -> Result<Option<MetadataValue>> {
        validate_key(key)?;
        Ok(self.0.insert(key.to_string(), value))
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<MetadataValue> {
        self.0.remove(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key)? {
            MetadataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            MetadataValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            MetadataValue::Number(n) => Some(*n),
            MetadataValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.0.get(key)? {
            MetadataValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        match self.0.get(key)? {
            MetadataValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl TryFrom<BTreeMap<String, MetadataValue>> for Metadata {
    type Error = CompetitionError;

    fn try_from(map: BTreeMap<String, MetadataValue>) -> Result<Self> {
        for key in map.keys() {
            validate_key(key)?;
        }
        Ok(Self(map))
    }
}

fn validate_key(key: &str) -> Result<()> {
    if KEY_PATTERN.is_match(key) {
        Ok(())
    } else {
        Err(CompetitionError::InvalidMetadata(format!(
            "invalid key '{}': expected lowercase letters, digits, '_' or '.'",
            key
        )))
    }
}
