//! Pin metadata (`data.txt`) and pin references

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{LimsError, Result};

/// Timestamp format pins use for `created` and version names
pub const PIN_CREATED_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// A pin name, optionally fixed to one version
///
/// Parsed from `owner/name` or `owner/name@version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PinRef {
    pub name: String,
    pub version: Option<String>,
}

impl PinRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version.filter(|v| !v.trim().is_empty());
        self
    }

    /// Parse `owner/name[@version]`
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let (name, version) = match raw.split_once('@') {
            Some((name, version)) => (name, Some(version.to_string())),
            None => (raw, None),
        };

        if name.is_empty() || name.split('/').any(|seg| seg.is_empty()) {
            return Err(LimsError::validation(format!("Invalid pin name: '{}'", raw)));
        }
        if name.split('/').any(|seg| seg == "." || seg == "..") {
            return Err(LimsError::validation(format!(
                "Pin name must not contain relative path segments: '{}'",
                raw
            )));
        }

        Ok(Self::new(name).with_version(version))
    }

    /// Split into `(owner, name)`; the owner is `None` for bare names
    pub fn owner_and_name(&self) -> (Option<&str>, &str) {
        match self.name.split_once('/') {
            Some((owner, name)) => (Some(owner), name),
            None => (None, self.name.as_str()),
        }
    }
}

impl std::fmt::Display for PinRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}@{}", self.name, v),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T: Clone> OneOrMany<T> {
    pub fn to_vec(&self) -> Vec<T> {
        match self {
            OneOrMany::One(v) => vec![v.clone()],
            OneOrMany::Many(v) => v.clone(),
        }
    }
}

/// Contents of a pin version's `data.txt`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinMeta {
    pub file: OneOrMany<String>,
    #[serde(default)]
    pub file_size: Option<OneOrMany<u64>>,
    #[serde(default)]
    pub pin_hash: Option<String>,
    #[serde(rename = "type", default)]
    pub pin_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub api_version: Option<u32>,
    /// Version the metadata was read from; filled in by the board
    #[serde(skip)]
    pub version: String,
}

impl PinMeta {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| {
            LimsError::serialization(format!("Invalid pin metadata (data.txt): {}", e))
        })
    }

    pub fn files(&self) -> Vec<String> {
        self.file.to_vec()
    }

    /// Expected size of the file at `index`, when the metadata records it
    pub fn file_size_at(&self, index: usize) -> Option<u64> {
        self.file_size
            .as_ref()
            .and_then(|sizes| sizes.to_vec().get(index).copied())
    }

    /// `created` as a UTC timestamp
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created.as_deref().and_then(parse_pin_timestamp)
    }
}

/// Parse the compact `%Y%m%dT%H%M%SZ` stamp pins use
pub fn parse_pin_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), PIN_CREATED_FORMAT)
        .ok()
        .map(|dt| dt.and_utc())
}
