//! CameraRegistry - label to device id resolution
//!
//! Labels are a case-insensitive unique key; device identifiers are
//! opaque, provider-assigned strings. Registry sizes are single-digit,
//! so lookup is a linear scan.

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// One configured camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Camera {
    /// Human-readable label, stored lowercase
    pub label: String,
    /// Provider-assigned device identifier
    pub device_id: String,
}

/// Registry of configured cameras.
#[derive(Debug)]
pub struct CameraRegistry {
    entries: Vec<Camera>,
}

impl CameraRegistry {
    /// Build a registry from label -> device id pairs.
    ///
    /// Labels are lowercased on the way in; two labels that collide after
    /// lowercasing are a config error.
    pub fn new(cameras: BTreeMap<String, String>) -> Result<Self> {
        let mut entries: Vec<Camera> = Vec::with_capacity(cameras.len());

        for (label, device_id) in cameras {
            let label = label.to_lowercase();
            if device_id.trim().is_empty() {
                return Err(Error::Config(format!(
                    "camera {} has an empty device id",
                    label
                )));
            }
            if entries.iter().any(|c| c.label == label) {
                return Err(Error::Config(format!("duplicate camera label: {}", label)));
            }
            entries.push(Camera { label, device_id });
        }

        Ok(Self { entries })
    }

    /// Resolve a label (case-insensitive) to its device identifier.
    pub fn resolve(&self, label: &str) -> Result<&str> {
        let label = label.to_lowercase();
        self.entries
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.device_id.as_str())
            .ok_or_else(|| Error::Config(format!("unknown camera label: {}", label)))
    }

    /// Iterate cameras in deterministic (sorted label) order.
    pub fn iter(&self) -> impl Iterator<Item = &Camera> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
