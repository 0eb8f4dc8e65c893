//! Common types used throughout the HubSpot connector
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

// ============================================================================
// Source Record
// ============================================================================

/// One emitted record: the object type's display name plus the raw JSON
/// text of a single API object.
///
/// Downstream consumers parse `object` themselves; the connector never
/// reshapes item payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRecord {
    /// Display name of the object type, e.g. "Contact Lists"
    pub object_type: String,
    /// Raw JSON text of the item
    pub object: String,
}

impl SourceRecord {
    /// Build a record from an object type name and one page item.
    pub fn new(object_type: impl Into<String>, item: &JsonValue) -> Self {
        Self {
            object_type: object_type.into(),
            object: item.to_string(),
        }
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}
