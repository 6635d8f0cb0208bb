//! Descriptive metadata about a resolved asset.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Resolver-supplied information about an asset.
///
/// Every field is optional. The default value carries no information and
/// serializes to an empty object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetInfo {
    /// Version of the resolved asset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Name of the asset the resolved path represents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_name: Option<String>,

    /// Details specific to the resolver implementation.
    #[serde(skip_serializing_if = "Value::is_null")]
    pub resolver_info: Value,
}

impl AssetInfo {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
