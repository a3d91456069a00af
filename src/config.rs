use std::collections::BTreeMap;
use std::io::Read;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::dsp::bandpass::FilterSpec;
use crate::dsp::edges::EdgeDetectionConfig;
use crate::error::{LogError, Result};

// ---------------------------------------------------------------------------
// OptionDocument – named, optionally active option groups
// ---------------------------------------------------------------------------

/// One named option group with a nested key/value parameter map.
///
/// ```json
/// {
///   "0": { "name": "sample frequency", "value": { "Fs": 1000.0 } },
///   "1": { "name": "plot smoothed gradient", "active": true,
///          "value": { "window ms": 50, "shift": 25,
///                     "scale": 500.0, "threshold": 5.0 } }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionGroup {
    pub name: String,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub value: BTreeMap<String, JsonValue>,
}

/// The configuration document the presentation layer hands in: a map of
/// group ids to [`OptionGroup`]s. The core only reads it, resolving typed
/// [`FilterSpec`] / [`EdgeDetectionConfig`] values, and never writes it
/// back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionDocument(BTreeMap<String, OptionGroup>);

impl OptionDocument {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// All group names, in group-id order.
    pub fn names(&self) -> Vec<&str> {
        self.0.values().map(|g| g.name.as_str()).collect()
    }

    /// Names of groups explicitly marked active.
    pub fn active_names(&self) -> Vec<&str> {
        self.0
            .values()
            .filter(|g| g.active == Some(true))
            .map(|g| g.name.as_str())
            .collect()
    }

    /// Parameter map of the first group with the given name.
    pub fn values_by_name(&self, name: &str) -> Option<&BTreeMap<String, JsonValue>> {
        self.0.values().find(|g| g.name == name).map(|g| &g.value)
    }

    fn require_f64(&self, group: &str, key: &str) -> Result<f64> {
        self.values_by_name(group)
            .and_then(|v| v.get(key))
            .and_then(JsonValue::as_f64)
            .ok_or_else(|| LogError::MissingOption {
                group: group.to_string(),
                key: key.to_string(),
            })
    }

    /// Resolve a band-pass [`FilterSpec`] from the named group.
    ///
    /// Expected keys: `low`, `high`, `Fs`, `order`.
    pub fn filter_spec(&self, group: &str) -> Result<FilterSpec> {
        FilterSpec::new(
            self.require_f64(group, "low")?,
            self.require_f64(group, "high")?,
            self.require_f64(group, "Fs")?,
            self.require_f64(group, "order")? as usize,
        )
    }

    /// Resolve an [`EdgeDetectionConfig`] from the named group.
    ///
    /// Expected keys: `window ms`, `shift`, `scale`, `threshold`.
    pub fn edge_config(&self, group: &str) -> Result<EdgeDetectionConfig> {
        let window_ms = self.require_f64(group, "window ms")?;
        EdgeDetectionConfig::new(
            (window_ms * 1000.0) as i64,
            self.require_f64(group, "shift")? as usize,
            self.require_f64(group, "scale")?,
            self.require_f64(group, "threshold")?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "0": { "name": "sample frequency", "value": { "Fs": 1000.0 } },
        "1": {
            "name": "plot smoothed gradient",
            "active": true,
            "value": { "window ms": 50, "shift": 25, "scale": 500.0, "threshold": 5.0 }
        },
        "2": {
            "name": "bandpass",
            "active": false,
            "value": { "low": 5.0, "high": 50.0, "Fs": 1000.0, "order": 2 }
        }
    }"#;

    #[test]
    fn lists_names_and_active_groups() {
        let doc = OptionDocument::parse(DOC).unwrap();
        assert_eq!(
            doc.names(),
            vec!["sample frequency", "plot smoothed gradient", "bandpass"]
        );
        assert_eq!(doc.active_names(), vec!["plot smoothed gradient"]);
    }

    #[test]
    fn resolves_typed_configs() {
        let doc = OptionDocument::parse(DOC).unwrap();

        let spec = doc.filter_spec("bandpass").unwrap();
        assert_eq!(spec.low_hz, 5.0);
        assert_eq!(spec.order, 2);

        let cfg = doc.edge_config("plot smoothed gradient").unwrap();
        assert_eq!(cfg.window_us, 50_000);
        assert_eq!(cfg.shift, 25);
        assert_eq!(cfg.scale, 500.0);
    }

    #[test]
    fn missing_key_is_reported_with_group_and_key() {
        let doc = OptionDocument::parse(DOC).unwrap();
        let err = doc.edge_config("sample frequency").unwrap_err();
        assert!(matches!(
            err,
            LogError::MissingOption { ref group, ref key }
                if group == "sample frequency" && key == "window ms"
        ));
    }
}
