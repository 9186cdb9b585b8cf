//! Flattened attribute sets of matching application keys.

use crate::matcher::is_display_name;
use crate::value::ValueData;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Every attribute of one application key, keyed by attribute name.
///
/// Names keep their stored case. Keys iterate (and serialize) in sorted
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttributeRecord(BTreeMap<String, ValueData>);

/// One search hit.
pub type MatchResult = AttributeRecord;

impl AttributeRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute; a later insert of the same name wins.
    pub fn insert(&mut self, name: impl Into<String>, value: ValueData) {
        self.0.insert(name.into(), value);
    }

    /// Looks up an attribute by its exact name.
    pub fn get(&self, name: &str) -> Option<&ValueData> {
        self.0.get(name)
    }

    /// Text of the `DisplayName` attribute, however its name is cased.
    pub fn display_name(&self) -> Option<Cow<'_, str>> {
        self.0
            .iter()
            .find(|(name, _)| is_display_name(name))
            .map(|(_, value)| value.text())
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the record has no attributes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValueData)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>> FromIterator<(K, ValueData)> for AttributeRecord {
    fn from_iter<I: IntoIterator<Item = (K, ValueData)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}
