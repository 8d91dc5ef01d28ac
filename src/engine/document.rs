//! Documents as handed to the writer and as read back from stored fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field name to text. Which fields get indexed, stored or vectorized is
/// decided by the writer's field options, not by the document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    values: BTreeMap<String, String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::default()
    }

    /// Sets `name` to `value`. A field holds a single value; the last write
    /// wins.
    pub fn add_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get_field(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// `(name, value)` pairs sorted by name.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct DocumentBuilder(Document);

impl DocumentBuilder {
    pub fn add_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.add_field(name, value);
        self
    }

    pub fn build(self) -> Document {
        self.0
    }
}
