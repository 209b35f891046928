//! Attribute decoding for resource configuration
//!
//! Configuration arrives as a JSON object. A [`Decoder`] reads attributes
//! out of it, recording a diagnostic for every problem instead of stopping
//! at the first, so a single validation pass reports everything.

pub mod validators;

use crate::diagnostics::{AttributePath, Diagnostic, Diagnostics};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

pub use validators::{
    at_least, list_size, one_of, string_length_at_least, string_length_between, valid_json,
};

pub type Object = Map<String, JsonValue>;

const TYPE_SUMMARY: &str = "Incorrect attribute value type";
const MISSING_SUMMARY: &str = "Missing required argument";

/// Collects diagnostics while reading attributes
#[derive(Debug, Default)]
pub struct Decoder {
    diagnostics: Diagnostics,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Record the outcome of a validator
    pub fn check(&mut self, result: Result<(), Diagnostic>) {
        if let Err(diagnostic) = result {
            self.push(diagnostic);
        }
    }

    pub fn has_error(&self) -> bool {
        self.diagnostics.has_error()
    }

    pub fn finish<T>(self, value: T) -> Result<T, Diagnostics> {
        self.diagnostics.into_result(value)
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    fn type_error(&mut self, path: &AttributePath, expected: &str) {
        let detail = if path.is_root() {
            format!("Inappropriate value for configuration: {} required.", expected)
        } else {
            format!(
                "Inappropriate value for attribute \"{}\": {} required.",
                path, expected
            )
        };
        self.push(Diagnostic::error(TYPE_SUMMARY, detail).at(path));
    }

    fn missing(&mut self, path: &AttributePath) {
        self.push(
            Diagnostic::error(
                MISSING_SUMMARY,
                format!(
                    "The argument \"{}\" is required, but no definition was found.",
                    path
                ),
            )
            .at(path),
        );
    }

    /// The configuration root, which must be an object
    pub fn root<'v>(&mut self, value: &'v JsonValue) -> Option<&'v Object> {
        match value {
            JsonValue::Object(map) => Some(map),
            _ => {
                self.type_error(&AttributePath::root(), "object");
                None
            }
        }
    }

    pub fn required_string(
        &mut self,
        object: &Object,
        parent: &AttributePath,
        name: &str,
    ) -> Option<String> {
        let path = parent.attr(name);
        match present(object, name) {
            None => {
                self.missing(&path);
                None
            }
            Some(value) => self.string_value(value, &path),
        }
    }

    pub fn optional_string(
        &mut self,
        object: &Object,
        parent: &AttributePath,
        name: &str,
    ) -> Option<String> {
        let value = present(object, name)?;
        self.string_value(value, &parent.attr(name))
    }

    pub fn optional_i64(
        &mut self,
        object: &Object,
        parent: &AttributePath,
        name: &str,
    ) -> Option<i64> {
        let value = present(object, name)?;
        match value.as_i64() {
            Some(number) => Some(number),
            None => {
                self.type_error(&parent.attr(name), "number");
                None
            }
        }
    }

    pub fn optional_bool(
        &mut self,
        object: &Object,
        parent: &AttributePath,
        name: &str,
    ) -> Option<bool> {
        let value = present(object, name)?;
        match value.as_bool() {
            Some(flag) => Some(flag),
            None => {
                self.type_error(&parent.attr(name), "bool");
                None
            }
        }
    }

    /// A list of strings; absent or null reads as empty
    pub fn string_list(
        &mut self,
        object: &Object,
        parent: &AttributePath,
        name: &str,
    ) -> Vec<String> {
        let path = parent.attr(name);
        let Some(value) = present(object, name) else {
            return Vec::new();
        };
        let Some(items) = value.as_array() else {
            self.type_error(&path, "list of string");
            return Vec::new();
        };

        let mut strings = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match item.as_str() {
                Some(s) => strings.push(s.to_string()),
                None => self.type_error(&path.index(index), "string"),
            }
        }
        strings
    }

    /// A list of nested blocks, paired with their paths
    pub fn object_list<'v>(
        &mut self,
        object: &'v Object,
        parent: &AttributePath,
        name: &str,
    ) -> Vec<(AttributePath, &'v Object)> {
        let path = parent.attr(name);
        let Some(value) = present(object, name) else {
            return Vec::new();
        };
        let Some(items) = value.as_array() else {
            self.type_error(&path, "list of object");
            return Vec::new();
        };

        let mut blocks = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match item.as_object() {
                Some(map) => blocks.push((path.index(index), map)),
                None => self.type_error(&path, "list of object"),
            }
        }
        blocks
    }

    /// Nested blocks with a bounded count
    pub fn blocks<'v>(
        &mut self,
        object: &'v Object,
        parent: &AttributePath,
        name: &str,
        min: usize,
        max: Option<usize>,
    ) -> Vec<(AttributePath, &'v Object)> {
        let well_typed = present(object, name).map_or(true, JsonValue::is_array);
        let blocks = self.object_list(object, parent, name);
        if well_typed {
            self.check(validators::list_size(&parent.attr(name), blocks.len(), min, max));
        }
        blocks
    }

    pub fn string_map(
        &mut self,
        object: &Object,
        parent: &AttributePath,
        name: &str,
    ) -> BTreeMap<String, String> {
        let path = parent.attr(name);
        let Some(value) = present(object, name) else {
            return BTreeMap::new();
        };
        let Some(map) = value.as_object() else {
            self.type_error(&path, "map of string");
            return BTreeMap::new();
        };

        let mut strings = BTreeMap::new();
        for (key, item) in map {
            match item.as_str() {
                Some(s) => {
                    strings.insert(key.clone(), s.to_string());
                }
                None => self.type_error(&path.key(key), "string"),
            }
        }
        strings
    }

    fn string_value(&mut self, value: &JsonValue, path: &AttributePath) -> Option<String> {
        match value.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                self.type_error(path, "string");
                None
            }
        }
    }
}

/// Whether an attribute is set, treating `null` as unset
pub fn is_set(object: &Object, name: &str) -> bool {
    present(object, name).is_some()
}

fn present<'v>(object: &'v Object, name: &str) -> Option<&'v JsonValue> {
    object.get(name).filter(|value| !value.is_null())
}
