use crate::color::HexColor;
use std::collections::HashMap;

/// Value of a custom property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// `bool` property.
    Bool(bool),
    /// `int` or `object` property.
    I64(i64),
    /// `float` property.
    F32(f32),
    /// `string` or `class` property.
    String(String),
    /// `color` property.
    Color(HexColor),
    /// `file` property, a path relative to the declaring document.
    File(String),
}

/// Custom properties keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    values: HashMap<String, PropertyValue>,
}

impl Properties {
    /// Empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a property.
    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.values.insert(name.into(), value);
    }

    /// Raw access to a property.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` when there are no properties.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(name, value)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Boolean property.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer property, when it fits an `i64`.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            PropertyValue::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer property, when it fits an `i32`.
    pub fn get_i32(&self, name: &str) -> Option<i32> {
        self.get_i64(name).and_then(|v| i32::try_from(v).ok())
    }

    /// Float property. Integer values are widened.
    pub fn get_f32(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            PropertyValue::F32(v) => Some(*v),
            PropertyValue::I64(v) => Some(*v as f32),
            _ => None,
        }
    }

    /// String or file property.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            PropertyValue::String(v) | PropertyValue::File(v) => Some(v),
            _ => None,
        }
    }

    /// Color property.
    pub fn get_color(&self, name: &str) -> Option<HexColor> {
        match self.get(name)? {
            PropertyValue::Color(c) => Some(*c),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_getters_only_match_their_type() {
        let mut props = Properties::new();
        props.insert("solid", PropertyValue::Bool(true));
        props.insert("hp", PropertyValue::I64(5_000_000_000));
        props.insert("name", PropertyValue::String("door".into()));

        assert_eq!(props.get_bool("solid"), Some(true));
        assert_eq!(props.get_i64("hp"), Some(5_000_000_000));
        assert_eq!(props.get_i32("hp"), None);
        assert_eq!(props.get_f32("hp"), Some(5_000_000_000.0));
        assert_eq!(props.get_string("name"), Some("door"));
        assert_eq!(props.get_bool("name"), None);
        assert_eq!(props.len(), 3);
    }
}
