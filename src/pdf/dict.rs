//! PDF dictionary implementation

use std::collections::HashMap;
use std::fmt;
use super::{Name, ObjPtr, Object};

/// PDF dictionary object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    entries: HashMap<Name, Object>,
}

impl Dictionary {
    /// Create new dictionary
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Get value by key
    pub fn get(&self, key: &str) -> Option<&Object> {
        self.entries.get(key.as_bytes())
    }

    /// Get integer value
    pub fn get_integer(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Object::as_integer)
    }

    /// Get string value
    pub fn get_string(&self, key: &str) -> Option<&[u8]> {
        self.get(key).and_then(Object::as_string)
    }

    /// Get name value
    pub fn get_name(&self, key: &str) -> Option<&Name> {
        self.get(key).and_then(Object::as_name)
    }

    /// Get reference value
    pub fn get_reference(&self, key: &str) -> Option<ObjPtr> {
        self.get(key).and_then(Object::as_reference)
    }

    pub fn get_dict(&self, key: &str) -> Option<&Dictionary> {
        self.get(key).and_then(Object::as_dict)
    }

    pub fn get_array(&self, key: &str) -> Option<&[Object]> {
        self.get(key).and_then(Object::as_array)
    }

    /// Set value, returning the one it replaces
    pub fn insert(&mut self, key: impl Into<Name>, value: Object) -> Option<Object> {
        self.entries.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Object> {
        self.entries.remove(key.as_bytes())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Name> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Object)> {
        self.entries.iter()
    }
}

impl FromIterator<(Name, Object)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (Name, Object)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Dictionary {
    type Item = (Name, Object);
    type IntoIter = std::collections::hash_map::IntoIter<Name, Object>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Entries are written in key order so output is stable.
impl fmt::Display for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        f.write_str("<<")?;
        for (key, value) in entries {
            write!(f, " {} {}", key, value)?;
        }
        f.write_str(" >>")
    }
}
