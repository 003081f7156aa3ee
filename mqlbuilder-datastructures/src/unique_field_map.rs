use linked_hash_map::LinkedHashMap;
use std::iter::{FromIterator, IntoIterator};
use thiserror::Error;

/// UniqueFieldMap is an insertion-ordered map from field names to values
/// that refuses to hold the same field name twice. Keyword arguments are
/// collected into one of these after alias resolution, so a field given
/// both under its canonical name and under an alias is caught here rather
/// than silently overwritten.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UniqueFieldMap<V>(LinkedHashMap<String, V>);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("duplicate field found: {0}")]
pub struct DuplicateFieldError(pub String);

impl DuplicateFieldError {
    pub fn get_field_name(self) -> String {
        self.0
    }
}

impl<V> UniqueFieldMap<V> {
    pub fn new() -> Self {
        Self(LinkedHashMap::new())
    }

    pub fn insert_many(
        &mut self,
        other: impl IntoIterator<Item = (String, V)>,
    ) -> Result<(), DuplicateFieldError> {
        for (k, v) in other {
            self.insert(k, v)?;
        }
        Ok(())
    }

    pub fn insert(&mut self, k: impl Into<String>, v: V) -> Result<(), DuplicateFieldError> {
        let k = k.into();
        if self.0.contains_key(&k) {
            return Err(DuplicateFieldError(k));
        }
        self.0.insert(k, v);
        Ok(())
    }

    pub fn get(&self, k: &str) -> Option<&V> {
        self.0.get(k)
    }

    /// Removes and returns the value for `k`. Fields are consumed this way
    /// as a constructor reads them, so whatever is left afterwards was never
    /// asked for.
    pub fn take(&mut self, k: &str) -> Option<V> {
        self.0.remove(k)
    }

    pub fn contains_key(&self, k: &str) -> bool {
        self.0.contains_key(k)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

impl<V> IntoIterator for UniqueFieldMap<V> {
    type Item = (String, V);
    type IntoIter = linked_hash_map::IntoIter<String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Collecting keeps the first value seen for a name. Use `insert_many` when
/// a repeated name must be reported instead.
impl<V> FromIterator<(String, V)> for UniqueFieldMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut map = LinkedHashMap::new();
        for (k, v) in iter {
            map.entry(k).or_insert(v);
        }
        Self(map)
    }
}
