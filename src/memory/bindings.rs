//! Ordered variable store
//!
//! [`Bindings`] maps variable names to values and remembers declaration order,
//! the same way a stack frame tracks `insertion_order` next to its locals. The
//! order only matters for display and for deterministic mismatch enumeration;
//! equality ignores it.

use super::value::Value;
use rustc_hash::FxHashMap;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: FxHashMap<String, Value>,
    insertion_order: Vec<String>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, keeping its original position if it was already bound.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if !self.values.contains_key(&name) {
            self.insertion_order.push(name.clone());
        }
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.values.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.insertion_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insertion_order.is_empty()
    }

    /// Names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.insertion_order.iter().map(String::as_str)
    }

    /// `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.insertion_order
            .iter()
            .filter_map(|name| self.values.get(name).map(|v| (name.as_str(), v)))
    }

    /// Overlay `other` on top of `self`; names already bound keep their position.
    pub fn extend_from(&mut self, other: &Bindings) {
        for (name, value) in other.iter() {
            self.set(name, value.clone());
        }
    }

    /// Unbind `name`, returning its value if it was bound.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let removed = self.values.remove(name)?;
        self.insertion_order.retain(|n| n != name);
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.insertion_order.clear();
    }
}

impl PartialEq for Bindings {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut bindings = Bindings::new();
        for (name, value) in iter {
            bindings.set(name, value);
        }
        bindings
    }
}

impl Serialize for Bindings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Bindings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BindingsVisitor;

        impl<'de> Visitor<'de> for BindingsVisitor {
            type Value = Bindings;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of variable names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Bindings, A::Error> {
                let mut bindings = Bindings::new();
                while let Some((name, value)) = access.next_entry::<String, Value>()? {
                    bindings.set(name, value);
                }
                Ok(bindings)
            }

            fn visit_unit<E>(self) -> Result<Bindings, E> {
                Ok(Bindings::new())
            }
        }

        deserializer.deserialize_any(BindingsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rebinding_keeps_position() {
        let mut b = Bindings::new();
        b.set("i", json!(0));
        b.set("sum", json!(0));
        b.set("i", json!(1));
        assert_eq!(b.names().collect::<Vec<_>>(), vec!["i", "sum"]);
        assert_eq!(b.get("i"), Some(&json!(1)));
    }

    #[test]
    fn test_serializes_in_declaration_order() {
        let b: Bindings = [("z", json!(1)), ("a", json!(2))].into_iter().collect();
        assert_eq!(serde_json::to_string(&b).unwrap(), r#"{"z":1,"a":2}"#);
    }

    #[test]
    fn test_deserialize_preserves_document_order() {
        let b: Bindings = serde_json::from_str(r#"{"sum": 10, "i": 4}"#).unwrap();
        assert_eq!(b.names().collect::<Vec<_>>(), vec!["sum", "i"]);
    }

    #[test]
    fn test_equality_ignores_order() {
        let a: Bindings = [("x", json!(1)), ("y", json!(2))].into_iter().collect();
        let b: Bindings = [("y", json!(2)), ("x", json!(1))].into_iter().collect();
        assert_eq!(a, b);
    }
}
