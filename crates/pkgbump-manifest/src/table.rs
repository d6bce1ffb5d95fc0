use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::manifest::value_text;

/// One entry of a dependency table.
///
/// Anything that is not a plain version string is carried through untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum DependencySpec {
    Version(String),
    Other(Value),
}

impl DependencySpec {
    pub fn as_version(&self) -> Option<&str> {
        match self {
            DependencySpec::Version(version) => Some(version),
            DependencySpec::Other(_) => None,
        }
    }

    /// String form as a host would print it; `null` has none.
    pub fn text(&self) -> Option<String> {
        match self {
            DependencySpec::Version(version) => Some(version.clone()),
            DependencySpec::Other(value) => value_text(value),
        }
    }
}

impl From<Value> for DependencySpec {
    fn from(value: Value) -> Self {
        match value {
            Value::String(version) => DependencySpec::Version(version),
            other => DependencySpec::Other(other),
        }
    }
}

impl Serialize for DependencySpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DependencySpec::Version(version) => serializer.serialize_str(version),
            DependencySpec::Other(value) => value.serialize(serializer),
        }
    }
}

/// Name-to-spec map that keeps insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyTable {
    entries: Vec<(String, DependencySpec)>,
}

impl DependencyTable {
    pub(crate) fn from_map(object: Map<String, Value>) -> Self {
        let entries = object
            .into_iter()
            .map(|(name, spec)| (name, DependencySpec::from(spec)))
            .collect();
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&DependencySpec> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, spec)| spec)
    }

    /// Version string for `name`, if the entry is a plain string.
    pub fn version(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(DependencySpec::as_version)
    }

    /// Inserts or replaces; a replaced entry keeps its position.
    pub fn set(&mut self, name: impl Into<String>, version: impl Into<String>) {
        let name = name.into();
        let spec = DependencySpec::Version(version.into());
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = spec,
            None => self.entries.push((name, spec)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<DependencySpec> {
        let index = self.entries.iter().position(|(existing, _)| existing == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DependencySpec)> {
        self.entries.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for DependencyTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, spec) in &self.entries {
            map.serialize_entry(name, spec)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(value: Value) -> DependencyTable {
        match value {
            Value::Object(object) => DependencyTable::from_map(object),
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn set_replaces_in_place_and_appends_new_names() {
        let mut deps = DependencyTable::default();
        deps.set("b", "1");
        deps.set("a", "2");
        deps.set("b", "3");
        let names: Vec<_> = deps.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(deps.version("b"), Some("3"));
    }

    #[test]
    fn remove_returns_previous_spec() {
        let mut deps = table(json!({ "left-pad": "1.0.0", "react": "18.0.0" }));
        assert_eq!(
            deps.remove("left-pad"),
            Some(DependencySpec::Version("1.0.0".into()))
        );
        assert_eq!(deps.remove("left-pad"), None);
        assert_eq!(deps.len(), 1);
    }

    #[test]
    fn non_string_entries_are_kept_verbatim() {
        let deps = table(json!({ "jest": 29, "b": { "version": "2" }, "c": null }));
        assert_eq!(deps.version("jest"), None);
        assert_eq!(deps.get("jest").unwrap().text().as_deref(), Some("29"));
        assert_eq!(
            deps.get("b").unwrap().text().as_deref(),
            Some(r#"{"version":"2"}"#)
        );
        assert_eq!(deps.get("c").unwrap().text(), None);
        assert_eq!(
            serde_json::to_value(&deps).unwrap(),
            json!({ "jest": 29, "b": { "version": "2" }, "c": null })
        );
    }

    #[test]
    fn set_overwrites_non_string_entry() {
        let mut deps = table(json!({ "b": { "version": "2" } }));
        deps.set("b", "3.0.0");
        assert_eq!(deps.version("b"), Some("3.0.0"));
    }
}
