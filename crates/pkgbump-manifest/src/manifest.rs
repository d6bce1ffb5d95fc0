use std::str::FromStr;

use serde::{
    de::Error as _,
    ser::{SerializeMap, Serializer},
    Deserialize, Deserializer, Serialize,
};
use serde_json::{ser::PrettyFormatter, Map, Value};

use crate::{
    error::{json_type_name, ManifestError},
    table::DependencyTable,
};

pub const VERSION_KEY: &str = "version";

/// Which dependency table an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    Dependencies,
    DevDependencies,
}

impl DependencyKind {
    pub fn key(self) -> &'static str {
        match self {
            DependencyKind::Dependencies => "dependencies",
            DependencyKind::DevDependencies => "devDependencies",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "dependencies" => Some(DependencyKind::Dependencies),
            "devDependencies" => Some(DependencyKind::DevDependencies),
            _ => None,
        }
    }
}

/// On-disk JSON package manifest (`package.json` and friends).
///
/// The fields the tool edits are typed when well formed; every other
/// top-level value, including a mis-shaped typed field, is kept verbatim in
/// `extra`. `layout` records the top-level key order so a
/// load/save cycle leaves untouched keys where they were.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    version: Option<String>,
    dependencies: Option<DependencyTable>,
    dev_dependencies: Option<DependencyTable>,
    extra: Map<String, Value>,
    layout: Vec<String>,
}

impl Manifest {
    pub fn from_value(value: Value) -> Result<Self, ManifestError> {
        let object = match value {
            Value::Object(object) => object,
            other => return Err(ManifestError::NotAnObject(json_type_name(&other))),
        };

        let mut manifest = Manifest::default();
        for (key, value) in object {
            manifest.layout.push(key.clone());
            match (DependencyKind::from_key(&key), value) {
                (Some(_), Value::Null) => {}
                (Some(kind), Value::Object(table)) => {
                    *manifest.slot_mut(kind) = Some(DependencyTable::from_map(table));
                }
                (None, Value::Null) if key == VERSION_KEY => {}
                (None, Value::String(version)) if key == VERSION_KEY => {
                    manifest.version = Some(version);
                }
                // Anything else, including a typed key with an unexpected shape, stays raw.
                (_, value) => {
                    manifest.extra.insert(key, value);
                }
            }
        }
        Ok(manifest)
    }

    /// The version if it is a plain string.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// String form of whatever `version` holds; a missing or `null` version has none.
    pub fn version_text(&self) -> Option<String> {
        match &self.version {
            Some(version) => Some(version.clone()),
            None => self.extra.get(VERSION_KEY).and_then(value_text),
        }
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.touch(VERSION_KEY);
        self.extra.remove(VERSION_KEY);
        self.version = Some(version.into());
    }

    pub fn table(&self, kind: DependencyKind) -> Option<&DependencyTable> {
        match kind {
            DependencyKind::Dependencies => self.dependencies.as_ref(),
            DependencyKind::DevDependencies => self.dev_dependencies.as_ref(),
        }
    }

    /// Returns the requested table, creating an empty one if the manifest has
    /// none or holds something other than an object under that key.
    pub fn table_mut_or_default(&mut self, kind: DependencyKind) -> &mut DependencyTable {
        self.touch(kind.key());
        self.extra.remove(kind.key());
        self.slot_mut(kind).get_or_insert_with(DependencyTable::default)
    }

    /// Raw top-level value for keys the tool does not model, or typed keys
    /// whose value has an unexpected shape.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Top-level keys in the order they will be written.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.layout.iter().map(String::as_str)
    }

    /// Pretty JSON with 4-space indentation and no trailing newline.
    pub fn to_json_string(&self) -> Result<String, ManifestError> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(buf).map_err(|err| ManifestError::Encoding(err.to_string()))
    }

    fn slot_mut(&mut self, kind: DependencyKind) -> &mut Option<DependencyTable> {
        match kind {
            DependencyKind::Dependencies => &mut self.dependencies,
            DependencyKind::DevDependencies => &mut self.dev_dependencies,
        }
    }

    // New keys go after every existing key, like assigning a fresh property on a JS object.
    fn touch(&mut self, key: &str) {
        if !self.layout.iter().any(|existing| existing == key) {
            self.layout.push(key.to_string());
        }
    }
}

/// String form of a raw JSON value the way a host prints it: strings as is,
/// everything else as compact JSON, `null` as nothing.
pub(crate) fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

impl FromStr for Manifest {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: Value = serde_json::from_str(s)?;
        Manifest::from_value(value)
    }
}

impl Serialize for Manifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.layout.len()))?;
        for key in &self.layout {
            if let Some(value) = self.extra.get(key) {
                map.serialize_entry(key, value)?;
            } else if key == VERSION_KEY {
                map.serialize_entry(key, &self.version)?;
            } else if let Some(kind) = DependencyKind::from_key(key) {
                map.serialize_entry(key, &self.table(kind))?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Manifest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Manifest::from_value(value).map_err(D::Error::custom)
    }
}
