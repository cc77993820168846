use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A `config` block: its metadata plus the options set inside it, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    kind: String,
    name: String,
    path: PathBuf,
    anonymous: bool,
    options: IndexMap<String, Value>,
}

impl Section {
    #[must_use]
    pub fn new(kind: String, name: String, path: PathBuf, anonymous: bool) -> Self {
        Self {
            kind,
            name,
            path,
            anonymous,
            options: IndexMap::new(),
        }
    }

    /// The declared section type, e.g. `interface` in `config interface 'lan'`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The file this section was read from and will be written back to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    #[must_use]
    pub fn get(&self, option: &str) -> Option<&Value> {
        self.options.get(option)
    }

    pub fn options(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Set or overwrite an option, keeping its original position if it already existed.
    pub fn set(&mut self, option: impl Into<String>, value: impl Into<Value>) {
        self.options.insert(option.into(), value.into());
    }

    /// Append to a list option. A missing option starts a new list; a scalar is
    /// promoted to a list holding the old value first.
    pub fn push(&mut self, option: impl Into<String>, value: String) {
        let slot = self
            .options
            .entry(option.into())
            .or_insert_with(|| Value::List(Vec::with_capacity(1)));

        match slot {
            Value::List(values) => values.push(value),
            Value::Raw(old) => {
                let old = std::mem::take(old);
                *slot = Value::List(vec![old, value]);
            }
        }
    }

    pub(crate) fn rename(&mut self, name: String) {
        self.name = name;
    }
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.options.len() + 4))?;
        map.serialize_entry(".type", &self.kind)?;
        map.serialize_entry(".name", &self.name)?;
        map.serialize_entry(".anonymous", &self.anonymous)?;
        map.serialize_entry(".path", &self.path)?;
        for (option, value) in &self.options {
            map.serialize_entry(option, value)?;
        }
        map.end()
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Set by an `option` directive.
    Raw(String),
    /// Built up by repeated `list` directives, in order of appearance.
    List(Vec<String>),
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Raw(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Raw(value.to_owned())
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::List(value)
    }
}

/// Every section belonging to one package name, keyed by section name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    name: String,
    sections: IndexMap<String, Section>,
}

impl Package {
    #[must_use]
    pub fn new(name: String) -> Self {
        Self {
            name,
            sections: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.get_mut(name)
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Insert a section under its own name, returning the one it replaced.
    pub fn insert(&mut self, section: Section) -> Option<Section> {
        self.sections.insert(section.name().to_owned(), section)
    }

    /// Merge `other` into `self`; a section present in both is replaced wholesale.
    pub fn merge(&mut self, other: Package) {
        for section in other.sections.into_values() {
            if let Some(old) = self.insert(section) {
                tracing::warn!(
                    package = %self.name,
                    section = old.name(),
                    replaced = %old.path().display(),
                    "section overwritten during merge",
                );
            }
        }
    }

    pub(crate) fn into_sections(self) -> impl Iterator<Item = Section> {
        self.sections.into_values()
    }
}

impl Serialize for Package {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.sections)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lan() -> Section {
        Section::new(
            "interface".to_owned(),
            "lan".to_owned(),
            PathBuf::from("/cfg/network"),
            false,
        )
    }

    #[test]
    fn push_promotes_scalar() {
        let mut section = lan();
        section.set("dns", "1.1.1.1");
        section.push("dns", "8.8.8.8".to_owned());

        assert_eq!(
            section.get("dns"),
            Some(&Value::List(vec!["1.1.1.1".to_owned(), "8.8.8.8".to_owned()]))
        );
    }

    #[test]
    fn set_keeps_option_position() {
        let mut section = lan();
        section.set("proto", "static");
        section.set("ipaddr", "192.168.1.1");
        section.set("proto", "dhcp");

        let names = section.options().map(|(k, _)| k).collect::<Vec<_>>();
        assert_eq!(names, ["proto", "ipaddr"]);
        assert_eq!(section.get("proto"), Some(&Value::from("dhcp")));
    }

    #[test]
    fn merge_replaces_whole_section() {
        let mut first = lan();
        first.set("proto", "static");
        first.set("ipaddr", "192.168.1.1");

        let mut second = lan();
        second.set("proto", "dhcp");

        let mut package = Package::new("network".to_owned());
        package.insert(first);

        let mut other = Package::new("network".to_owned());
        other.insert(second.clone());
        package.merge(other);

        assert_eq!(package.section("lan"), Some(&second));
        assert_eq!(package.section("lan").and_then(|s| s.get("ipaddr")), None);
    }

    #[test]
    fn serializes_metadata_then_options() {
        let mut section = lan();
        section.set("proto", "static");
        section.push("dns", "8.8.8.8".to_owned());

        let json = serde_json::to_value(&section).expect("section is always serializable");

        assert_eq!(
            json,
            serde_json::json!({
                ".type": "interface",
                ".name": "lan",
                ".anonymous": false,
                ".path": "/cfg/network",
                "proto": "static",
                "dns": ["8.8.8.8"],
            })
        );
    }
}
