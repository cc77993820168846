use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::section::{Package, Section, Value};
use crate::store::Store;
use crate::writer;

/// A read request. Which fields are present selects the lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GetRequest {
    pub package: Option<String>,
    pub section: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub option: Option<String>,
}

/// A write request. Without `option` it asks for a new section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SetRequest {
    pub package: Option<String>,
    pub section: Option<String>,
    pub option: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Packages { packages: Vec<String> },
    Package(Package),
    Section(SectionResponse),
    Sections(Package),
    /// Reserved for option-level lookups, which currently fail with
    /// [`Error::NotImplemented`].
    Value(Value),
}

/// Serializes as `{ "<section name>": { ... } }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionResponse(pub Section);

impl Serialize for SectionResponse {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.0.name(), &self.0)?;
        map.end()
    }
}

impl Store {
    /// Answer a read request.
    ///
    /// # Errors
    ///
    /// Propagates lookup errors; option-level lookups are [`Error::NotImplemented`].
    pub fn get(&self, request: &GetRequest) -> Result<Response> {
        let Some(package) = request.package.as_deref() else {
            return Ok(Response::Packages {
                packages: self.packages()?,
            });
        };

        match (&request.section, &request.kind, &request.option) {
            (Some(section), _, Some(option)) => self
                .option_of_section(package, section, option)
                .map(Response::Value),
            (Some(section), _, None) => Ok(Response::Section(SectionResponse(
                self.section(package, section)?,
            ))),
            (None, Some(kind), Some(option)) => self
                .option_of_type(package, kind, option)
                .map(Response::Value),
            (None, Some(kind), None) => {
                Ok(Response::Sections(self.sections_of_type(package, kind)?))
            }
            (None, None, _) => Ok(Response::Package(self.package(package)?)),
        }
    }

    /// Set one option of an existing section and rewrite every file of its package.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] before any I/O when `package`, `section` or
    /// `value` is absent or empty, [`Error::NotImplemented`] when `option` is,
    /// [`Error::InvalidValue`] when the option or value would not survive a rewrite,
    /// and lookup or write errors otherwise.
    pub fn set(&self, request: &SetRequest) -> Result<()> {
        let package = non_empty(request.package.as_deref()).ok_or(Error::MissingField("package"))?;
        let section = non_empty(request.section.as_deref()).ok_or(Error::MissingField("section"))?;
        let value = non_empty(request.value.as_deref()).ok_or(Error::MissingField("value"))?;

        let Some(option) = non_empty(request.option.as_deref()) else {
            return Err(Error::NotImplemented("adding a section"));
        };

        // Written as `option <name> '<value>'`: the name must stay one token and the
        // value one line without quotes.
        if option.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
            return Err(Error::InvalidValue {
                field: "option",
                value: option.to_owned(),
            });
        }
        if value.contains(['\n', '\r', '\'', '"']) {
            return Err(Error::InvalidValue {
                field: "value",
                value: value.to_owned(),
            });
        }

        let mut tree = self.package(package)?;
        tree.section_mut(section)
            .ok_or_else(|| Error::SectionNotFound(section.to_owned()))?
            .set(option, value);

        writer::write_package(&tree)?;
        info!(package, section, option, value, "option set");
        Ok(())
    }
}

fn non_empty(field: Option<&str>) -> Option<&str> {
    field.filter(|s| !s.is_empty())
}
