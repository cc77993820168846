use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use indexmap::IndexSet;
use tracing::debug;

use crate::config::{AnonymousNaming, Settings};
use crate::error::{Error, Result};
use crate::parser;
use crate::section::{Package, Section, Value};

/// A directory tree of config files, read and written one file at a time.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
    naming: AnonymousNaming,
}

impl Store {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            naming: AnonymousNaming::default(),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.root).with_naming(settings.anonymous_naming)
    }

    #[must_use]
    pub fn with_naming(mut self, naming: AnonymousNaming) -> Self {
        self.naming = naming;
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every regular file under the root, sorted by name within each directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Walk`] if the root or any directory below it cannot be listed.
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .standard_filters(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            if entry.file_type().is_some_and(|t| t.is_file()) {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Distinct package names in the order they are first found.
    ///
    /// # Errors
    ///
    /// Fails on the first file that cannot be listed or read.
    pub fn packages(&self) -> Result<Vec<String>> {
        let mut names = IndexSet::new();

        for file in self.files()? {
            let package = parser::parse_file(&file)?;
            names.insert(package.name().to_owned());
        }

        Ok(names.into_iter().collect())
    }

    /// Parse every file and merge those declaring `name`, later files winning on
    /// section name collisions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PackageNotFound`] if no file belongs to `name`, or the first
    /// I/O error encountered.
    pub fn package(&self, name: &str) -> Result<Package> {
        let mut merged = Package::new(name.to_owned());
        let mut found = false;
        let mut anonymous = 0;

        for file in self.files()? {
            let mut package = parser::parse_file(&file)?;
            if package.name() != name {
                continue;
            }

            if self.naming == AnonymousNaming::PerPackage {
                package = renumber(package, &mut anonymous);
            }

            debug!(file = %file.display(), package = name, "merging");
            merged.merge(package);
            found = true;
        }

        if found {
            Ok(merged)
        } else {
            Err(Error::PackageNotFound(name.to_owned()))
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::PackageNotFound`] or [`Error::SectionNotFound`] when either is absent.
    pub fn section(&self, package: &str, section: &str) -> Result<Section> {
        self.package(package)?
            .into_sections()
            .find(|s| s.name() == section)
            .ok_or_else(|| Error::SectionNotFound(section.to_owned()))
    }

    /// All sections of type `kind`; an empty list when none match.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PackageNotFound`] if the package itself is absent.
    pub fn sections_of_type(&self, package: &str, kind: &str) -> Result<Package> {
        let mut typed = Package::new(package.to_owned());
        for section in self.package(package)?.into_sections() {
            if section.kind() == kind {
                typed.insert(section);
            }
        }
        Ok(typed)
    }

    /// # Errors
    ///
    /// Always [`Error::NotImplemented`].
    pub fn option_of_section(
        &self,
        _package: &str,
        _section: &str,
        _option: &str,
    ) -> Result<Value> {
        Err(Error::NotImplemented("option lookup by section name"))
    }

    /// # Errors
    ///
    /// Always [`Error::NotImplemented`].
    pub fn option_of_type(&self, _package: &str, _kind: &str, _option: &str) -> Result<Value> {
        Err(Error::NotImplemented("option lookup by section type"))
    }
}

/// Give the anonymous sections of one parsed file names from a package-wide counter.
fn renumber(package: Package, counter: &mut usize) -> Package {
    let mut renamed = Package::new(package.name().to_owned());

    for mut section in package.into_sections() {
        if section.is_anonymous() {
            section.rename(format!("anonymous{counter}"));
            *counter += 1;
        }
        renamed.insert(section);
    }

    renamed
}
