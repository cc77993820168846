use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

pub const DEFAULT_ROOT: &str = "/etc/config";

/// How synthesized names of anonymous sections are numbered when several files
/// contribute to one package.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnonymousNaming {
    /// Counter restarts in every file, so `anonymous0` of one file replaces
    /// `anonymous0` of another when they share a package.
    PerFile,
    /// One counter per package, advanced in merge order.
    #[default]
    PerPackage,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Directory scanned recursively for config files.
    pub root: PathBuf,
    #[serde(default)]
    pub anonymous_naming: AnonymousNaming,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            anonymous_naming: AnonymousNaming::default(),
        }
    }
}

impl Settings {
    /// Layer built-in defaults, an optional TOML file and `UCI_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if a source is malformed or a value has the wrong type.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder()
            .set_default("root", DEFAULT_ROOT)?
            .set_default("anonymous_naming", "per-package")?;

        if let Some(file) = file {
            builder = builder.add_source(::config::File::from(file).required(false));
        }

        let settings = builder
            .add_source(::config::Environment::with_prefix("UCI"))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn defaults_without_sources() {
        let settings = Settings::load(None).expect("defaults are always valid");

        assert_eq!(settings.root, PathBuf::from(DEFAULT_ROOT));
        assert_eq!(settings.anonymous_naming, AnonymousNaming::PerPackage);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let file = dir.path().join("uci.toml");
        fs::write(&file, "root = \"/tmp/cfg\"\nanonymous_naming = \"per-file\"\n")
            .expect("failed to write settings");

        let settings = Settings::load(Some(&file)).expect("failed to load settings");

        assert_eq!(settings.root, PathBuf::from("/tmp/cfg"));
        assert_eq!(settings.anonymous_naming, AnonymousNaming::PerFile);
    }

    #[test]
    fn missing_file_is_optional() {
        let settings = Settings::load(Some(Path::new("/nonexistent/uci.toml")))
            .expect("missing settings file is not an error");

        assert_eq!(settings, Settings::default());
    }
}
