use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to list config directory")]
    Walk(#[from] ignore::Error),

    /// A section is missing metadata required to write it back.
    #[error("section {name:?} is missing its {missing}")]
    InvalidSection { name: String, missing: &'static str },

    /// A request is missing a field required before any file is touched.
    #[error("missing package, section or value (no {0})")]
    MissingField(&'static str),

    /// A request value that cannot be written back as a single quoted token.
    #[error("{field} {value:?} cannot be written to a config file")]
    InvalidValue { field: &'static str, value: String },

    #[error("no such package: {0}")]
    PackageNotFound(String),

    #[error("no such section: {0}")]
    SectionNotFound(String),

    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("invalid settings")]
    Config(#[from] ::config::ConfigError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
