use std::fs;
use std::io::{BufRead, BufReader};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::section::{Package, Section};

/// A single recognized line of a config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Package(String),
    Config { kind: String, name: Option<String> },
    Option { name: String, value: String },
    List { name: String, value: String },
}

impl Directive {
    /// Classify one line. Comments, blank lines, lines with fewer than two tokens and
    /// unknown keywords all yield `None`.
    ///
    /// Quote characters are dropped from every token wherever they appear, so quoted
    /// values cannot themselves contain quotes.
    #[must_use]
    pub fn classify(line: &str) -> Option<Self> {
        let line = line.trim_start();
        if line.starts_with('#') {
            return None;
        }

        let mut tokens = line
            .split_whitespace()
            .map(|token| token.replace(['\'', '"'], ""));

        let keyword = tokens.next()?;
        let first = tokens.next()?;
        let rest = tokens.collect::<Vec<String>>();

        match keyword.as_str() {
            "package" => Some(Self::Package(first)),
            "config" => Some(Self::Config {
                kind: first,
                name: if rest.is_empty() { None } else { Some(rest.join(" ")) },
            }),
            // Options without a value token are incomplete.
            "option" if !rest.is_empty() => Some(Self::Option {
                name: first,
                value: rest.join(" "),
            }),
            "list" if !rest.is_empty() => Some(Self::List {
                name: first,
                value: rest.join(" "),
            }),
            _ => None,
        }
    }
}

/// Represents an on-going parse of one file.
#[derive(Debug, Clone)]
pub struct Parser {
    path: PathBuf,
    package: Option<String>,
    current: Option<String>,
    anonymous: usize,
    sections: IndexMap<String, Section>,
}

impl Parser {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            package: None,
            current: None,
            anonymous: 0,
            sections: IndexMap::with_capacity(16),
        }
    }

    /// Apply one directive. Returns `Break` once the file's input should end, which
    /// happens when a second `package` line is seen.
    pub fn feed(&mut self, directive: Directive) -> ControlFlow<()> {
        trace!(?directive, "directive");

        match directive {
            Directive::Package(name) => {
                if let Some(package) = &self.package {
                    debug!(%package, ignored = %name, "second package directive ends the file");
                    return ControlFlow::Break(());
                }
                self.package = Some(name);
            }
            Directive::Config { kind, name } => {
                let (name, anonymous) = match name {
                    Some(name) => (name, false),
                    None => {
                        let name = format!("anonymous{}", self.anonymous);
                        self.anonymous += 1;
                        (name, true)
                    }
                };

                // A repeated name replaces the earlier section but keeps its position.
                let section = Section::new(kind, name.clone(), self.path.clone(), anonymous);
                self.sections.insert(name.clone(), section);
                self.current = Some(name);
            }
            Directive::Option { name, value } => {
                if let Some(section) = self.current_section() {
                    section.set(name, value);
                }
            }
            Directive::List { name, value } => {
                if let Some(section) = self.current_section() {
                    section.push(name, value);
                }
            }
        }

        ControlFlow::Continue(())
    }

    fn current_section(&mut self) -> Option<&mut Section> {
        let current = self.current.as_deref()?;
        self.sections.get_mut(current)
    }

    /// Finish the parse. Without a `package` directive the file's base name is used.
    #[must_use]
    pub fn finish(self) -> Package {
        let name = self.package.unwrap_or_else(|| {
            self.path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        let mut package = Package::new(name);
        for section in self.sections.into_values() {
            package.insert(section);
        }
        package
    }
}

/// Parse a stream of lines read from `path`.
///
/// # Errors
///
/// Any read failure aborts the parse; no partial package is returned. Bytes that are
/// not valid UTF-8 are replaced with U+FFFD rather than failing the read.
pub fn parse_reader<R: BufRead>(mut reader: R, path: &Path) -> Result<Package> {
    let mut parser = Parser::new(path);
    let mut buffer = Vec::with_capacity(256);

    loop {
        buffer.clear();
        if reader
            .read_until(b'\n', &mut buffer)
            .map_err(Error::io(path))?
            == 0
        {
            break;
        }

        let raw = buffer.strip_suffix(b"\n").unwrap_or(&buffer);
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let line = String::from_utf8_lossy(raw);

        let Some(directive) = Directive::classify(&line) else {
            if !line.trim().is_empty() {
                trace!(path = %path.display(), %line, "skipping line");
            }
            continue;
        };

        if parser.feed(directive).is_break() {
            break;
        }
    }

    let package = parser.finish();
    debug!(
        path = %path.display(),
        package = package.name(),
        sections = package.len(),
        "parsed file",
    );
    Ok(package)
}

/// Parse one config file from disk.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read.
pub fn parse_file(path: &Path) -> Result<Package> {
    let file = fs::File::open(path).map_err(Error::io(path))?;
    parse_reader(BufReader::new(file), path)
}
