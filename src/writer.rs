use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::Path;

use indexmap::IndexSet;
use tracing::info;

use crate::error::{Error, Result};
use crate::section::{Package, Section, Value};

/// Render a section as a `config` block followed by one line per option value and
/// a blank separator line.
///
/// # Errors
///
/// Returns [`Error::InvalidSection`] if the type, name or origin path is empty.
pub fn render_section(section: &Section) -> Result<String> {
    let missing = if section.kind().is_empty() {
        Some("type")
    } else if section.name().is_empty() {
        Some("name")
    } else if section.path().as_os_str().is_empty() {
        Some("origin path")
    } else {
        None
    };

    if let Some(missing) = missing {
        return Err(Error::InvalidSection {
            name: section.name().to_owned(),
            missing,
        });
    }

    let mut text = format!("config {}", section.kind());
    if !section.is_anonymous() {
        _ = write!(text, " '{}'", section.name());
    }
    text.push('\n');

    for (option, value) in section.options() {
        match value {
            Value::Raw(value) => {
                _ = writeln!(text, "\toption {option} '{value}'");
            }
            Value::List(values) => {
                for value in values {
                    _ = writeln!(text, "\tlist {option} '{value}'");
                }
            }
        }
    }
    text.push('\n');

    Ok(text)
}

/// Append one section to the end of its origin file, creating the file if needed.
///
/// # Errors
///
/// Fails on invalid section metadata or if the file cannot be written.
pub fn write_section(section: &Section) -> Result<()> {
    let text = render_section(section)?;
    append(section.path(), &text)?;

    info!(
        section = section.name(),
        path = %section.path().display(),
        "wrote section",
    );
    Ok(())
}

/// Replace every file that holds a section of `package` with the in-memory sections.
///
/// Deletion is per file: anything else a removed file contained is lost, including
/// sections of other packages. A failure midway leaves the files already written.
///
/// # Errors
///
/// Fails before deleting anything if a section is invalid, otherwise on the first
/// delete or append that fails.
pub fn write_package(package: &Package) -> Result<()> {
    for section in package.sections() {
        render_section(section)?;
    }

    let files = package
        .sections()
        .map(Section::path)
        .collect::<IndexSet<&Path>>();

    for file in &files {
        fs::remove_file(file).map_err(Error::io(*file))?;
        info!(path = %file.display(), "deleted config file");
    }

    for file in files {
        // Without a header the package would be renamed after the file on the next read.
        if file.file_name().is_none_or(|name| name != package.name()) {
            append(file, &format!("package {}\n\n", package.name()))?;
        }
    }

    for section in package.sections() {
        write_section(section)?;
    }

    Ok(())
}

fn append(path: &Path, text: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(Error::io(path))?;

    file.write_all(text.as_bytes()).map_err(Error::io(path))
}
