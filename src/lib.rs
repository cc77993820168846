#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]

//! Reader and writer for uci-style configuration directories.
//!
//! Each file holds one package made of `config` sections carrying `option` and
//! `list` values:
//!
//! ```text
//! package network
//!
//! config interface 'lan'
//!     option proto 'static'
//!     list dns '1.1.1.1'
//! ```
//!
//! Files are parsed leniently (unknown or incomplete lines are skipped), merged by
//! package name across a directory, and written back by regenerating whole files.

pub mod config;
mod error;
pub mod parser;
pub mod query;
mod section;
pub mod store;
pub mod writer;

pub use crate::config::{AnonymousNaming, Settings};
pub use crate::error::{Error, Result};
pub use crate::parser::{Directive, parse_file, parse_reader};
pub use crate::query::{GetRequest, Response, SetRequest};
pub use crate::section::{Package, Section, Value};
pub use crate::store::Store;
