use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uci::{AnonymousNaming, GetRequest, SetRequest, Settings, Store};

#[derive(Debug, Parser)]
#[command(version, about = "Read and edit uci-style configuration directories")]
struct Cli {
    /// Directory holding the config files (overrides settings)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// TOML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Restart anonymous section numbering in every file
    #[arg(long, global = true)]
    per_file_anonymous: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print packages, sections or sections of a type as JSON
    Get(GetArgs),
    /// Set an option of an existing section
    Set(SetArgs),
    /// Parse one file and print it back as config text
    Dump { path: PathBuf },
}

#[derive(Debug, Args)]
struct GetArgs {
    #[arg(long)]
    package: Option<String>,
    #[arg(long)]
    section: Option<String>,
    #[arg(long = "type")]
    kind: Option<String>,
    #[arg(long)]
    option: Option<String>,
}

#[derive(Debug, Args)]
struct SetArgs {
    #[arg(long)]
    package: Option<String>,
    #[arg(long)]
    section: Option<String>,
    #[arg(long)]
    option: Option<String>,
    #[arg(long)]
    value: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    if let Some(root) = cli.root {
        settings.root = root;
    }
    if cli.per_file_anonymous {
        settings.anonymous_naming = AnonymousNaming::PerFile;
    }
    let store = Store::from_settings(&settings);
    tracing::debug!(
        root = %store.root().display(),
        naming = ?settings.anonymous_naming,
        "settings loaded",
    );

    match cli.command {
        Command::Get(args) => {
            let request = GetRequest {
                package: args.package,
                section: args.section,
                kind: args.kind,
                option: args.option,
            };
            let response = store.get(&request)?;
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &response)?;
            writeln!(stdout)?;
        }
        Command::Set(args) => {
            let request = SetRequest {
                package: args.package,
                section: args.section,
                option: args.option,
                value: args.value,
            };
            store.set(&request)?;
        }
        Command::Dump { path } => {
            let package = uci::parse_file(&path)?;
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "package {}\n", package.name())?;
            for section in package.sections() {
                write!(stdout, "{}", uci::writer::render_section(section)?)?;
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
