//! Desk CLI
//!
//! `deskctl` loads a desk file (schema, structure and document node
//! settings in YAML) and runs one operation on it:
//!
//! - `validate`: resolve every list in the structure and report the panes
//! - `resolve`: print the router panes that open an intent
//! - `projection`: print the orderings of a document type with their
//!   extended projections

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod desk;
pub mod structure_file;

pub use config::{DeskFile, LogConfig, LogFormat, ProjectionConfig};
pub use desk::{Desk, DeskError, OrderingProjection, PaneSummary, MAX_VALIDATION_DEPTH};
pub use structure_file::{document_node_hook, DocumentNodeSpec, NodeSpec, StructureFileError, ViewSpec};

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use desk_structure::{IntentParams, EDIT};
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command line of `deskctl`
#[must_use]
pub fn cli() -> Command {
    Command::new("deskctl")
        .version(VERSION)
        .about("Validate desk structures and resolve intents against them")
        .subcommand_required(true)
        .arg(
            Arg::new("file")
                .long("file")
                .short('f')
                .global(true)
                .default_value("desk.yaml")
                .value_parser(value_parser!(PathBuf))
                .help("Desk file to load"),
        )
        .subcommand(Command::new("validate").about("Resolve every list in the structure"))
        .subcommand(
            Command::new("resolve")
                .about("Print the panes that open an intent")
                .arg(Arg::new("id").long("id").required(true).help("Target document id"))
                .arg(Arg::new("type").long("type").help("Target document type"))
                .arg(
                    Arg::new("intent")
                        .long("intent")
                        .default_value(EDIT)
                        .help("Intent name"),
                )
                .arg(
                    Arg::new("param")
                        .long("param")
                        .action(ArgAction::Append)
                        .value_parser(parse_param)
                        .help("Extra intent parameter as key=value"),
                )
                .arg(Arg::new("payload").long("payload").help("Intent payload as JSON")),
        )
        .subcommand(
            Command::new("projection")
                .about("Print the orderings of a document type")
                .arg(Arg::new("type").long("type").required(true).help("Document type")),
        )
}

/// Split a `key=value` parameter
///
/// # Errors
/// Fails when there is no `=` or the key is empty.
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got `{raw}`")),
    }
}

/// Install the global subscriber, writing to stderr
///
/// `RUST_LOG` overrides the configured level.
///
/// # Errors
/// Fails when the level is not a valid filter or a subscriber is already set.
pub fn init_tracing(config: &LogConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .with_context(|| format!("invalid log level `{}`", config.level))?,
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = match config.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|err| anyhow::anyhow!(err))
}

/// Run the subcommand in `matches` against `file`, returning its JSON output
///
/// # Errors
/// Fails when the desk does not load or the operation fails.
pub async fn run(file: &DeskFile, matches: &ArgMatches) -> anyhow::Result<Value> {
    let desk = Desk::from_file(file)?;
    match matches.subcommand() {
        Some(("validate", _)) => {
            let panes = desk.validate().await.map_err(describe)?;
            Ok(serde_json::to_value(panes)?)
        }
        Some(("resolve", args)) => {
            let mut params = IntentParams::new();
            if let Some(id) = args.get_one::<String>("id") {
                params = params.with("id", id.as_str());
            }
            if let Some(type_name) = args.get_one::<String>("type") {
                params = params.with("type", type_name.as_str());
            }
            for (key, value) in args.get_many::<(String, String)>("param").into_iter().flatten() {
                params = params.with(key.as_str(), value.as_str());
            }
            let payload = args
                .get_one::<String>("payload")
                .map(|raw| serde_json::from_str::<Value>(raw))
                .transpose()
                .context("payload is not valid JSON")?;
            let intent = args.get_one::<String>("intent").map_or(EDIT, String::as_str);
            let panes = desk.resolve(intent, params, payload).await.map_err(describe)?;
            Ok(serde_json::to_value(panes)?)
        }
        Some(("projection", args)) => {
            let type_name = args.get_one::<String>("type").map_or("", String::as_str);
            Ok(serde_json::to_value(desk.projections(type_name)?)?)
        }
        Some((other, _)) => anyhow::bail!("unknown command `{other}`"),
        None => anyhow::bail!("no command given"),
    }
}

/// Attach the failing pane's position to resolution errors
fn describe(err: DeskError) -> anyhow::Error {
    let DeskError::Resolution(resolution) = &err else {
        return err.into();
    };
    let ctx = resolution.context();
    let at = ctx.path.join("/");
    let position = match resolution.help_id() {
        Some(help_id) => format!("pane `{}` at /{at} (see {help_id})", ctx.id),
        None => format!("pane `{}` at /{at}", ctx.id),
    };
    anyhow::Error::new(err).context(position)
}
