pub mod check;
pub mod config;
pub mod create;
pub mod properties;

use std::path::PathBuf;

use appdb::utils::parse_property;
use appdb::{AppDbConfig, OutputFormat, Properties};
use clap::Args;
use serde::Serialize;

/// Database file and expected properties shared by the database commands
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Database file path, by default the one from the configuration
    #[clap(long)]
    pub path: Option<PathBuf>,

    /// Expected property as KEY=VALUE, overrides the configured one (repeatable)
    #[clap(short = 'p', long = "property", value_parser = parse_property)]
    pub properties: Vec<(String, String)>,
}

impl TargetArgs {
    /// Resolve the database path and the expected properties
    pub fn resolve(&self, config: &AppDbConfig) -> (PathBuf, Properties) {
        config.resolve_target(self.path.clone(), &self.properties)
    }
}

/// Print a serializable value as JSON
pub(crate) fn print_json<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let output = match format {
        OutputFormat::JsonPretty => serde_json::to_string_pretty(value)?,
        _ => serde_json::to_string(value)?,
    };
    println!("{}", output);
    Ok(())
}
