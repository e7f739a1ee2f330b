use appdb::{AppDbConfig, DatabaseHandle, OutputFormat};
use clap::Args;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{print_json, TargetArgs};

/// Arguments for the Properties command
#[derive(Args)]
pub struct PropertiesArgs {
    #[clap(flatten)]
    pub target: TargetArgs,
}

#[derive(Debug, Serialize, Tabled)]
struct PropertyRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

pub fn run(
    config: &AppDbConfig,
    args: PropertiesArgs,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let (path, properties) = args.target.resolve(config);

    let mut handle = DatabaseHandle::new(&path, properties);
    handle.open()?;
    let stored = handle.stored_properties()?;
    handle.close();

    let rows: Vec<PropertyRow> = stored
        .into_iter()
        .map(|(key, value)| PropertyRow { key, value })
        .collect();

    match output_format {
        OutputFormat::Json | OutputFormat::JsonPretty => print_json(&rows, output_format)?,
        OutputFormat::Psv => {
            println!("key|value");
            for row in &rows {
                println!("{}|{}", row.key, row.value);
            }
        }
        OutputFormat::Markdown => println!("{}", Table::new(&rows).with(Style::markdown())),
        OutputFormat::Table => println!("{}", Table::new(&rows).with(Style::rounded())),
    }

    Ok(())
}
