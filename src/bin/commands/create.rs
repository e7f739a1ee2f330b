use std::path::PathBuf;

use anyhow::anyhow;
use appdb::database::ensure_data_dir;
use appdb::{AppDbConfig, DatabaseHandle, OutputFormat};
use clap::Args;
use serde::Serialize;

use super::{print_json, TargetArgs};

/// Arguments for the Create command
#[derive(Args)]
pub struct CreateArgs {
    #[clap(flatten)]
    pub target: TargetArgs,

    /// File with SQL statements creating the application tables
    #[clap(short, long)]
    pub schema: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CreateResult {
    path: String,
    property_count: usize,
}

pub fn run(
    config: &AppDbConfig,
    args: CreateArgs,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let CreateArgs { target, schema } = args;
    let (path, properties) = target.resolve(config);

    let schema_sql = match schema {
        Some(schema_path) => std::fs::read_to_string(&schema_path).map_err(|e| {
            anyhow!("Unable to read schema file {}: {}", schema_path.display(), e)
        })?,
        None => String::new(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_data_dir(&parent.to_string_lossy())?;
    }

    let mut handle = DatabaseHandle::new(&path, properties);
    handle.create_new(&schema_sql)?;

    let result = CreateResult {
        path: path.to_string_lossy().to_string(),
        property_count: handle.expected_properties().len(),
    };
    handle.close();

    if output_format.is_json() {
        print_json(&result, output_format)?;
    } else {
        println!("Created {} with {} properties", result.path, result.property_count);
    }

    Ok(())
}
