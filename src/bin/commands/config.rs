use appdb::{
    format_size, get_database_file_info, AppDbConfig, DatabaseFileInfo, OutputFormat, Properties,
};
use clap::Args;
use serde::Serialize;

use super::print_json;

/// Arguments for the Config command
#[derive(Args)]
pub struct ConfigArgs {
    /// Also show whether the database file matches the configured properties
    #[clap(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Serialize)]
struct ConfigInfo {
    config_file: String,
    data_dir: String,
    properties: Properties,
    database: DatabaseFileInfo,
}

pub fn run(
    config: &AppDbConfig,
    args: ConfigArgs,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let ConfigArgs { verbose } = args;

    let database = get_database_file_info(&config.database_path(), &config.properties);

    if output_format.is_json() {
        let info = ConfigInfo {
            config_file: AppDbConfig::config_file_path(),
            data_dir: config.data_dir.clone(),
            properties: config.properties.clone(),
            database,
        };
        return print_json(&info, output_format);
    }

    println!("Config File:        {}", AppDbConfig::config_file_path());
    println!("{}", config.summary());
    println!();
    println!("Database:");
    println!("  Exists:           {}", database.exists);
    if let Some(size) = database.size_bytes {
        println!("  Size:             {}", format_size(size));
    }
    if verbose && database.exists {
        println!("  Valid:            {}", database.valid);
        if let Some(status) = &database.status {
            println!("  Status:           {}", status);
        }
        if let Some(count) = database.stored_property_count {
            println!("  Stored Properties: {}", count);
        }
    }

    Ok(())
}
