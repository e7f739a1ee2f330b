use appdb::{
    format_size, get_database_file_info, AppDbConfig, DatabaseFileInfo, DatabaseHandle,
    HandleError, OutputFormat,
};
use clap::Args;
use serde::Serialize;

use super::{print_json, TargetArgs};

/// Arguments for the Check command
#[derive(Args)]
pub struct CheckArgs {
    #[clap(flatten)]
    pub target: TargetArgs,
}

/// JSON report: the handle's verdict plus what is on disk
#[derive(Debug, Serialize)]
struct CheckReport {
    #[serde(flatten)]
    database: DatabaseFileInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl CheckReport {
    fn new(database: DatabaseFileInfo, outcome: &Result<(), HandleError>) -> Self {
        let err = outcome.as_ref().err();
        CheckReport {
            database,
            error_kind: err.map(|e| e.kind().to_string()),
            error: err.map(|e| e.to_string()),
        }
    }
}

pub fn run(
    config: &AppDbConfig,
    args: CheckArgs,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let (path, properties) = args.target.resolve(config);

    let mut handle = DatabaseHandle::new(&path, properties.clone());
    let outcome = handle.open();
    handle.close();

    let info = get_database_file_info(&path.to_string_lossy(), &properties);

    if output_format.is_json() {
        print_json(&CheckReport::new(info, &outcome), output_format)?;
    } else {
        println!("Path:     {}", info.path);
        if let Some(size) = info.size_bytes {
            println!("Size:     {}", format_size(size));
        }
        match &outcome {
            Ok(()) => println!("Status:   valid"),
            Err(e) => println!("Status:   {}", e.kind()),
        }
    }

    outcome?;
    Ok(())
}
