use appdb::*;
use clap::{Parser, Subcommand};
use tracing::Level;

mod commands;

use commands::check::CheckArgs;
use commands::config::ConfigArgs;
use commands::create::CreateArgs;
use commands::properties::PropertiesArgs;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.appdb/appdb.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information
    #[clap(long)]
    debug: bool,

    /// Output format: table, markdown, json, json-pretty, psv
    #[clap(short, long, global = true, default_value = "table")]
    format: OutputFormat,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new database file stamped with the expected properties
    Create(CreateArgs),

    /// Open a database file and check that it belongs to this application
    Check(CheckArgs),

    /// Print the properties stored in a valid database file
    Properties(PropertiesArgs),

    /// Show configuration and database file status
    Config(ConfigArgs),
}

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = match AppDbConfig::new(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Create(args) => commands::create::run(&config, args, cli.format),
        Commands::Check(args) => commands::check::run(&config, args, cli.format),
        Commands::Properties(args) => commands::properties::run(&config, args, cli.format),
        Commands::Config(args) => commands::config::run(&config, args, cli.format),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
