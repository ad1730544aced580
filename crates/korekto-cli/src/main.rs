//! korekto CLI: score candidate responses against a remote scoring service.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use korekto_core::{BaseType, Cardinality};

mod commands;

#[derive(Parser)]
#[command(
    name = "korekto",
    version,
    about = "Score QTI candidate responses with a remote scoring service"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single candidate response
    Score {
        /// Identifier of the assessment item
        #[arg(long)]
        item: String,

        /// Candidate response value
        #[arg(long, required_unless_present = "null")]
        response: Option<String>,

        /// Send a NULL response (scored as an empty string)
        #[arg(long, conflicts_with = "response")]
        null: bool,

        /// QTI base type of the response
        #[arg(long, default_value = "string")]
        base_type: BaseType,

        /// QTI cardinality of the response
        #[arg(long, default_value = "single")]
        cardinality: Cardinality,

        /// Print the request document instead of sending it
        #[arg(long)]
        dry_run: bool,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Score every response listed in a TOML file
    Batch {
        /// Path to a .toml file with [[responses]] entries
        #[arg(long)]
        input: PathBuf,

        /// Max concurrent scoring calls
        #[arg(long, default_value = "4")]
        parallelism: usize,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Load and validate the endpoint configuration
    CheckConfig {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and an example batch file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("korekto_core=info".parse().unwrap())
                .add_directive("korekto_client=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Score {
            item,
            response,
            null,
            base_type,
            cardinality,
            dry_run,
            format,
            config,
        } => {
            let args = commands::score::ScoreArgs {
                item,
                response: if null { None } else { response },
                base_type,
                cardinality,
                dry_run,
                format,
            };
            commands::score::execute(args, config).await
        }
        Commands::Batch {
            input,
            parallelism,
            format,
            config,
        } => commands::batch::execute(input, parallelism, format, config).await,
        Commands::CheckConfig { config } => commands::check_config::execute(config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
