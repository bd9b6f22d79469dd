//! qubosolv command-line interface
//!
//! Submit QUBO matrices to the Quantum Circle annealer from the shell.
//!
//! ```text
//! qubosolv login --username alice --password '...'
//! qubosolv solve --input qubo.json --algorithm sa --offset 2.5
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{credentials, login, solve, version};

/// qubosolv - QUBO solving on the Quantum Circle annealer
#[derive(Parser)]
#[command(name = "qubosolv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store credentials and verify them against the identity provider
    Login {
        /// Developer portal username
        #[arg(short, long)]
        username: String,

        /// Developer portal password
        #[arg(short, long)]
        password: String,

        /// Credential file or directory
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Solve a QUBO matrix
    Solve {
        /// Input file: JSON matrix, or object with "matrix" (and optional "offset")
        #[arg(short, long)]
        input: String,

        /// Constant offset added to all energies (overrides the file)
        #[arg(long, allow_negative_numbers = true)]
        offset: Option<f64>,

        /// Start temperature
        #[arg(long, default_value_t = qubosolv::api::DEFAULT_TEMP_START)]
        temp_start: f64,

        /// End temperature
        #[arg(long, default_value_t = qubosolv::api::DEFAULT_TEMP_END)]
        temp_end: f64,

        /// Cooling ratio (T_new = tau * T)
        #[arg(long, default_value_t = qubosolv::api::DEFAULT_TAU)]
        tau: f64,

        /// Acceptance scaling (exp(-dE * beta))
        #[arg(long, default_value_t = qubosolv::api::DEFAULT_BETA)]
        beta: f64,

        /// Maximize instead of minimize
        #[arg(long)]
        maximize: bool,

        /// Algorithm (bf, sa, sqa); server default if omitted
        #[arg(short, long)]
        algorithm: Option<String>,

        /// Access token from the developer portal
        #[arg(long, env = "QUBOSOLV_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Credential file or directory
        #[arg(short, long)]
        file: Option<String>,

        /// API base URL
        #[arg(long, env = "QUBOSOLV_HOST")]
        host: Option<String>,

        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Inspect or remove stored credentials
    Credentials {
        #[command(subcommand)]
        action: CredentialsAction,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum CredentialsAction {
    /// Show the stored username (password masked)
    Show {
        /// Credential file or directory
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Delete the credential file
    Clear {
        /// Credential file or directory
        #[arg(short, long)]
        file: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Login {
            username,
            password,
            file,
        } => login::execute(&username, &password, file.as_deref()).await,

        Commands::Solve {
            input,
            offset,
            temp_start,
            temp_end,
            tau,
            beta,
            maximize,
            algorithm,
            token,
            file,
            host,
            format,
        } => {
            let options = solve::SolveOptions {
                offset,
                temp_start,
                temp_end,
                tau,
                beta,
                maximize,
                algorithm,
            };
            let connection = solve::Connection {
                token,
                file,
                host,
            };
            solve::execute(&input, &options, connection, &format).await
        }

        Commands::Credentials { action } => match action {
            CredentialsAction::Show { file } => credentials::execute_show(file.as_deref()),
            CredentialsAction::Clear { file } => credentials::execute_clear(file.as_deref()),
        },

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
