use clap::{Parser, Subcommand};

mod commands;
mod util;

use util::{EXIT_USAGE, OutputFormat, exit_error};

#[derive(Parser)]
#[command(name = "overload", version, about = "Progressive Overload Tracker CLI")]
struct Cli {
    /// API base URL
    #[arg(long, env = "OVERLOAD_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// User whose history is queried
    #[arg(long, env = "OVERLOAD_USER_ID", global = true)]
    user_id: Option<i64>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long, global = true)]
    raw: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// Show history, personal best and next-session suggestion for an exercise
    History {
        /// Exercise ID
        #[arg(long)]
        exercise_id: i64,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    if std::env::var_os("OVERLOAD_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_env("OVERLOAD_LOG"))
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_USAGE } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let format = if cli.raw {
        OutputFormat::Raw
    } else {
        OutputFormat::Pretty
    };

    let code = match cli.command {
        Commands::Health => commands::health::run(&cli.api_url, format).await,
        Commands::History { exercise_id } => {
            let user_id = cli.user_id.unwrap_or_else(|| {
                exit_error(
                    "user_id is required for history",
                    Some("Set --user-id or OVERLOAD_USER_ID env var"),
                )
            });
            commands::history::run(&cli.api_url, exercise_id, user_id, format).await
        }
    };

    std::process::exit(code);
}
