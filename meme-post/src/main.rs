//! meme-post - Fetch a meme and post it to Bluesky

use clap::{Parser, ValueEnum};
use libmemecast::logging::{LogFormat, LoggingConfig};
use libmemecast::{pipeline, Config, Result};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "meme-post")]
#[command(about = "Fetch a meme and post it to Bluesky", long_about = None)]
struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_format = std::env::var("MEMECAST_LOG_FORMAT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(LogFormat::Text);
    let log_level = std::env::var("MEMECAST_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    LoggingConfig::new(log_format, log_level, cli.verbose).init();

    // Run the main logic and handle errors
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;

    let uri = pipeline::run_once(&config).await?;

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "uri": uri }));
        }
        OutputFormat::Text => {
            println!("{}", uri);
        }
    }

    Ok(())
}
