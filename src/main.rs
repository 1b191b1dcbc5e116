// src/main.rs

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use maestro::config::Config;

#[derive(Parser, Debug)]
#[command(name = "maestro")]
#[command(about = "Multi-specialist chat orchestrator over the Gemini API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Host to bind to
    #[arg(long, env = "MAESTRO_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to bind to
    #[arg(short, long, env = "MAESTRO_PORT", default_value_t = 5000)]
    port: u16,

    /// Static files directory
    #[arg(long, env = "MAESTRO_STATIC_DIR", default_value = "static")]
    static_dir: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web server (default)
    Serve,
    /// Chat from the terminal instead of the browser
    Repl,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => maestro::server::run(&cli.host, cli.port, &cli.static_dir, config).await,
        Command::Repl => maestro::repl::run(config).await,
    }
}
