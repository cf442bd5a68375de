use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod resolve;

#[derive(Parser)]
#[command(
    name = "plugin-order",
    version,
    about = "Resolve a plugin configuration into dependency-ordered activation"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Show project information
    #[arg(long)]
    about: bool,
}

/// Output format for the activation list.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Format {
    /// One line per plugin: depth, name, directory (default)
    #[default]
    Text,
    /// JSON array of resolved plugins
    Json,
}

#[derive(Args)]
struct ResolveArgs {
    /// Plugin config file (JSON, or YAML with a .yaml/.yml extension)
    #[arg(default_value = "plugins.json")]
    config: PathBuf,
    /// Current environment; plugins with a non-matching `env` list are skipped
    #[arg(long)]
    env: Option<String>,
    /// Resolve for the agent process instead of the application process
    #[arg(long)]
    agent: bool,
    /// Agent role; plugins whose `agent` list lacks it are skipped
    #[arg(long, requires = "agent")]
    agent_role: Option<String>,
    /// Framework identifier matched against `plugin.framework`
    #[arg(long)]
    framework: Option<String>,
    /// Directory to search installed packages from [default: current directory]
    #[arg(long)]
    cwd: Option<PathBuf>,
    /// Base directory for `path` entries [default: the config file's directory]
    #[arg(long)]
    base: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a plugin config file and print the activation order
    Resolve(ResolveArgs),
}

pub fn run(cli: Cli) {
    if cli.about {
        print_about();
        return;
    }

    match cli.command {
        Some(Commands::Resolve(args)) => resolve::run(args),
        None => {
            eprintln!("Usage: plugin-order <command> [args]");
            eprintln!("Run `plugin-order --help` for details.");
            std::process::exit(1);
        }
    }
}

/// Install a stderr log subscriber.
///
/// `RUST_LOG` takes precedence; otherwise only warnings (plugin rejections)
/// and errors are shown.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::env::var_os("NO_COLOR").is_none()),
        )
        .with(env_filter)
        .init();
}

fn print_about() {
    println!(
        "plugin-order: plugin activation resolver\n\
         ├─ version:    {}\n\
         ├─ author:     {}\n\
         ├─ source:     {}\n\
         └─ licence:    {} https://www.apache.org/licenses/LICENSE-2.0",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_AUTHORS"),
        env!("CARGO_PKG_REPOSITORY"),
        env!("CARGO_PKG_LICENSE"),
    );
}
