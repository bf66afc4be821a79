mod cmd;
mod context;
mod output;
mod privileged;
mod root;
mod supervisor;
mod theme;
mod view;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, site::SiteSubcommand};
use context::Console;
use std::path::PathBuf;
use theme::Theme;

#[derive(Parser)]
#[command(
    name = "botdeck",
    about = "Operator console for bot processes and nginx/apache2 sites",
    version,
    propagate_version = true
)]
struct Cli {
    /// Directory to search for bots (default: settings `bots_root`, then cwd)
    #[arg(long, global = true, env = "BOTDECK_ROOT")]
    root: Option<PathBuf>,

    /// Settings file (default: ~/.config/botdeck/config.yaml)
    #[arg(long, global = true, env = "BOTDECK_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive control panel (default)
    Menu,

    /// Show bots, sites, and the active web server
    List,

    /// Start a stopped bot
    Start {
        /// Selection number or bot name
        target: String,
        /// Discard output instead of writing logs/<name>.log
        #[arg(long)]
        no_log: bool,
    },

    /// Stop a running bot
    Stop {
        /// Selection number or bot name
        target: String,
    },

    /// Stop a bot and start it again
    Restart {
        /// Selection number or bot name
        target: String,
        /// Discard output instead of writing logs/<name>.log
        #[arg(long)]
        no_log: bool,
    },

    /// Restart every running bot without logging
    RestartAll,

    /// Enable or disable sites
    Site {
        #[command(subcommand)]
        subcommand: SiteSubcommand,
    },

    /// Soft reload the active web server
    Reload,

    /// Inspect and validate settings
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let theme = if cli.json { Theme::plain() } else { Theme::detect() };
    let result = Console::open(cli.root.as_deref(), cli.config.as_deref(), theme)
        .and_then(|console| dispatch(&console, cli.command.unwrap_or(Commands::Menu), cli.json));

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn dispatch(console: &Console, command: Commands, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Menu => cmd::menu::run(console),
        Commands::List => cmd::list::run(console, json),
        Commands::Start { target, no_log } => cmd::bot::start(console, &target, !no_log, json),
        Commands::Stop { target } => cmd::bot::stop(console, &target, json),
        Commands::Restart { target, no_log } => {
            cmd::bot::restart(console, &target, !no_log, json)
        }
        Commands::RestartAll => cmd::bot::restart_all(console, json),
        Commands::Site { subcommand } => cmd::site::run(console, subcommand, json),
        Commands::Reload => cmd::reload::run(console, json),
        Commands::Config { subcommand } => cmd::config::run(console, subcommand, json),
    }
}
