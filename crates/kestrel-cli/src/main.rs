use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "kestrel")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Control the tabs of Chrome profiles over a local HTTP API",
    long_about = "Kestrel exposes the open tabs of one or more Chrome profiles over a small \
                  HTTP API: list, open, focus, and close tabs, starting the browser on demand."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the tab-control HTTP API
    Serve {
        /// Port to listen on (loopback only)
        #[arg(long, default_value_t = 9333)]
        port: u16,

        /// Profile to serve, as NAME=DEVTOOLS_PORT (repeatable)
        #[arg(
            long = "profile",
            value_name = "NAME=PORT",
            default_value = "default=9222"
        )]
        profiles: Vec<String>,

        /// Path to the Chrome binary
        #[arg(long)]
        chrome_path: Option<PathBuf>,

        /// Root directory for profile data (defaults to ~/.kestrel/profiles)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Use throwaway profile directories, deleted on exit
        #[arg(long)]
        ephemeral: bool,

        /// Launch Chrome headless when it has to be started
        #[arg(long)]
        headless: bool,
    },

    /// Manage profile data directories
    Profiles {
        #[command(subcommand)]
        command: ProfilesCommand,
    },

    /// Generate shell completion script
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ProfilesCommand {
    /// List profile data directories
    List,

    /// Show details for one profile
    Info {
        /// Profile name
        name: String,
    },

    /// Delete a profile's data directory
    Delete {
        /// Profile name
        name: String,

        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Serve {
            port,
            profiles,
            chrome_path,
            data_dir,
            ephemeral,
            headless,
        } => commands::serve::execute(port, profiles, chrome_path, data_dir, ephemeral, headless),
        Commands::Profiles { command } => match command {
            ProfilesCommand::List => commands::profiles::list(),
            ProfilesCommand::Info { name } => commands::profiles::info(&name),
            ProfilesCommand::Delete { name, force } => commands::profiles::delete(&name, force),
        },
        Commands::Completion { shell } => commands::completion::execute(shell, &mut Cli::command()),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("kestrel=debug,kestrel_server=debug,kestrel_browser=debug")
    } else {
        EnvFilter::new("kestrel=info,kestrel_server=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
