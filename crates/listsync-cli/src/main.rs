use clap::{ArgAction, Parser, Subcommand};
use commands::list::ListAction;
use commands::{config, list};
use list_sync_models::{CatalogId, EditListEntryOptions, ListEntriesQuery, ListStatus};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "listsync")]
#[command(about = "ListSync - Mirror your AniList anime list to Simkl")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write logs to the daily rotated log file instead of stderr
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the list entry for an AniList media id
    Entry {
        /// AniList media id
        id: CatalogId,
    },
    /// Show the whole list, optionally one page of it
    List {
        /// Page number, starting at 1
        #[arg(long, requires = "per_page")]
        page: Option<u32>,

        /// Entries per page
        #[arg(long, requires = "page")]
        per_page: Option<u32>,
    },
    /// Add a media to the list as planned
    Add {
        id: CatalogId,
    },
    /// Remove a media from the list
    Remove {
        id: CatalogId,
    },
    /// Mark a media as rewatching and reset its progress
    Rewatch {
        id: CatalogId,
    },
    /// Set the number of watched episodes
    #[command(long_about = "Set the number of watched episodes. Reaching the last episode of a media with a known episode count marks it completed.")]
    Progress {
        id: CatalogId,
        progress: u32,
    },
    /// Set the score on a 0-100 scale
    Score {
        id: CatalogId,
        #[arg(value_parser = clap::value_parser!(u32).range(0..=100))]
        score: u32,
    },
    /// Set the list status (current, planning, completed, dropped, paused, repeating)
    Status {
        id: CatalogId,
        status: ListStatus,
    },
    /// Set status, progress and optionally score in one go
    Edit {
        id: CatalogId,

        #[arg(long)]
        status: ListStatus,

        #[arg(long)]
        progress: u32,

        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
        score: Option<u32>,
    },
    /// Configure credentials and settings
    #[command(long_about = "Manage configuration and credentials for ListSync. Use 'show' to view the configuration and 'simkl' to set up the Simkl API application and sign in.")]
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks sensitive data)
    #[command(long_about = "Display the current configuration. Client secrets are masked. Use --full to show masked values.")]
    Show {
        /// Show full configuration including masked secrets
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },

    /// Configure Simkl (PIN authentication)
    #[command(long_about = "Configure Simkl API credentials and sign in with a PIN. You'll need to create a Simkl API application at https://simkl.com/settings/developer/new/ first.")]
    Simkl {
        /// Simkl Client ID (if not provided, will prompt)
        #[arg(long)]
        client_id: Option<String>,

        /// Simkl Client Secret (if not provided, will prompt)
        #[arg(long)]
        client_secret: Option<String>,
    },
}

impl Commands {
    fn into_list_action(self) -> Option<ListAction> {
        let action = match self {
            Commands::Entry { id } => ListAction::Entry(id),
            Commands::List { page, per_page } => ListAction::List(ListEntriesQuery::new(page, per_page)),
            Commands::Add { id } => ListAction::Add(id),
            Commands::Remove { id } => ListAction::Remove(id),
            Commands::Rewatch { id } => ListAction::Rewatch(id),
            Commands::Progress { id, progress } => ListAction::Progress(id, progress),
            Commands::Score { id, score } => ListAction::Score(id, score),
            Commands::Status { id, status } => ListAction::Status(id, status),
            Commands::Edit { id, status, progress, score } => {
                ListAction::Edit(id, EditListEntryOptions { score, progress, status })
            }
            Commands::Config { .. } => return None,
        };
        Some(action)
    }
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = cli
        .log_file
        .then(|| list_sync_config::PathManager::default().log_file());
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Config { cmd } => config::run_config(cmd, &output).await,
        command => match command.into_list_action() {
            Some(action) => list::run_list_action(action, &output).await,
            None => Ok(()),
        },
    }
}
