use clap::{ArgAction, Parser, Subcommand};
use commands::filters::FilterArgs;
use commands::{clean, config, delete, download_next, list, manager_info, shows, sync, Services};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "plexarr")]
#[command(about = "plexarr - Reconcile your Plex library with Radarr and Sonarr")]
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

    /// Config file (default: $PLEXARR_CONFIG, ./config.toml, then the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List movies from Plex, Radarr and the Plex watchlist
    #[command(long_about = "Merge the movies known to Plex, Radarr and the Plex watchlist into one list. Each movie shows where it is available, its watch status and its size on disk.")]
    List {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// List TV shows from Plex, Sonarr and the Plex watchlist
    Shows {
        #[command(flatten)]
        filters: FilterArgs,

        /// Only shows whose title contains this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Add titles that are only in Plex to Radarr (or Sonarr with --shows)
    Sync {
        /// Sync TV shows to Sonarr instead of movies to Radarr
        #[arg(long, action = ArgAction::SetTrue)]
        shows: bool,

        /// Quality profile id to add titles with (see `plexarr profiles`)
        #[arg(long, value_name = "ID")]
        quality_profile: u32,

        /// Show what would be added without changing anything
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,

        /// Ask before adding each title
        #[arg(long, action = ArgAction::SetTrue)]
        confirm: bool,
    },
    /// Remove duplicate movie files in Radarr, keeping the best one
    #[command(long_about = "For every Radarr movie with more than one file, keep the file with the highest quality (then the largest) and delete the rest.")]
    Clean {
        /// Show what would be deleted without changing anything
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,

        /// Ask before deleting each file
        #[arg(long, action = ArgAction::SetTrue)]
        confirm: bool,
    },
    /// Delete movies matching the filters from Radarr (dry run unless --execute)
    Delete {
        #[command(flatten)]
        filters: FilterArgs,

        /// Actually delete; without this only the plan is shown
        #[arg(long, action = ArgAction::SetTrue)]
        execute: bool,

        /// Ask before deleting each movie
        #[arg(long, action = ArgAction::SetTrue)]
        confirm: bool,

        /// Remove the movies from Radarr but keep their files on disk
        #[arg(long, action = ArgAction::SetTrue)]
        keep_files: bool,
    },
    /// Find the next unwatched episodes missing from Plex and request them from Sonarr
    #[command(long_about = "For each show in progress (or the one given with --show-id), find the next episodes after your watch position that Plex does not have. With --confirm, ask Sonarr to search for them, adding the show to Sonarr first when --quality-profile is given.")]
    DownloadNext {
        /// Plex rating key of the show
        #[arg(long, value_name = "RATING_KEY")]
        show_id: Option<String>,

        /// Number of episodes to look for per show
        #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=100))]
        count: u32,

        /// Quality profile id used when the show has to be added to Sonarr
        #[arg(long, value_name = "ID")]
        quality_profile: Option<u32>,

        /// Request the episodes from Sonarr
        #[arg(long, action = ArgAction::SetTrue)]
        confirm: bool,
    },
    /// List quality profiles
    Profiles {
        /// Sonarr instead of Radarr
        #[arg(long, action = ArgAction::SetTrue)]
        sonarr: bool,
    },
    /// List root folders
    Folders {
        /// Sonarr instead of Radarr
        #[arg(long, action = ArgAction::SetTrue)]
        sonarr: bool,
    },
    /// Create, validate or show the configuration file
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a configuration template
    Create {
        /// Where to write it (default: the user config dir)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
    /// Check that the configuration file loads and is complete
    Validate,
    /// Show current configuration (masks tokens and API keys)
    Show {
        /// Show tokens and API keys unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let output = output::Output::new(cli.output, cli.quiet);

    if let Commands::Config { cmd } = cli.command {
        logging::init_logging(cli.verbose, cli.quiet, "info", None)?;
        return config::run_config(cmd, cli.config.as_deref(), &output);
    }

    let loaded = commands::load_config(cli.config.as_deref());
    match loaded {
        Ok(ref config) => logging::init_logging(
            cli.verbose,
            cli.quiet,
            &config.logging.level,
            config.logging.file.as_deref(),
        )?,
        Err(_) => logging::init_logging(cli.verbose, cli.quiet, "info", None)?,
    }
    let services = Services::connect(loaded?)?;

    match cli.command {
        Commands::List { filters } => list::run_list(&services, &filters, &output).await,
        Commands::Shows { filters, search } => shows::run_shows(&services, &filters, search.as_deref(), &output).await,
        Commands::Sync {
            shows,
            quality_profile,
            dry_run,
            confirm,
        } => sync::run_sync(&services, shows, quality_profile, dry_run, confirm, &output).await,
        Commands::Clean { dry_run, confirm } => clean::run_clean(&services, dry_run, confirm, &output).await,
        Commands::Delete {
            filters,
            execute,
            confirm,
            keep_files,
        } => delete::run_delete(&services, &filters, execute, confirm, keep_files, &output).await,
        Commands::DownloadNext {
            show_id,
            count,
            quality_profile,
            confirm,
        } => {
            download_next::run_download_next(&services, show_id.as_deref(), count as usize, quality_profile, confirm, &output)
                .await
        }
        Commands::Profiles { sonarr } => manager_info::run_profiles(&services, sonarr, &output).await,
        Commands::Folders { sonarr } => manager_info::run_folders(&services, sonarr, &output).await,
        Commands::Config { cmd } => config::run_config(cmd, cli.config.as_deref(), &output),
    }
}
