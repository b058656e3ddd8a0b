use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use commands::{config, daemon, lookup, order, pick, settings, sync};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "nextup")]
#[command(about = "Nextup - Pick the next thing to start watching from your Plex library")]
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

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync the Plex library into the local database (one-time sync)
    #[command(long_about = "Walk every movie and TV section on the configured Plex server and store shows, seasons, episodes, movies and their metadata locally. Safe to run repeatedly.")]
    Sync,

    /// Pick something new to start watching
    #[command(long_about = "Pick an unplayed series or movie. Without flags the choice between TV and movies follows the weights in settings. Series are widened to everything sharing a collection, and the earliest unplayed item is proposed.")]
    Pick {
        /// Only pick a TV series
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "movie")]
        tv: bool,

        /// Only pick a movie
        #[arg(long, action = ArgAction::SetTrue)]
        movie: bool,
    },

    /// Run as daemon with the background sync scheduler
    #[command(long_about = "Run Nextup in the foreground and re-sync the library on the interval stored in settings. Performs an initial sync on startup unless --no-startup-sync is given. Stops on Ctrl-C.")]
    Daemon {
        /// Skip initial sync on startup
        #[arg(long, action = ArgAction::SetTrue)]
        no_startup_sync: bool,

        /// Write logs to this file (rotated daily) instead of stderr
        #[arg(long, value_name = "PATH")]
        log_file: Option<PathBuf>,
    },

    /// View or change picker settings stored in the database
    Settings {
        #[command(subcommand)]
        cmd: Option<SettingsCommands>,
    },

    /// Manage custom watch orders (items in one are never picked)
    Order {
        #[command(subcommand)]
        cmd: OrderCommands,
    },

    /// Configure connections and credentials
    #[command(long_about = "Manage configuration and credentials for Nextup. Running without a subcommand shows the current configuration.")]
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },

    /// Search TVDB or ComicVine and show match scores
    Lookup {
        #[command(subcommand)]
        cmd: LookupCommands,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show current settings
    Show,

    /// Change one or more settings
    Set {
        /// Relative weight of TV picks
        #[arg(long)]
        tv_weight: Option<f64>,

        /// Relative weight of movie picks
        #[arg(long)]
        movie_weight: Option<f64>,

        /// Hours between background syncs
        #[arg(long)]
        interval_hours: Option<u32>,

        /// Collection that the picker should stay out of
        #[arg(long, conflicts_with = "clear_selected_collection")]
        selected_collection: Option<String>,

        /// Clear the selected collection
        #[arg(long, action = ArgAction::SetTrue)]
        clear_selected_collection: bool,

        /// Add an ignored TV collection (repeatable)
        #[arg(long, value_name = "NAME")]
        ignore_tv: Vec<String>,

        /// Remove an ignored TV collection (repeatable)
        #[arg(long, value_name = "NAME")]
        unignore_tv: Vec<String>,

        /// Add an ignored movie collection (repeatable)
        #[arg(long, value_name = "NAME")]
        ignore_movie: Vec<String>,

        /// Remove an ignored movie collection (repeatable)
        #[arg(long, value_name = "NAME")]
        unignore_movie: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Movie,
    Episode,
}

#[derive(Subcommand)]
enum OrderCommands {
    /// Add an item to a custom order
    Add {
        /// Name of the custom order
        order: String,

        /// Kind of item
        #[arg(value_enum)]
        kind: KindArg,

        /// Plex rating key of the item
        rating_key: String,

        /// Title to store (looked up in the library when omitted)
        #[arg(long)]
        title: Option<String>,
    },

    /// Remove an entry by id
    Remove { id: i64 },

    /// List all entries
    List,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks sensitive data)
    Show {
        /// Show full configuration including masked secrets
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },

    /// Configure the Plex server
    #[command(long_about = "Configure the Plex server URL and token. You can find your Plex token in your account settings or by inspecting network requests in Plex Web.")]
    Plex {
        /// Plex Server URL, e.g. http://localhost:32400 (if not provided, will prompt)
        #[arg(long)]
        server_url: Option<String>,

        /// Plex API Token (if not provided, will prompt)
        #[arg(long)]
        token: Option<String>,
    },

    /// Configure TVDB (series status and artwork)
    Tvdb {
        /// TVDB API key (if not provided, will prompt)
        #[arg(long)]
        api_key: Option<String>,

        /// Subscriber PIN, if your key requires one
        #[arg(long)]
        pin: Option<String>,

        /// Turn TVDB lookups off
        #[arg(long, action = ArgAction::SetTrue)]
        disable: bool,
    },

    /// Configure ComicVine
    Comicvine {
        /// ComicVine API key (if not provided, will prompt)
        #[arg(long)]
        api_key: Option<String>,

        /// Turn ComicVine lookups off
        #[arg(long, action = ArgAction::SetTrue)]
        disable: bool,
    },
}

#[derive(Subcommand)]
enum LookupCommands {
    /// Search TVDB for a series
    Series { name: String },

    /// Search ComicVine for a comic volume
    Comic { name: String },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = match &cli.command {
        Commands::Daemon { log_file, .. } => log_file.clone(),
        _ => None,
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Sync => sync::run_sync(&output).await,
        Commands::Pick { tv, movie } => pick::run_pick(tv, movie, &output).await,
        Commands::Daemon { no_startup_sync, .. } => daemon::run_daemon(no_startup_sync, &output).await,
        Commands::Settings { cmd } => settings::run_settings(cmd.unwrap_or(SettingsCommands::Show), &output),
        Commands::Order { cmd } => order::run_order(cmd, &output),
        Commands::Config { cmd } => {
            let cmd = cmd.unwrap_or(ConfigCommands::Show { full: false });
            config::run_config(cmd, &output).await
        }
        Commands::Lookup { cmd } => lookup::run_lookup(cmd, &output).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_pick_flags_conflict() {
        assert!(Cli::try_parse_from(["nextup", "pick", "--tv", "--movie"]).is_err());
        assert!(Cli::try_parse_from(["nextup", "pick", "--movie"]).is_ok());
    }

    #[test]
    fn test_settings_set_repeatable() {
        let cli = Cli::try_parse_from([
            "nextup",
            "settings",
            "set",
            "--ignore-tv",
            "Christmas",
            "--ignore-tv",
            "Halloween",
        ])
        .unwrap();
        match cli.command {
            Commands::Settings {
                cmd: Some(SettingsCommands::Set { ignore_tv, .. }),
            } => assert_eq!(ignore_tv, vec!["Christmas", "Halloween"]),
            _ => panic!("expected settings set"),
        }
    }
}
