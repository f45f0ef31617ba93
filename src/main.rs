use anyhow::{Result, bail};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use slackit::{
    Config,
    CredentialStore,
    DirectoryCache,
    DirectoryEntry,
    Settings,
    SlackClient,
    config,
    looks_like_id,
    members_only,
    upload,
};

mod prompt;

const LONG_ABOUT: &str = "\
Easily share files from command line to Slack

Pass '--channel' to share FILE into that channel or user, by id or by name:

    $ slackit /PATH/TO/FILE /PATH/TO/ANOTHER/FILE -c CHANNEL

Names are looked up in the local channel cache; ids are used as given.

Without '--channel' an interactive selector lists the channels you are a member
of and every user; add '--all' to also list channels you have not joined.

The channel and user list is cached locally for one day; pass '--force' to
fetch it again.

The first run needs '--slack-token' so slackit can talk to the Slack API. The
token is remembered, and passing '--slack-token' again renews it.";

#[derive(Parser)]
#[command(
    name = "slackit",
    version,
    about = "Easily share files from command line to Slack",
    long_about = LONG_ABOUT
)]
struct Cli {
    /// Files to upload
    #[arg(required = true, value_name = "FILE")]
    files: Vec<String>,

    /// Channel or user, by id or name; leave blank to open an interactive selector
    #[arg(short, long)]
    channel: Option<String>,

    /// Fetch the channel list again instead of using the local cache
    #[arg(short, long)]
    force: bool,

    /// Show all channels instead of only the ones you are a member of
    #[arg(long)]
    all: bool,

    /// Message text introducing the file
    #[arg(short, long)]
    message: Option<String>,

    /// Remove the local file after it was uploaded
    #[arg(long)]
    rm: bool,

    /// Slack API token, remembered for later runs
    #[arg(long, env = "SLACK_TOKEN", hide_env_values = true)]
    slack_token: Option<String>,

    /// Number of items visible in the selector (default from config.toml or 10)
    #[arg(long)]
    size: Option<usize>,

    /// Enable verbose output
    #[arg(short, long, env = "SL_VERBOSE")]
    verbose: bool,

    /// Work offline
    #[arg(long, env = "SL_OFFLINE")]
    offline: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_level(verbose)
        .without_time()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    if cli.offline {
        bail!("can not run the command in offline mode");
    }

    let home = std::env::var_os("HOME").map(PathBuf::from);
    let paths = cli
        .files
        .iter()
        .map(|raw| upload::resolve_path(raw, home.as_deref()))
        .collect::<Result<Vec<_>>>()?;

    let base_dir = config::base_dir(|key| std::env::var(key).ok())?;
    let config = Config::load(&base_dir).unwrap_or_else(|err| {
        warn!("ignoring config: {err:#}");
        Config::default()
    });
    let settings = Settings {
        base_dir,
        token: cli.slack_token,
        force_refresh: cli.force,
        show_all: cli.all || config.show_all,
        page_size: cli.size.unwrap_or(config.page_size),
    };

    let token = CredentialStore::new(&settings.base_dir).resolve(settings.token.as_deref())?;
    let client = SlackClient::new(token);

    let destination = match cli.channel.filter(|c| !c.trim().is_empty()) {
        Some(channel) if looks_like_id(channel.trim()) => channel.trim().to_string(),
        Some(channel) => lookup_destination(&client, &settings, &channel)?,
        None => choose_destination(&client, &settings)?,
    };

    let message = match cli.message {
        Some(message) => message,
        None => prompt::message()?,
    };

    for path in &paths {
        upload::share_file(&client, path, &destination, &message, cli.rm)?;
    }
    Ok(())
}

fn lookup_destination(client: &SlackClient, settings: &Settings, target: &str) -> Result<String> {
    let snapshot = DirectoryCache::new(client, &settings.base_dir).load(settings.force_refresh)?;
    match snapshot.find(target) {
        Some(entry) => {
            debug!("resolved {target} to {}", entry.id);
            Ok(entry.id.clone())
        }
        None => bail!("no channel or user named {target}; try --force to refresh the cache"),
    }
}

fn choose_destination(client: &SlackClient, settings: &Settings) -> Result<String> {
    let cache = DirectoryCache::new(client, &settings.base_dir);
    let snapshot = cache.load(settings.force_refresh)?;

    let predicate: Option<&dyn Fn(&DirectoryEntry) -> bool> = if settings.show_all {
        None
    } else {
        Some(&members_only)
    };
    let entries = snapshot.filter(predicate);
    let selected = prompt::select_destination(&entries, settings.page_size)?;
    debug!("selected {} ({})", selected.name, selected.id);
    Ok(selected.id.clone())
}
