use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use sptopcli::{
    auth::{AuthConfig, AuthService, KeyringStore, LocalServerLauncher, TokenStore},
    cli, config, error, utils,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Remove stored credentials
    Logout,

    /// Show your top tracks or artists
    Top(TopOptions),

    /// Show recently played tracks
    Recent(RecentOptions),

    /// Show the logged-in user's profile
    Profile,

    /// Show session status
    Info,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Show your top tracks or artists")]
pub struct TopOptions {
    #[command(subcommand)]
    pub command: TopSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TopSubcommand {
    /// Top tracks
    Tracks(TopQueryOpts),

    /// Top artists
    Artists(TopQueryOpts),
}

#[derive(Parser, Debug, Clone)]
pub struct TopQueryOpts {
    /// Aggregation window: short (~4 weeks), medium (~6 months) or long (years)
    #[clap(
        long = "time-range",
        default_value = "medium",
        value_parser = utils::parse_time_range
    )]
    pub time_range: utils::TimeRange,

    /// Number of entries to show (the API caps this at 50)
    #[clap(long, default_value_t = 20)]
    pub limit: u8,
}

#[derive(Parser, Debug, Clone)]
pub struct RecentOptions {
    /// Number of entries to show (the API caps this at 50)
    #[clap(long, default_value_t = 20)]
    pub limit: u8,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

/// Composes the auth service from the environment-backed config and the
/// keyring-backed token store. Built once per command invocation; the
/// service instance owns the session for the lifetime of the process.
fn auth_service() -> AuthService {
    AuthService::new(
        AuthConfig::from_env(),
        TokenStore::new(Box::new(KeyringStore::new())),
    )
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => {
            let service = auth_service();
            let launcher = LocalServerLauncher::default();
            cli::auth(&service, &launcher).await;
        }
        Command::Logout => cli::logout(&auth_service()),

        Command::Top(opt) => match opt.command {
            TopSubcommand::Tracks(q) => {
                cli::top_tracks(&auth_service(), q.time_range, q.limit).await
            }
            TopSubcommand::Artists(q) => {
                cli::top_artists(&auth_service(), q.time_range, q.limit).await
            }
        },

        Command::Recent(opt) => cli::recent(&auth_service(), opt.limit).await,
        Command::Profile => cli::profile(&auth_service()).await,
        Command::Info => cli::info(&auth_service()),

        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
