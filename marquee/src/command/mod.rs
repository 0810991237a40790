use clap::Subcommand;
use eyre::Result;
use marquee_client::session::Session;
use marquee_client::settings::Settings;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod account;
mod browse;
mod info;
mod movie;
mod search;
mod watchlist;

#[derive(Subcommand, Debug)]
#[clap(infer_subcommands = true)]
pub enum MarqueeCmd {
    /// Show paths, account and version information
    Info,
    #[command(subcommand)]
    Account(account::Cmd),
    #[command(subcommand)]
    Watchlist(watchlist::Cmd),
    #[command(subcommand)]
    Browse(browse::Cmd),
    /// Search movies and shows
    Search(search::Cmd),
    /// Show the details of a single title
    Movie(movie::Cmd),
}

impl MarqueeCmd {
    fn needs_session(&self) -> bool {
        matches!(self, Self::Info | Self::Account(_) | Self::Watchlist(_))
    }

    #[tokio::main]
    pub async fn run(self) -> Result<()> {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();

        tracing::trace!(command = ?self, "client command");

        let settings = Settings::new()?;
        let session = Session::from_settings(&settings)?;
        if self.needs_session() {
            session.restore().await;
        }

        match self {
            Self::Info => info::run(&settings, &session),
            Self::Account(cmd) => cmd.run(&session).await,
            Self::Watchlist(cmd) => cmd.run(&session).await,
            Self::Browse(cmd) => cmd.run(&session).await,
            Self::Search(cmd) => cmd.run(&session).await,
            Self::Movie(cmd) => cmd.run(&session).await,
        }
    }
}
