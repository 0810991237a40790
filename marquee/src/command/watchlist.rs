use crate::command::browse::print_movies;
use clap::Parser;
use eyre::{bail, Context, Result};
use marquee_client::session::Session;
use marquee_common::domain::ItemId;

#[derive(Parser, Debug)]
#[clap(infer_subcommands = true)]
pub enum Cmd {
    /// List the titles on your watchlist
    List,
    /// Add a title by its id
    Add { id: ItemId },
    /// Remove a title by its id
    Remove { id: ItemId },
    /// Remove every title
    Clear,
    /// Sync the local watchlist with the server
    Refresh,
}

impl Cmd {
    pub(crate) async fn run(self, session: &Session) -> Result<()> {
        match self {
            Self::List => {
                let items = session.watchlist_items().await?;
                if items.is_empty() {
                    println!("Your list is empty");
                    return Ok(());
                }
                let plural = if items.len() == 1 { "" } else { "s" };
                println!("{} title{plural} in your list", items.len());
                print_movies(&items);
            }
            Self::Add { id } => {
                if session.is_in_watchlist(id) {
                    println!("{id} is already on your watchlist.");
                    return Ok(());
                }
                session
                    .add_to_watchlist(id)
                    .await
                    .wrap_err_with(|| format!("Failed to add {id}"))?;
                println!("Added {id} to your watchlist.");
            }
            Self::Remove { id } => {
                session
                    .remove_from_watchlist(id)
                    .await
                    .wrap_err_with(|| format!("Failed to remove {id}"))?;
                println!("Removed {id} from your watchlist.");
            }
            Self::Clear => {
                let failed = session.clear_watchlist().await;
                for (id, err) in &failed {
                    eprintln!("{id}: {err}");
                }
                if !failed.is_empty() {
                    bail!("{} titles could not be removed", failed.len());
                }
                println!("Your list is empty");
            }
            Self::Refresh => {
                session.refresh_watchlist().await;
                println!("{} titles in your list", session.watchlist().len());
            }
        }

        Ok(())
    }
}
