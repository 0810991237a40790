use crate::command::info::naive_time_ago;
use eyre::Result;
use marquee_client::session::Session;

pub fn run(session: &Session) -> Result<()> {
    let Some(identity) = session.identity() else {
        println!("You are not logged in.");
        return Ok(());
    };

    println!("Name: {}", identity.name);
    println!("Email: {}", identity.email);
    if let Some(avatar) = &identity.avatar {
        println!("Avatar: {avatar}");
    }
    println!("Member since: {}", naive_time_ago(identity.created_at));
    println!("Watchlist: {} titles", identity.watchlist.len());
    Ok(())
}
