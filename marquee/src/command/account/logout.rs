use eyre::Result;
use marquee_client::session::{Session, SessionState};

pub async fn run(session: &Session) -> Result<()> {
    if session.state() != SessionState::Authenticated {
        println!("You are not logged in.");
        return Ok(());
    }

    // Local state is gone once this returns, the remote notification is only awaited so the
    // process does not exit under it.
    if let Some(notify) = session.logout() {
        if let Err(err) = notify.await {
            tracing::debug!("remote logout task failed: {err}");
        }
    }

    println!("You are logged out!");
    Ok(())
}
