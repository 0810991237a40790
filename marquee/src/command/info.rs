use crate::VERSION;
use eyre::Result;
use marquee_client::session::{Session, SessionState};
use marquee_client::settings::Settings;
use time::{Duration, OffsetDateTime};

pub(crate) fn naive_time_ago(timestamp: OffsetDateTime) -> String {
    let now = OffsetDateTime::now_utc();
    let duration = now - timestamp;

    if duration < Duration::hours(1) {
        format!("{} minutes ago", duration.whole_minutes())
    } else if duration < Duration::days(1) {
        format!("{} hours ago", duration.whole_hours())
    } else {
        format!("{} days ago", duration.whole_days())
    }
}

pub fn run(settings: &Settings, session: &Session) -> Result<()> {
    let env_config_dir = std::env::var("MARQUEE_CONFIG_DIR");

    let vars = format!(
        "VARS:\nMARQUEE_CONFIG_DIR = {:?}",
        env_config_dir.unwrap_or("None".into())
    );
    println!("{vars}\n");

    let mut paths = String::from("PATHS:\n");
    paths.push_str(&format!("config_path: {:?}\n", Settings::config_file()));
    paths.push_str(&format!("storage_path: {:?}\n", settings.storage_path));
    paths.push_str(&format!("server_address: {}", settings.server_address));
    println!("{paths}\n");

    println!("ACCOUNT: ");
    match (session.state(), session.identity()) {
        (SessionState::Authenticated, Some(identity)) => {
            println!("Auth: {} <{}>", identity.name, identity.email);
            println!("Member since: {}", naive_time_ago(identity.created_at));
            println!("Watchlist: {} titles", identity.watchlist.len());
        }
        _ => println!("Auth: Unauthenticated"),
    }

    println!();
    println!("Version: {VERSION}");
    Ok(())
}
