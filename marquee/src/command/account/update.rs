use clap::Parser;
use eyre::{Context, Result};
use marquee_client::session::Session;
use marquee_common::api::ProfileUpdate;

#[derive(Parser, Debug)]
pub struct Cmd {
    #[arg(short, long)]
    name: Option<String>,
    #[arg(short, long)]
    email: Option<String>,
    #[arg(short, long)]
    avatar: Option<String>,
}

impl Cmd {
    pub async fn run(self, session: &Session) -> Result<()> {
        let update = ProfileUpdate {
            name: self.name,
            email: self.email,
            avatar: self.avatar,
        };

        session
            .update_profile(update)
            .await
            .wrap_err("Failed to update profile")?;

        println!("Profile updated.");
        Ok(())
    }
}
