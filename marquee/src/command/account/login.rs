use clap::Parser;
use eyre::{Context, Result};
use marquee_client::session::{Session, SessionState};
use marquee_client::utils::{read_input, read_input_hidden};

#[derive(Parser, Debug)]
#[clap(infer_subcommands = true)]
pub struct Cmd {
    #[arg(long, short)]
    pub email: Option<String>,
    #[arg(long, short)]
    pub password: Option<String>,
}

impl Cmd {
    pub async fn run(self, session: &Session) -> Result<()> {
        if session.state() == SessionState::Authenticated {
            println!("You are already logged in.");
            return Ok(());
        }

        let email = self.email.unwrap_or_else(|| read_input("email"));
        let password = self
            .password
            .unwrap_or_else(|| read_input_hidden("password"));

        session
            .login(&email, &password)
            .await
            .wrap_err("Failed to log in")?;

        if let Some(identity) = session.identity() {
            println!("Logged in as {}!", identity.name);
        }
        Ok(())
    }
}
