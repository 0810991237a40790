use clap::Parser;
use eyre::Result;
use marquee_client::session::Session;

mod login;
mod logout;
mod register;
mod status;
mod update;

#[derive(Parser, Debug)]
#[clap(infer_subcommands = true)]
pub enum Cmd {
    /// Log in to an existing account
    Login(login::Cmd),
    /// Create a new account
    Register(register::Cmd),
    /// Log out and forget the stored session
    Logout,
    /// Show the signed in user
    Status,
    /// Change name, email or avatar
    Update(update::Cmd),
}

impl Cmd {
    pub(crate) async fn run(self, session: &Session) -> Result<()> {
        match self {
            Self::Login(cmd) => cmd.run(session).await,
            Self::Register(cmd) => cmd.run(session).await,
            Self::Logout => logout::run(session).await,
            Self::Status => status::run(session),
            Self::Update(cmd) => cmd.run(session).await,
        }
    }
}
