use clap::Parser;
use eyre::{Context, Result};
use marquee_client::session::Session;
use marquee_client::utils::{read_input, read_input_hidden};

#[derive(Parser, Debug)]
#[clap(infer_subcommands = true)]
pub struct Cmd {
    #[arg(short, long)]
    name: Option<String>,
    #[arg(short, long)]
    email: Option<String>,
    #[arg(short, long)]
    password: Option<String>,
}

impl Cmd {
    pub async fn run(self, session: &Session) -> Result<()> {
        let name = self.name.unwrap_or_else(|| read_input("name"));
        let email = self.email.unwrap_or_else(|| read_input("email"));

        // Ask twice only when typed in interactively.
        let (password, confirmation) = match self.password {
            Some(p) => (p.clone(), p),
            None => (
                read_input_hidden("password (6+ characters)"),
                read_input_hidden("password again"),
            ),
        };

        session
            .register_confirmed(&email, &password, &confirmation, &name)
            .await
            .wrap_err("Failed to register user")?;

        println!("Welcome, {name}!");
        Ok(())
    }
}
