use crate::command::browse::print_movies;
use clap::Parser;
use eyre::Result;
use marquee_client::session::Session;

#[derive(Parser, Debug)]
pub struct Cmd {
    query: Vec<String>,
    #[arg(long, short, default_value_t = 1)]
    page: u32,
}

impl Cmd {
    pub(crate) async fn run(self, session: &Session) -> Result<()> {
        let query = self.query.join(" ");
        let results = session.api().search(&query, self.page).await?;

        if results.is_empty() {
            println!("No results for \"{query}\"");
            return Ok(());
        }

        print_movies(&results);
        Ok(())
    }
}
