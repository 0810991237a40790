use clap::Parser;
use eyre::Result;
use marquee_client::session::Session;
use marquee_common::domain::ItemId;

#[derive(Parser, Debug)]
pub struct Cmd {
    id: ItemId,
    /// Also look up the trailer
    #[arg(long, short)]
    trailer: bool,
}

impl Cmd {
    pub(crate) async fn run(self, session: &Session) -> Result<()> {
        let api = session.api();
        let detail = api.details(self.id).await?;
        let movie = &detail.movie;

        println!("{} ({})", movie.title, movie.id);
        if let Some(tagline) = detail.tagline.as_deref().filter(|x| !x.is_empty()) {
            println!("{tagline}");
        }
        println!();
        println!("{}", movie.overview);
        println!();

        let genres = detail
            .genres
            .iter()
            .map(|x| x.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!("Genres: {genres}");
        if let Some(runtime) = detail.runtime {
            println!("Runtime: {}h {}m", runtime / 60, runtime % 60);
        }
        println!("Rating: {:.1}", movie.vote_average);
        if let Some(date) = &movie.release_date {
            println!("Released: {date}");
        }

        if self.trailer {
            match api.trailer(self.id).await {
                Ok(trailer) => println!("Trailer: {}", trailer.trailer_url),
                Err(err) => println!("Trailer: unavailable ({err})"),
            }
        }

        Ok(())
    }
}
